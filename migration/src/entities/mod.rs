pub mod code_visitor;
pub mod tracked_code;

pub use code_visitor::Entity as CodeVisitorEntity;
pub use tracked_code::Entity as TrackedCodeEntity;
