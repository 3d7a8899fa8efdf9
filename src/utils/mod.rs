pub mod ip;
pub mod url_validator;

pub use ip::client_signature;
pub use url_validator::normalize_url;
