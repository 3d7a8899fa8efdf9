pub mod middleware;
pub mod response;
pub mod services;
