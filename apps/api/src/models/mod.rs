pub mod assignment;
pub mod request;
