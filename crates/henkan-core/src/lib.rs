pub mod request;
pub mod segments;
pub mod settings;
pub mod unicode;
