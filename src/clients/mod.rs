pub mod smtp;
pub mod template;
