pub mod contact;
pub mod credentials;
pub mod health;
pub mod outcome;
pub mod response;
pub mod status;
pub mod template;
pub mod validation;
