pub mod directory;
pub mod email;
pub mod sms;
pub mod template;
