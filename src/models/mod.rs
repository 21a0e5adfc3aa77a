pub mod contractor;
pub mod health;
pub mod message;
pub mod report;
pub mod request;
pub mod response;
pub mod result;
pub mod retry;
pub mod rules;
pub mod template;
