pub mod api;
pub mod clients;
pub mod config;
pub mod errors;
pub mod models;
pub mod orchestrator;
pub mod template_data;
pub mod traits;
pub mod utils;
pub mod validation;
