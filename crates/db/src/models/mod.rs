//! Row models and input DTOs, one module per table family.

pub mod audit;
pub mod config_application;
pub mod config_template;
pub mod server;
