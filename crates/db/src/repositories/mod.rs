//! Repository layer.
//!
//! Each repository is a zero-sized struct. Methods that may run inside a
//! transaction take any SQLite executor (`&DbPool` or `&mut *tx`); pure reads
//! that never need one take `&DbPool`.

pub mod audit_repo;
pub mod config_application_repo;
pub mod config_template_repo;
pub mod server_repo;

pub use audit_repo::AuditLogRepo;
pub use config_application_repo::ConfigApplicationRepo;
pub use config_template_repo::ConfigTemplateRepo;
pub use server_repo::ServerRepo;
