//! Domain logic for the PXE provisioning backend.
//!
//! Everything in this crate is pure: no database, no HTTP, no filesystem.
//! The `db` and `api` crates build on these types and rules.

pub mod audit;
pub mod error;
pub mod hashing;
pub mod lifecycle;
pub mod pxe;
pub mod template;
pub mod types;
