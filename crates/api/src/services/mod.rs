//! Business operations behind the HTTP handlers.
//!
//! Every mutating operation runs in one SQLite transaction that starts with
//! a write, so the write lock is taken before anything is read. The audit
//! entry is written inside that same transaction.

pub mod apply;
pub mod audit;
pub mod registry;
pub mod templates;
