//! Storage Layer - SQLite-backed persistence
//!
//! System of record is SQLite with tables:
//! - petition(id, title, description)
//! - signature(id, name, email, petition_id)
//!
//! Cascade delete and orphan removal are applied by the store itself.

pub mod schema;
pub mod sqlite;

pub use sqlite::{DbStats, PetitionSummary, SqliteStore};
