//! # Petitions - petitions and their signatures
//!
//! A two-entity data model with a one-to-many relationship:
//! - [`Petition`]: aggregate root that owns its signatures
//! - [`Signature`]: a signer's name and email, belonging to exactly one petition
//!
//! Persistence is an embedded SQLite store ([`SqliteStore`]) that generates
//! ids, enforces the schema constraints and applies cascade delete and orphan
//! removal explicitly.

pub mod id;
pub mod petition;
pub mod signature;
pub mod storage;
pub mod output;
pub mod config;
pub mod ui;

// Re-exports for convenient access
pub use id::{PetitionId, SignatureId};
pub use petition::{Petition, DESCRIPTION_MAX_LEN, TITLE_MAX_LEN};
pub use signature::Signature;
pub use storage::SqliteStore;

/// Result type alias for petition operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for petition operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Integrity violation: {0}")]
    IntegrityViolation(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Storage error: {0}")]
    Storage(#[source] rusqlite::Error),

    #[error("Petition not found: {0}")]
    PetitionNotFound(PetitionId),

    #[error("Signature not found: {0}")]
    SignatureNotFound(SignatureId),

    #[error("{0}")]
    InvalidId(String),
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        use rusqlite::ffi;

        if let rusqlite::Error::SqliteFailure(failure, message) = &err {
            if failure.code == rusqlite::ErrorCode::ConstraintViolation {
                let detail = message.clone().unwrap_or_else(|| failure.to_string());
                return match failure.extended_code {
                    ffi::SQLITE_CONSTRAINT_NOTNULL | ffi::SQLITE_CONSTRAINT_FOREIGNKEY => {
                        Error::IntegrityViolation(detail)
                    }
                    _ => Error::ConstraintViolation(detail),
                };
            }
        }
        Error::Storage(err)
    }
}
