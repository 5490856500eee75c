//! Signature - a single signer's endorsement of a petition

use crate::id::{PetitionId, SignatureId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A signature on a petition.
///
/// Every persisted signature belongs to exactly one petition. The `petition`
/// reference stays `None` until the signature is appended to a petition or
/// assigned one explicitly; the store rejects a detached signature with
/// [`crate::Error::IntegrityViolation`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signature {
    pub(crate) id: Option<SignatureId>,
    name: String,
    email: String,
    pub(crate) petition: Option<PetitionId>,
}

impl Signature {
    /// Create an unsaved signature with no owning petition
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            email: email.into(),
            petition: None,
        }
    }

    pub(crate) fn from_parts(id: SignatureId, name: String, email: String, petition: PetitionId) -> Self {
        Self {
            id: Some(id),
            name,
            email,
            petition: Some(petition),
        }
    }

    /// Storage-generated id, `None` until persisted
    pub fn id(&self) -> Option<SignatureId> {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Signer's email. Not syntax-checked.
    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.email = email.into();
    }

    /// Owning petition, if associated
    pub fn petition(&self) -> Option<PetitionId> {
        self.petition
    }

    /// Associate this signature with a petition
    pub fn set_petition(&mut self, petition: PetitionId) {
        self.petition = Some(petition);
    }

    #[deprecated(note = "use `set_petition`")]
    pub fn add_petition(&mut self, petition: PetitionId) {
        self.set_petition(petition);
    }

    /// Drop the petition reference
    pub fn clear_petition(&mut self) {
        self.petition = None;
    }

    /// Whether the storage layer has assigned this signature an id
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature{{id=")?;
        match self.id {
            Some(id) => write!(f, "{}", id)?,
            None => write!(f, "null")?,
        }
        write!(f, ", name='{}', email='{}'}}", self.name, self.email)
    }
}
