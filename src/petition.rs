//! Petition - aggregate root owning its signatures
//!
//! A petition owns its signature collection outright. Appending a signature
//! stamps the signature's back-reference, and saving through
//! [`crate::storage::SqliteStore::save_petition`] stamps it again with the
//! generated id, so the two sides of the relationship cannot disagree.

use crate::id::{PetitionId, SignatureId};
use crate::signature::Signature;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum title length in characters, enforced by the `petition` schema
pub const TITLE_MAX_LEN: usize = 120;

/// Maximum description length in characters, enforced by the `petition` schema
pub const DESCRIPTION_MAX_LEN: usize = 1500;

/// A petition and the signatures collected for it.
///
/// Title and description lengths are not checked here; an overlong value is
/// rejected when the petition is saved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Petition {
    pub(crate) id: Option<PetitionId>,
    title: String,
    description: String,
    pub(crate) signatures: Vec<Signature>,
}

impl Petition {
    /// Create an unsaved petition with no signatures
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            description: description.into(),
            signatures: Vec::new(),
        }
    }

    /// Storage-generated id, `None` until persisted
    pub fn id(&self) -> Option<PetitionId> {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Signatures in collection order
    pub fn signatures(&self) -> &[Signature] {
        &self.signatures
    }

    pub fn signature_count(&self) -> usize {
        self.signatures.len()
    }

    /// Append a signature and point it at this petition.
    ///
    /// Returns a reference to the signature as stored in the collection.
    pub fn add_signature(&mut self, mut signature: Signature) -> &Signature {
        signature.petition = self.id;
        self.signatures.push(signature);
        &self.signatures[self.signatures.len() - 1]
    }

    /// Detach a persisted signature. Its row is deleted on the next save.
    pub fn remove_signature(&mut self, id: SignatureId) -> Option<Signature> {
        let pos = self.signatures.iter().position(|s| s.id == Some(id))?;
        let mut removed = self.signatures.remove(pos);
        removed.petition = None;
        Some(removed)
    }

    /// Keep only the signatures matching `keep`; dropped persisted rows are
    /// deleted on the next save.
    pub fn retain_signatures<F>(&mut self, keep: F)
    where
        F: FnMut(&Signature) -> bool,
    {
        self.signatures.retain(keep);
    }

    pub(crate) fn from_parts(
        id: PetitionId,
        title: String,
        description: String,
        signatures: Vec<Signature>,
    ) -> Self {
        Self {
            id: Some(id),
            title,
            description,
            signatures,
        }
    }

    /// Whether the storage layer has assigned this petition an id
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Point every owned signature at this petition's current id
    pub(crate) fn sync_back_references(&mut self) {
        let id = self.id;
        for signature in &mut self.signatures {
            signature.petition = id;
        }
    }
}

impl fmt::Display for Petition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Petition{{id=")?;
        match self.id {
            Some(id) => write!(f, "{}", id)?,
            None => write!(f, "null")?,
        }
        write!(
            f,
            ", title='{}', description='{}', signatures=[",
            self.title, self.description
        )?;
        for (i, signature) in self.signatures.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", signature)?;
        }
        write!(f, "]}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_petition_creation() {
        let petition = Petition::new("T", "D");

        assert_eq!(petition.title(), "T");
        assert_eq!(petition.description(), "D");
        assert!(petition.id().is_none());
        assert!(petition.signatures().is_empty());
    }

    #[test]
    fn test_setters() {
        let mut petition = Petition::new("T", "D");
        petition.set_title("Save the library");
        petition.set_description("Keep it open on Sundays");

        assert_eq!(petition.title(), "Save the library");
        assert_eq!(petition.description(), "Keep it open on Sundays");
    }

    #[test]
    fn test_add_signature_appends_one() {
        let mut petition = Petition::new("T", "D");
        petition.add_signature(Signature::new("Ada", "ada@example.com"));
        let before = petition.signature_count();

        let added = petition.add_signature(Signature::new("Grace", "grace@example.com"));
        assert_eq!(added.name(), "Grace");

        assert_eq!(petition.signature_count(), before + 1);
        let last = petition.signatures().last().unwrap();
        assert_eq!(last.name(), "Grace");
        assert_eq!(last.email(), "grace@example.com");
    }

    #[test]
    fn test_add_signature_sets_back_reference() {
        let mut petition = Petition::new("T", "D");
        petition.id = Some(PetitionId(5));

        petition.add_signature(Signature::new("Ada", "ada@example.com"));

        assert_eq!(petition.signatures()[0].petition(), Some(PetitionId(5)));
    }

    #[test]
    fn test_lengths_not_checked_in_memory() {
        let long = "x".repeat(TITLE_MAX_LEN + 1);
        let petition = Petition::new(long.clone(), "y".repeat(DESCRIPTION_MAX_LEN + 1));
        assert_eq!(petition.title(), long);
    }

    #[test]
    fn test_remove_signature() {
        let mut petition = Petition::new("T", "D");
        petition.id = Some(PetitionId(1));
        petition.add_signature(Signature::new("Ada", "ada@example.com"));
        petition.add_signature(Signature::new("Grace", "grace@example.com"));
        petition.signatures[0].id = Some(SignatureId(10));
        petition.signatures[1].id = Some(SignatureId(11));

        let removed = petition.remove_signature(SignatureId(10)).unwrap();
        assert_eq!(removed.name(), "Ada");
        assert!(removed.petition().is_none());
        assert_eq!(petition.signature_count(), 1);

        assert!(petition.remove_signature(SignatureId(10)).is_none());
    }

    #[test]
    fn test_retain_signatures() {
        let mut petition = Petition::new("T", "D");
        petition.add_signature(Signature::new("Ada", "ada@example.com"));
        petition.add_signature(Signature::new("Spam", "spam@example.com"));

        petition.retain_signatures(|s| s.name() != "Spam");

        assert_eq!(petition.signature_count(), 1);
        assert_eq!(petition.signatures()[0].name(), "Ada");
    }

    #[test]
    fn test_display() {
        let mut petition = Petition::new("T", "D");
        petition.add_signature(Signature::new("Ada", "ada@example.com"));

        assert_eq!(
            petition.to_string(),
            "Petition{id=null, title='T', description='D', signatures=[Signature{id=null, name='Ada', email='ada@example.com'}]}"
        );
    }
}
