//! SQLite storage implementation

use std::collections::HashSet;
use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

use super::schema;
use crate::id::{PetitionId, SignatureId};
use crate::petition::Petition;
use crate::signature::Signature;
use crate::{Error, Result};

/// SQLite-backed storage for petitions and their signatures.
///
/// One store is one unit of work: open it, use it, drop it.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.initialize_schema()?;
        tracing::debug!("Opened petition store at {}", path.display());
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn initialize_schema(&self) -> Result<()> {
        self.conn.execute_batch(schema::ENABLE_FOREIGN_KEYS)?;
        for stmt in schema::all_schema_statements() {
            self.conn.execute(stmt, [])?;
        }
        Ok(())
    }

    // ========== Petition Operations ==========

    /// Save a petition aggregate.
    ///
    /// Inserts the petition if it has no id, otherwise updates it. Every owned
    /// signature is pointed at the petition and inserted or updated; rows that
    /// belong to the petition but are no longer in its collection are deleted.
    /// The in-memory collection is authoritative. Ids are written back only
    /// after the transaction commits.
    ///
    /// A collection holding the same persisted signature twice is rejected
    /// with [`Error::IntegrityViolation`] before anything is written.
    pub fn save_petition(&mut self, petition: &mut Petition) -> Result<PetitionId> {
        let mut seen = HashSet::new();
        for id in petition.signatures().iter().filter_map(Signature::id) {
            if !seen.insert(id) {
                return Err(Error::IntegrityViolation(format!(
                    "signature {} appears more than once in the collection",
                    id
                )));
            }
        }

        let tx = self.conn.transaction()?;

        let petition_id = match petition.id() {
            None => {
                tx.execute(
                    "INSERT INTO petition (title, description) VALUES (?1, ?2)",
                    params![petition.title(), petition.description()],
                )?;
                PetitionId(tx.last_insert_rowid())
            }
            Some(id) => {
                let updated = tx.execute(
                    "UPDATE petition SET title = ?1, description = ?2 WHERE id = ?3",
                    params![petition.title(), petition.description(), id.get()],
                )?;
                if updated == 0 {
                    return Err(Error::PetitionNotFound(id));
                }
                id
            }
        };

        let mut assigned = Vec::with_capacity(petition.signature_count());
        for signature in petition.signatures() {
            let id = match signature.id() {
                None => {
                    tx.execute(
                        "INSERT INTO signature (name, email, petition_id) VALUES (?1, ?2, ?3)",
                        params![signature.name(), signature.email(), petition_id.get()],
                    )?;
                    SignatureId(tx.last_insert_rowid())
                }
                Some(id) => {
                    let updated = tx.execute(
                        "UPDATE signature SET name = ?1, email = ?2, petition_id = ?3 WHERE id = ?4",
                        params![signature.name(), signature.email(), petition_id.get(), id.get()],
                    )?;
                    if updated == 0 {
                        return Err(Error::SignatureNotFound(id));
                    }
                    id
                }
            };
            assigned.push(id);
        }

        // Orphan removal
        let kept: HashSet<SignatureId> = assigned.iter().copied().collect();
        let existing: Vec<SignatureId> = {
            let mut stmt = tx.prepare("SELECT id FROM signature WHERE petition_id = ?1")?;
            let rows = stmt.query_map([petition_id.get()], |row| row.get(0).map(SignatureId))?;
            rows.collect::<rusqlite::Result<_>>()?
        };
        let mut orphans = 0;
        for id in existing.into_iter().filter(|id| !kept.contains(id)) {
            tx.execute("DELETE FROM signature WHERE id = ?1", [id.get()])?;
            tracing::debug!("Removed orphaned signature {} from petition {}", id, petition_id);
            orphans += 1;
        }

        tx.commit()?;

        petition.id = Some(petition_id);
        for (signature, id) in petition.signatures.iter_mut().zip(assigned) {
            signature.id = Some(id);
        }
        petition.sync_back_references();

        tracing::info!(
            "Saved petition {} ({} signatures, {} orphans removed)",
            petition_id,
            petition.signature_count(),
            orphans
        );
        Ok(petition_id)
    }

    /// Load a petition together with its signatures
    pub fn get_petition(&self, id: PetitionId) -> Result<Option<Petition>> {
        let row: Option<(String, String)> = self
            .conn
            .query_row(
                "SELECT title, description FROM petition WHERE id = ?1",
                [id.get()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let Some((title, description)) = row else {
            return Ok(None);
        };

        let signatures = self.signatures_for(id)?;
        Ok(Some(Petition::from_parts(id, title, description, signatures)))
    }

    /// List all petitions with their signature counts, oldest first
    pub fn list_petitions(&self) -> Result<Vec<PetitionSummary>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT p.id, p.title, COUNT(s.id)
            FROM petition p
            LEFT JOIN signature s ON s.petition_id = p.id
            GROUP BY p.id
            ORDER BY p.id
            "#,
        )?;

        let summaries = stmt
            .query_map([], |row| {
                let count: i64 = row.get(2)?;
                Ok(PetitionSummary {
                    id: PetitionId(row.get(0)?),
                    title: row.get(1)?,
                    signatures: count as usize,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(summaries)
    }

    /// Delete a petition and, first, every signature that belongs to it.
    ///
    /// Returns `false` if no such petition exists.
    pub fn delete_petition(&mut self, id: PetitionId) -> Result<bool> {
        let tx = self.conn.transaction()?;
        let signatures = tx.execute("DELETE FROM signature WHERE petition_id = ?1", [id.get()])?;
        let deleted = tx.execute("DELETE FROM petition WHERE id = ?1", [id.get()])?;
        tx.commit()?;

        if deleted > 0 {
            tracing::info!("Deleted petition {} and {} signatures", id, signatures);
        }
        Ok(deleted > 0)
    }

    /// Count all petitions
    pub fn count_petitions(&self) -> Result<usize> {
        let count: i64 = self.conn.query_row("SELECT COUNT(*) FROM petition", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    // ========== Signature Operations ==========

    /// Save a single signature against its `petition` reference.
    ///
    /// Fails with [`Error::IntegrityViolation`] if the signature has no
    /// petition or references one that does not exist.
    pub fn save_signature(&self, signature: &mut Signature) -> Result<SignatureId> {
        let petition_id = signature.petition().map(PetitionId::get);

        let id = match signature.id() {
            None => {
                self.conn.execute(
                    "INSERT INTO signature (name, email, petition_id) VALUES (?1, ?2, ?3)",
                    params![signature.name(), signature.email(), petition_id],
                )?;
                SignatureId(self.conn.last_insert_rowid())
            }
            Some(id) => {
                let updated = self.conn.execute(
                    "UPDATE signature SET name = ?1, email = ?2, petition_id = ?3 WHERE id = ?4",
                    params![signature.name(), signature.email(), petition_id, id.get()],
                )?;
                if updated == 0 {
                    return Err(Error::SignatureNotFound(id));
                }
                id
            }
        };

        signature.id = Some(id);
        tracing::debug!("Saved signature {} for petition {:?}", id, petition_id);
        Ok(id)
    }

    /// Get a signature by id
    pub fn get_signature(&self, id: SignatureId) -> Result<Option<Signature>> {
        self.conn
            .query_row(
                "SELECT id, name, email, petition_id FROM signature WHERE id = ?1",
                [id.get()],
                |row| self.row_to_signature(row),
            )
            .optional()
            .map_err(Into::into)
    }

    /// All signatures of a petition, in insertion order
    pub fn signatures_for(&self, petition: PetitionId) -> Result<Vec<Signature>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, email, petition_id FROM signature WHERE petition_id = ?1 ORDER BY id",
        )?;

        let signatures = stmt
            .query_map([petition.get()], |row| self.row_to_signature(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(signatures)
    }

    /// Delete a signature by id. Returns `false` if it did not exist.
    pub fn delete_signature(&self, id: SignatureId) -> Result<bool> {
        let deleted = self.conn.execute("DELETE FROM signature WHERE id = ?1", [id.get()])?;
        if deleted > 0 {
            tracing::debug!("Deleted signature {}", id);
        }
        Ok(deleted > 0)
    }

    /// Count all signatures
    pub fn count_signatures(&self) -> Result<usize> {
        let count: i64 = self.conn.query_row("SELECT COUNT(*) FROM signature", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Helper to convert a row to a Signature
    fn row_to_signature(&self, row: &rusqlite::Row) -> rusqlite::Result<Signature> {
        Ok(Signature::from_parts(
            SignatureId(row.get(0)?),
            row.get(1)?,
            row.get(2)?,
            PetitionId(row.get(3)?),
        ))
    }

    /// Get database statistics
    pub fn stats(&self) -> Result<DbStats> {
        Ok(DbStats {
            petitions: self.count_petitions()?,
            signatures: self.count_signatures()?,
        })
    }
}

/// A petition row with its signature count, for listings
#[derive(Debug, Clone, Serialize)]
pub struct PetitionSummary {
    pub id: PetitionId,
    pub title: String,
    pub signatures: usize,
}

/// Database statistics
#[derive(Debug, Clone, Serialize)]
pub struct DbStats {
    pub petitions: usize,
    pub signatures: usize,
}

impl std::fmt::Display for DbStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Database Statistics:")?;
        writeln!(f, "  Petitions: {}", self.petitions)?;
        writeln!(f, "  Signatures: {}", self.signatures)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::petition::{DESCRIPTION_MAX_LEN, TITLE_MAX_LEN};

    fn sample_petition() -> Petition {
        Petition::new("Save the library", "Keep the branch library open on Sundays")
    }

    #[test]
    fn test_save_and_reload() {
        let mut store = SqliteStore::open_in_memory().unwrap();

        let mut petition = sample_petition();
        petition.add_signature(Signature::new("Ada", "ada@example.com"));
        let id = store.save_petition(&mut petition).unwrap();

        assert_eq!(petition.id(), Some(id));
        assert!(petition.signatures()[0].id().is_some());
        assert_eq!(petition.signatures()[0].petition(), Some(id));

        let loaded = store.get_petition(id).unwrap().unwrap();
        assert_eq!(loaded.title(), "Save the library");
        assert_eq!(loaded.signature_count(), 1);
        let signature = &loaded.signatures()[0];
        assert_eq!(signature.name(), "Ada");
        assert_eq!(signature.email(), "ada@example.com");
        assert!(signature.id().is_some());
        assert_eq!(signature.petition(), Some(id));
    }

    #[test]
    fn test_get_missing_petition() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(store.get_petition(PetitionId(99)).unwrap().is_none());
    }

    #[test]
    fn test_id_is_stable_across_saves() {
        let mut store = SqliteStore::open_in_memory().unwrap();

        let mut petition = sample_petition();
        let first = store.save_petition(&mut petition).unwrap();
        petition.set_title("Save the library, again");
        let second = store.save_petition(&mut petition).unwrap();

        assert_eq!(first, second);
        assert_eq!(store.count_petitions().unwrap(), 1);
        let loaded = store.get_petition(first).unwrap().unwrap();
        assert_eq!(loaded.title(), "Save the library, again");
    }

    #[test]
    fn test_delete_petition_cascades() {
        let mut store = SqliteStore::open_in_memory().unwrap();

        let mut petition = sample_petition();
        petition.add_signature(Signature::new("Ada", "ada@example.com"));
        petition.add_signature(Signature::new("Grace", "grace@example.com"));
        let id = store.save_petition(&mut petition).unwrap();
        let signature_ids: Vec<_> = petition.signatures().iter().filter_map(|s| s.id()).collect();

        assert!(store.delete_petition(id).unwrap());

        assert!(store.get_petition(id).unwrap().is_none());
        for signature_id in signature_ids {
            assert!(store.get_signature(signature_id).unwrap().is_none());
        }
        assert_eq!(store.count_signatures().unwrap(), 0);
        assert!(!store.delete_petition(id).unwrap());
    }

    #[test]
    fn test_delete_leaves_other_petitions_alone() {
        let mut store = SqliteStore::open_in_memory().unwrap();

        let mut keep = sample_petition();
        keep.add_signature(Signature::new("Ada", "ada@example.com"));
        let keep_id = store.save_petition(&mut keep).unwrap();

        let mut other = Petition::new("Other", "Other description");
        other.add_signature(Signature::new("Grace", "grace@example.com"));
        let other_id = store.save_petition(&mut other).unwrap();

        store.delete_petition(other_id).unwrap();

        assert_eq!(store.signatures_for(keep_id).unwrap().len(), 1);
    }

    #[test]
    fn test_orphan_removal_on_save() {
        let mut store = SqliteStore::open_in_memory().unwrap();

        let mut petition = sample_petition();
        petition.add_signature(Signature::new("Ada", "ada@example.com"));
        petition.add_signature(Signature::new("Grace", "grace@example.com"));
        store.save_petition(&mut petition).unwrap();

        let removed_id = petition.signatures()[0].id().unwrap();
        petition.remove_signature(removed_id).unwrap();
        store.save_petition(&mut petition).unwrap();

        assert!(store.get_signature(removed_id).unwrap().is_none());
        assert_eq!(store.count_signatures().unwrap(), 1);
    }

    #[test]
    fn test_signature_without_petition_is_integrity_violation() {
        let store = SqliteStore::open_in_memory().unwrap();

        let mut signature = Signature::new("Ada", "ada@example.com");
        let err = store.save_signature(&mut signature).unwrap_err();

        assert!(matches!(err, Error::IntegrityViolation(_)), "got {:?}", err);
        assert!(signature.id().is_none());
    }

    #[test]
    fn test_signature_with_missing_petition_is_integrity_violation() {
        let store = SqliteStore::open_in_memory().unwrap();

        let mut signature = Signature::new("Ada", "ada@example.com");
        signature.set_petition(PetitionId(404));
        let err = store.save_signature(&mut signature).unwrap_err();

        assert!(matches!(err, Error::IntegrityViolation(_)), "got {:?}", err);
    }

    #[test]
    fn test_standalone_signature() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let mut petition = sample_petition();
        let petition_id = store.save_petition(&mut petition).unwrap();

        let mut signature = Signature::new("Ada", "ada@example.com");
        signature.set_petition(petition_id);
        let id = store.save_signature(&mut signature).unwrap();

        let loaded = store.get_signature(id).unwrap().unwrap();
        assert_eq!(loaded.petition(), Some(petition_id));
        assert_eq!(store.signatures_for(petition_id).unwrap().len(), 1);

        assert!(store.delete_signature(id).unwrap());
        assert!(!store.delete_signature(id).unwrap());
    }

    #[test]
    fn test_title_length_constraint() {
        let mut store = SqliteStore::open_in_memory().unwrap();

        let mut ok = Petition::new("t".repeat(TITLE_MAX_LEN), "d");
        assert!(store.save_petition(&mut ok).is_ok());

        let mut too_long = Petition::new("t".repeat(TITLE_MAX_LEN + 1), "d");
        let err = store.save_petition(&mut too_long).unwrap_err();
        assert!(matches!(err, Error::ConstraintViolation(_)), "got {:?}", err);
        assert!(too_long.id().is_none());
    }

    #[test]
    fn test_description_length_constraint() {
        let mut store = SqliteStore::open_in_memory().unwrap();

        let mut ok = Petition::new("t", "d".repeat(DESCRIPTION_MAX_LEN));
        assert!(store.save_petition(&mut ok).is_ok());

        let mut too_long = Petition::new("t", "d".repeat(DESCRIPTION_MAX_LEN + 1));
        let err = store.save_petition(&mut too_long).unwrap_err();
        assert!(matches!(err, Error::ConstraintViolation(_)), "got {:?}", err);
    }

    #[test]
    fn test_failed_save_rolls_back() {
        let mut store = SqliteStore::open_in_memory().unwrap();

        let mut petition = sample_petition();
        let id = store.save_petition(&mut petition).unwrap();

        petition.add_signature(Signature::new("Ada", "ada@example.com"));
        petition.set_description("d".repeat(DESCRIPTION_MAX_LEN + 1));
        assert!(store.save_petition(&mut petition).is_err());

        assert!(petition.signatures()[0].id().is_none());
        assert_eq!(store.signatures_for(id).unwrap().len(), 0);
    }

    #[test]
    fn test_update_of_deleted_petition() {
        let mut store = SqliteStore::open_in_memory().unwrap();

        let mut petition = sample_petition();
        let id = store.save_petition(&mut petition).unwrap();
        store.delete_petition(id).unwrap();

        let err = store.save_petition(&mut petition).unwrap_err();
        assert!(matches!(err, Error::PetitionNotFound(missing) if missing == id));
    }

    #[test]
    fn test_list_and_stats() {
        let mut store = SqliteStore::open_in_memory().unwrap();

        let mut first = sample_petition();
        first.add_signature(Signature::new("Ada", "ada@example.com"));
        first.add_signature(Signature::new("Grace", "grace@example.com"));
        store.save_petition(&mut first).unwrap();

        let mut second = Petition::new("Bike lanes", "Paint them");
        store.save_petition(&mut second).unwrap();

        let summaries = store.list_petitions().unwrap();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].signatures, 2);
        assert_eq!(summaries[1].title, "Bike lanes");
        assert_eq!(summaries[1].signatures, 0);

        let stats = store.stats().unwrap();
        assert_eq!(stats.petitions, 2);
        assert_eq!(stats.signatures, 2);
    }

    #[test]
    fn test_duplicate_signature_in_collection_is_rejected() {
        let mut store = SqliteStore::open_in_memory().unwrap();

        let mut petition = sample_petition();
        petition.add_signature(Signature::new("Ada", "ada@example.com"));
        let id = store.save_petition(&mut petition).unwrap();

        let copy = petition.signatures()[0].clone();
        petition.add_signature(copy);
        let err = store.save_petition(&mut petition).unwrap_err();

        assert!(matches!(err, Error::IntegrityViolation(_)), "got {:?}", err);
        assert_eq!(store.signatures_for(id).unwrap().len(), 1);
    }

    #[test]
    fn test_retain_then_save_removes_orphans() {
        let mut store = SqliteStore::open_in_memory().unwrap();

        let mut petition = sample_petition();
        petition.add_signature(Signature::new("Ada", "ada@example.com"));
        petition.add_signature(Signature::new("Spam", "spam@example.com"));
        let id = store.save_petition(&mut petition).unwrap();
        let spam_id = petition.signatures()[1].id().unwrap();

        petition.retain_signatures(|s| s.name() != "Spam");
        store.save_petition(&mut petition).unwrap();

        let stored = store.signatures_for(id).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].name(), "Ada");
        assert!(store.get_signature(spam_id).unwrap().is_none());
    }

    #[test]
    fn test_cleared_petition_is_integrity_violation() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let mut petition = sample_petition();
        let petition_id = store.save_petition(&mut petition).unwrap();

        let mut signature = Signature::new("Ada", "ada@example.com");
        signature.set_petition(petition_id);
        store.save_signature(&mut signature).unwrap();
        assert!(signature.is_persisted());

        signature.clear_petition();
        let err = store.save_signature(&mut signature).unwrap_err();

        assert!(matches!(err, Error::IntegrityViolation(_)), "got {:?}", err);
        assert_eq!(store.signatures_for(petition_id).unwrap().len(), 1);
    }

    #[test]
    fn test_save_marks_entities_persisted() {
        let mut store = SqliteStore::open_in_memory().unwrap();

        let mut petition = sample_petition();
        petition.add_signature(Signature::new("Ada", "ada@example.com"));
        assert!(!petition.is_persisted());
        assert!(!petition.signatures()[0].is_persisted());

        store.save_petition(&mut petition).unwrap();

        assert!(petition.is_persisted());
        assert!(petition.signatures()[0].is_persisted());
    }

    #[test]
    fn test_open_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("petitions.db");

        let id = {
            let mut store = SqliteStore::open(&path).unwrap();
            let mut petition = sample_petition();
            petition.add_signature(Signature::new("Ada", "ada@example.com"));
            store.save_petition(&mut petition).unwrap()
        };

        let store = SqliteStore::open(&path).unwrap();
        let loaded = store.get_petition(id).unwrap().unwrap();
        assert_eq!(loaded.signature_count(), 1);
    }
}
