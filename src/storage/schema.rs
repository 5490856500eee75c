//! Database schema definitions

/// Enforce foreign keys on this connection (off by default in SQLite)
pub const ENABLE_FOREIGN_KEYS: &str = "PRAGMA foreign_keys = ON";

/// SQL to create the petition table
pub const CREATE_PETITION_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS petition (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL CHECK (length(title) <= 120),
    description TEXT NOT NULL CHECK (length(description) <= 1500)
)
"#;

/// SQL to create the signature table
/// No ON DELETE action: children are removed by the store before the parent
pub const CREATE_SIGNATURE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS signature (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT NOT NULL,
    petition_id INTEGER NOT NULL REFERENCES petition(id)
)
"#;

/// SQL to create indexes
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_signature_petition ON signature(petition_id)",
];

/// All schema creation statements
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![CREATE_PETITION_TABLE, CREATE_SIGNATURE_TABLE];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}
