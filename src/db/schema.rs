//! Database schema and migrations for trackvault.
//!
//! This module contains all database migrations that will be applied
//! sequentially when the database is first opened or upgraded.

/// Database migrations.
///
/// Each migration is a SQL script that will be executed in order.
/// The schema_version table tracks which migrations have been applied.
pub const MIGRATIONS: &[&str] = &[
    // v1: Initial schema - folders and files tables
    r#"
-- Folders table for the library hierarchy
CREATE TABLE folders (
    id          TEXT PRIMARY KEY,
    owner_id    TEXT NOT NULL,
    name        TEXT NOT NULL,
    parent_id   TEXT REFERENCES folders(id) ON DELETE SET NULL,
    starred     INTEGER NOT NULL DEFAULT 0,
    created_at  TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at  TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_folders_owner_id ON folders(owner_id);
CREATE INDEX idx_folders_parent_id ON folders(parent_id);

-- Files table for uploaded media metadata
CREATE TABLE files (
    id           TEXT PRIMARY KEY,
    owner_id     TEXT NOT NULL,
    name         TEXT NOT NULL,
    category     TEXT NOT NULL DEFAULT 'other',  -- 'audio', 'image', 'video', 'document', 'other'
    size_bytes   INTEGER NOT NULL DEFAULT 0,
    storage_key  TEXT NOT NULL UNIQUE,
    public_url   TEXT NOT NULL,
    folder_id    TEXT REFERENCES folders(id) ON DELETE SET NULL,
    starred      INTEGER NOT NULL DEFAULT 0,
    created_at   TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at   TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_files_owner_id ON files(owner_id);
CREATE INDEX idx_files_folder_id ON files(folder_id);
"#,
    // v2: Composite indexes for the starred dashboard view
    r#"
CREATE INDEX idx_files_starred ON files(owner_id, starred);
CREATE INDEX idx_folders_starred ON folders(owner_id, starred);
"#,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_not_empty() {
        assert!(!MIGRATIONS.is_empty());
    }

    #[test]
    fn test_first_migration_contains_core_tables() {
        let first = MIGRATIONS[0];
        assert!(first.contains("CREATE TABLE folders"));
        assert!(first.contains("CREATE TABLE files"));
        assert!(first.contains("storage_key"));
        assert!(first.contains("parent_id"));
    }

    #[test]
    fn test_migrations_are_valid_sql() {
        // Each migration should be non-empty and contain SQL keywords
        for migration in MIGRATIONS {
            assert!(!migration.trim().is_empty());
            assert!(
                migration.contains("CREATE TABLE")
                    || migration.contains("ALTER TABLE")
                    || migration.contains("CREATE INDEX")
            );
        }
    }
}
