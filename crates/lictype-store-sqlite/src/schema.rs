//! SQL schema for the license store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per license. Rows are never deleted.
-- typology, explanation and decision_source are only ever written together.
CREATE TABLE IF NOT EXISTS licenses (
    license_id      INTEGER PRIMARY KEY AUTOINCREMENT,
    name            TEXT NOT NULL UNIQUE,
    external_id     INTEGER,
    typology        TEXT,            -- Typology display name or 'unresolved'
    explanation     TEXT,
    decision_source TEXT,            -- 'model' | 'manual' | NULL (pending)
    created_at      TEXT NOT NULL,   -- ISO 8601 UTC
    updated_at      TEXT NOT NULL,
    CHECK (decision_source IS NULL OR decision_source IN ('model', 'manual')),
    CHECK (explanation IS NULL OR length(explanation) <= 150)
);

PRAGMA user_version = 1;
";
