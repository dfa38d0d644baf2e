//! SQLite schema definition.

/// Complete database schema for the clinic store.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Users (backing identities, one per patient email)
-- ============================================================================

-- Email uniqueness is checked by query before insert, not by constraint.
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    email TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT
);

CREATE INDEX IF NOT EXISTS idx_users_email ON users(email);

-- ============================================================================
-- Patients
-- ============================================================================

CREATE TABLE IF NOT EXISTS patients (
    id TEXT PRIMARY KEY,
    uid TEXT NOT NULL REFERENCES users(id),
    email TEXT NOT NULL,
    name TEXT NOT NULL,
    birthdate TEXT NOT NULL,
    sex TEXT NOT NULL,
    dni TEXT,
    emergency_number TEXT,
    direccion TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT
);

CREATE INDEX IF NOT EXISTS idx_patients_uid ON patients(uid);
CREATE INDEX IF NOT EXISTS idx_patients_email ON patients(email);
CREATE INDEX IF NOT EXISTS idx_patients_name ON patients(name);

-- ============================================================================
-- Inventory
-- ============================================================================

CREATE TABLE IF NOT EXISTS inventory (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    quantity INTEGER NOT NULL DEFAULT 0 CHECK (quantity >= 0),
    price REAL NOT NULL DEFAULT 0 CHECK (price >= 0),
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT
);

-- FTS5 virtual table for product name search
CREATE VIRTUAL TABLE IF NOT EXISTS inventory_fts USING fts5(
    id,
    name,
    content='inventory',
    content_rowid='rowid'
);

-- Triggers to keep FTS5 in sync with main table
CREATE TRIGGER IF NOT EXISTS inventory_ai AFTER INSERT ON inventory BEGIN
    INSERT INTO inventory_fts(rowid, id, name)
    VALUES (new.rowid, new.id, new.name);
END;

CREATE TRIGGER IF NOT EXISTS inventory_ad AFTER DELETE ON inventory BEGIN
    INSERT INTO inventory_fts(inventory_fts, rowid, id, name)
    VALUES ('delete', old.rowid, old.id, old.name);
END;

CREATE TRIGGER IF NOT EXISTS inventory_au AFTER UPDATE ON inventory BEGIN
    INSERT INTO inventory_fts(inventory_fts, rowid, id, name)
    VALUES ('delete', old.rowid, old.id, old.name);
    INSERT INTO inventory_fts(rowid, id, name)
    VALUES (new.rowid, new.id, new.name);
END;

-- ============================================================================
-- Consultations (immutable after insert)
-- ============================================================================

CREATE TABLE IF NOT EXISTS consultations (
    id TEXT PRIMARY KEY,
    patient_id TEXT NOT NULL REFERENCES patients(id),
    date TEXT NOT NULL,
    symptoms TEXT NOT NULL DEFAULT '',
    diagnosis TEXT NOT NULL DEFAULT '',
    prescription TEXT NOT NULL DEFAULT '',
    consultation_price REAL NOT NULL DEFAULT 0,
    medications TEXT NOT NULL DEFAULT '[]',      -- JSON array of line items
    total REAL NOT NULL DEFAULT 0,
    notes TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- History is read patient-first, newest-first
CREATE INDEX IF NOT EXISTS idx_consultations_patient_date
    ON consultations(patient_id, date DESC);
"#;
