//! SQL schema for the HOSCON SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS departments (
    id      INTEGER PRIMARY KEY,
    name    TEXT NOT NULL UNIQUE,
    status  TEXT NOT NULL DEFAULT 'Green',  -- 'Green' | 'Yellow' | 'Red'
    notes   TEXT NOT NULL DEFAULT ''
);

-- department_id has no REFERENCES clause; staff updates accept any id.
CREATE TABLE IF NOT EXISTS staff (
    id            INTEGER PRIMARY KEY,
    name          TEXT NOT NULL UNIQUE,
    role          TEXT NOT NULL,
    department_id INTEGER,
    present       INTEGER NOT NULL DEFAULT 0
);

-- Incidents are immutable; no UPDATE or DELETE is ever issued against them.
CREATE TABLE IF NOT EXISTS incidents (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    type        TEXT NOT NULL,
    description TEXT NOT NULL,
    timestamp   TEXT NOT NULL   -- RFC 3339 UTC, microseconds; store-assigned
);

CREATE TABLE IF NOT EXISTS tasks (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    incident_id INTEGER NOT NULL REFERENCES incidents(id),
    title       TEXT NOT NULL,
    assigned_to INTEGER,
    status      TEXT NOT NULL,  -- 'Open' | 'In Progress' | 'Completed'
    timestamp   TEXT NOT NULL   -- time of last status change
);

CREATE INDEX IF NOT EXISTS tasks_incident_idx ON tasks(incident_id);

PRAGMA user_version = 1;
";
