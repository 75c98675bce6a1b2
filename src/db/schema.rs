//! Database schema and migrations for taskdeck.
//!
//! This module contains all database migrations that will be applied
//! sequentially when the database is first opened or upgraded.

/// Database migrations.
///
/// Each migration is a SQL script that will be executed in order.
/// The schema_version table tracks which migrations have been applied.
pub const MIGRATIONS: &[&str] = &[
    // v1: Initial schema - users table
    r#"
-- Users table for accounts and authentication
CREATE TABLE users (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    email       TEXT NOT NULL UNIQUE COLLATE NOCASE,
    password    TEXT NOT NULL,           -- Argon2 hash
    name        TEXT NOT NULL,
    avatar_url  TEXT,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE INDEX idx_users_email ON users(email);
"#,
    // v2: Tasks table
    r#"
-- Tasks table; progress is derived from subtasks and maintained server-side
CREATE TABLE tasks (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    title       TEXT NOT NULL,
    description TEXT,
    status      TEXT NOT NULL DEFAULT 'draft',     -- 'draft', 'in_progress', 'editing', 'done'
    task_type   TEXT NOT NULL DEFAULT 'main',      -- 'main', 'secondary', 'tertiary'
    priority    TEXT NOT NULL DEFAULT 'medium',    -- 'low', 'medium', 'high', 'urgent'
    progress    INTEGER NOT NULL DEFAULT 0,
    tags        TEXT NOT NULL DEFAULT '[]',        -- JSON array of strings
    category    TEXT,
    due_date    TEXT,
    creator_id  INTEGER NOT NULL REFERENCES users(id),
    assignee_id INTEGER REFERENCES users(id),
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE INDEX idx_tasks_creator_status ON tasks(creator_id, status);
CREATE INDEX idx_tasks_assignee_status ON tasks(assignee_id, status);
CREATE INDEX idx_tasks_created_at ON tasks(created_at);
"#,
    // v3: Subtasks table
    r#"
-- Subtasks are owned by their parent task and have no independent lifecycle
CREATE TABLE subtasks (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    task_id     INTEGER NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
    text        TEXT NOT NULL,
    completed   INTEGER NOT NULL DEFAULT 0,
    author_id   INTEGER NOT NULL REFERENCES users(id),
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE INDEX idx_subtasks_task_id ON subtasks(task_id);
"#,
];
