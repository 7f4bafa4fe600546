//! SQL DDL for the `usernames` table, one script per backend.
//! Both scripts are idempotent and run on every startup.

/// SQLite schema:
/// - `id` INTEGER PRIMARY KEY AUTOINCREMENT
/// - `(username, list_type)` UNIQUE
/// - timestamps as RFC3339 text written by the service
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS usernames (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL,
    list_type TEXT NOT NULL CHECK (list_type IN ('following', 'followers')),
    display_name TEXT NULL,
    notes TEXT NULL,
    created_at TEXT NOT NULL, -- RFC3339
    updated_at TEXT NOT NULL, -- RFC3339
    UNIQUE (username, list_type)
);

CREATE INDEX IF NOT EXISTS idx_usernames_list_type ON usernames(list_type);
"#;

/// PostgreSQL schema, same shape with server-side timestamps.
pub const POSTGRES_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS usernames (
    id BIGSERIAL PRIMARY KEY,
    username TEXT NOT NULL,
    list_type TEXT NOT NULL CHECK (list_type IN ('following', 'followers')),
    display_name TEXT NULL,
    notes TEXT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    UNIQUE (username, list_type)
);

CREATE INDEX IF NOT EXISTS idx_usernames_list_type ON usernames(list_type);
"#;

/// Split a DDL script into individual statements; sqlx prepares one at a time.
pub fn statements(script: &str) -> impl Iterator<Item = &str> {
    script
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripts_split_into_table_and_index() {
        assert_eq!(statements(SQLITE_INIT).count(), 2);
        assert_eq!(statements(POSTGRES_INIT).count(), 2);
    }
}
