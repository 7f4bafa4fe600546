use crate::db::models::{ListStats, ListType, NewEntry, UsernameEntry};
use crate::db::schema::{SQLITE_INIT, statements};
use crate::db::store::{DUPLICATE_MSG, UsernameStore};
use crate::error::ListsError;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow, SqliteSynchronous,
};
use sqlx::{Pool, Row, Sqlite};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

pub type SqlitePool = Pool<Sqlite>;

const SELECT_COLUMNS: &str =
    "SELECT id, username, list_type, display_name, notes, created_at, updated_at FROM usernames";

/// Embedded backend: a SQLite file on local disk.
///
/// Every mutation that touched rows is followed by a WAL checkpoint so the
/// database file itself holds the change before the caller gets a reply.
#[derive(Clone)]
pub struct EmbeddedStore {
    pool: SqlitePool,
}

impl EmbeddedStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if needed) the database file at `path`.
    pub async fn open(path: &Path, max_connections: u32) -> Result<Self, ListsError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let connect_opts = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Full)
            .busy_timeout(Duration::from_secs(5));
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(connect_opts)
            .await?;
        info!(path = %path.display(), "opened embedded database");
        Ok(Self::new(pool))
    }

    /// Open from a `sqlite:` URL, e.g. `sqlite::memory:` for throwaway stores.
    #[cfg(test)]
    async fn open_url(url: &str) -> Result<Self, ListsError> {
        let connect_opts = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(connect_opts)
            .await?;
        Ok(Self::new(pool))
    }

    /// Write the WAL back into the main database file.
    pub async fn flush(&self) -> Result<(), ListsError> {
        sqlx::query("PRAGMA wal_checkpoint(TRUNCATE)")
            .execute(&self.pool)
            .await?;
        debug!("embedded database flushed to disk");
        Ok(())
    }

    fn now() -> String {
        Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    fn row_to_model(row: SqliteRow) -> Result<UsernameEntry, ListsError> {
        let id: i64 = row.try_get("id")?;
        let username: String = row.try_get("username")?;
        let list_type_str: String = row.try_get("list_type")?;
        let display_name: Option<String> = row.try_get("display_name")?;
        let notes: Option<String> = row.try_get("notes")?;
        let created_str: String = row.try_get("created_at")?;
        let updated_str: String = row.try_get("updated_at")?;

        let list_type = ListType::from_str(&list_type_str).map_err(|_| {
            ListsError::UnexpectedError(format!("row {id} has unknown list_type {list_type_str}"))
        })?;

        Ok(UsernameEntry {
            id,
            username,
            list_type,
            display_name,
            notes,
            created_at: Self::parse_timestamp(&created_str)?,
            updated_at: Self::parse_timestamp(&updated_str)?,
        })
    }

    fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, ListsError> {
        let parsed = DateTime::parse_from_rfc3339(s)
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?
            .with_timezone(&Utc);
        Ok(parsed)
    }
}

#[async_trait]
impl UsernameStore for EmbeddedStore {
    fn backend(&self) -> &'static str {
        "embedded"
    }

    async fn init_schema(&self) -> Result<(), ListsError> {
        for stmt in statements(SQLITE_INIT) {
            sqlx::query(stmt).execute(&self.pool).await?;
        }
        self.flush().await
    }

    async fn ping(&self) -> Result<(), ListsError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn list(&self, list_type: Option<ListType>) -> Result<Vec<UsernameEntry>, ListsError> {
        let filter = list_type.map(|l| l.as_str());
        let rows = sqlx::query(&format!(
            "{SELECT_COLUMNS} WHERE (? IS NULL OR list_type = ?) ORDER BY created_at DESC, id DESC"
        ))
        .bind(filter)
        .bind(filter)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Self::row_to_model).collect()
    }

    async fn get(&self, id: i64) -> Result<Option<UsernameEntry>, ListsError> {
        let row = sqlx::query(&format!("{SELECT_COLUMNS} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Self::row_to_model).transpose()
    }

    async fn insert(&self, entry: NewEntry) -> Result<UsernameEntry, ListsError> {
        let now = Self::now();
        let result = sqlx::query(
            r#"INSERT INTO usernames (username, list_type, display_name, notes, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&entry.username)
        .bind(entry.list_type.as_str())
        .bind(&entry.display_name)
        .bind(&entry.notes)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| ListsError::from_write(e, DUPLICATE_MSG))?;
        self.flush().await?;

        let id = result.last_insert_rowid();
        self.get(id)
            .await?
            .ok_or_else(|| ListsError::UnexpectedError(format!("inserted row {id} vanished")))
    }

    async fn update(&self, id: i64, entry: NewEntry) -> Result<Option<UsernameEntry>, ListsError> {
        let result = sqlx::query(
            r#"UPDATE usernames SET
                username = ?,
                list_type = ?,
                display_name = ?,
                notes = ?,
                updated_at = ?
              WHERE id = ?"#,
        )
        .bind(&entry.username)
        .bind(entry.list_type.as_str())
        .bind(&entry.display_name)
        .bind(&entry.notes)
        .bind(Self::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| ListsError::from_write(e, DUPLICATE_MSG))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.flush().await?;
        self.get(id).await
    }

    async fn delete(&self, id: i64) -> Result<bool, ListsError> {
        let result = sqlx::query("DELETE FROM usernames WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        let deleted = result.rows_affected() > 0;
        if deleted {
            self.flush().await?;
        }
        Ok(deleted)
    }

    async fn delete_list(&self, list_type: ListType) -> Result<u64, ListsError> {
        let result = sqlx::query("DELETE FROM usernames WHERE list_type = ?")
            .bind(list_type.as_str())
            .execute(&self.pool)
            .await?;
        let removed = result.rows_affected();
        if removed > 0 {
            self.flush().await?;
        }
        Ok(removed)
    }

    async fn insert_ignore(&self, entry: NewEntry) -> Result<bool, ListsError> {
        let now = Self::now();
        let result = sqlx::query(
            r#"INSERT OR IGNORE INTO usernames (username, list_type, display_name, notes, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&entry.username)
        .bind(entry.list_type.as_str())
        .bind(&entry.display_name)
        .bind(&entry.notes)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;
        let inserted = result.rows_affected() > 0;
        if inserted {
            self.flush().await?;
        }
        Ok(inserted)
    }

    /// SQLite's `LOWER`/`LIKE` fold ASCII only, so matching happens here
    /// with Unicode lowercasing over the (optionally list-filtered) rows.
    async fn search(
        &self,
        term: &str,
        list_type: Option<ListType>,
    ) -> Result<Vec<UsernameEntry>, ListsError> {
        let needle = term.to_lowercase();
        let entries = self.list(list_type).await?;
        Ok(entries
            .into_iter()
            .filter(|entry| entry.matches_term(&needle))
            .collect())
    }

    async fn stats(&self) -> Result<ListStats, ListsError> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT list_type, COUNT(*) FROM usernames GROUP BY list_type")
                .fetch_all(&self.pool)
                .await?;
        let counts = rows
            .into_iter()
            .map(|(list_type, count)| ListType::from_str(&list_type).map(|l| (l, count)))
            .collect::<Result<Vec<_>, ListsError>>()?;
        Ok(ListStats::from_counts(counts))
    }
}
