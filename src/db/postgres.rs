use crate::db::models::{ListStats, ListType, NewEntry, UsernameEntry};
use crate::db::schema::{POSTGRES_INIT, statements};
use crate::db::store::{DUPLICATE_MSG, UsernameStore, like_pattern};
use crate::error::ListsError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool};
use std::str::FromStr;
use tracing::info;

const SELECT_COLUMNS: &str =
    "SELECT id, username, list_type, display_name, notes, created_at, updated_at FROM usernames";

/// Row as Postgres returns it; `list_type` is checked on conversion.
#[derive(Debug, FromRow)]
struct PgUsernameRow {
    id: i64,
    username: String,
    list_type: String,
    display_name: Option<String>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PgUsernameRow> for UsernameEntry {
    type Error = ListsError;

    fn try_from(row: PgUsernameRow) -> Result<Self, Self::Error> {
        let list_type = ListType::from_str(&row.list_type).map_err(|_| {
            ListsError::UnexpectedError(format!(
                "row {} has unknown list_type {}",
                row.id, row.list_type
            ))
        })?;
        Ok(UsernameEntry {
            id: row.id,
            username: row.username,
            list_type,
            display_name: row.display_name,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Remote backend: a managed PostgreSQL database reached by URL.
#[derive(Clone)]
pub struct RemoteStore {
    pool: PgPool,
}

impl RemoteStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, ListsError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect(database_url)
            .await?;
        info!("connected to remote database");
        Ok(Self::new(pool))
    }

    fn into_entries(rows: Vec<PgUsernameRow>) -> Result<Vec<UsernameEntry>, ListsError> {
        rows.into_iter().map(UsernameEntry::try_from).collect()
    }
}

#[async_trait]
impl UsernameStore for RemoteStore {
    fn backend(&self) -> &'static str {
        "remote"
    }

    async fn init_schema(&self) -> Result<(), ListsError> {
        for stmt in statements(POSTGRES_INIT) {
            sqlx::query(stmt).execute(&self.pool).await?;
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), ListsError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn list(&self, list_type: Option<ListType>) -> Result<Vec<UsernameEntry>, ListsError> {
        let rows: Vec<PgUsernameRow> = sqlx::query_as(&format!(
            "{SELECT_COLUMNS} WHERE ($1::TEXT IS NULL OR list_type = $1) ORDER BY created_at DESC, id DESC"
        ))
        .bind(list_type.map(|l| l.as_str()))
        .fetch_all(&self.pool)
        .await?;
        Self::into_entries(rows)
    }

    async fn get(&self, id: i64) -> Result<Option<UsernameEntry>, ListsError> {
        let row: Option<PgUsernameRow> = sqlx::query_as(&format!("{SELECT_COLUMNS} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(UsernameEntry::try_from).transpose()
    }

    async fn insert(&self, entry: NewEntry) -> Result<UsernameEntry, ListsError> {
        let (id,): (i64,) = sqlx::query_as(
            r#"INSERT INTO usernames (username, list_type, display_name, notes)
               VALUES ($1, $2, $3, $4)
               RETURNING id"#,
        )
        .bind(&entry.username)
        .bind(entry.list_type.as_str())
        .bind(&entry.display_name)
        .bind(&entry.notes)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| ListsError::from_write(e, DUPLICATE_MSG))?;

        self.get(id)
            .await?
            .ok_or_else(|| ListsError::UnexpectedError(format!("inserted row {id} vanished")))
    }

    async fn update(&self, id: i64, entry: NewEntry) -> Result<Option<UsernameEntry>, ListsError> {
        let result = sqlx::query(
            r#"UPDATE usernames SET
                username = $1,
                list_type = $2,
                display_name = $3,
                notes = $4,
                updated_at = NOW()
              WHERE id = $5"#,
        )
        .bind(&entry.username)
        .bind(entry.list_type.as_str())
        .bind(&entry.display_name)
        .bind(&entry.notes)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| ListsError::from_write(e, DUPLICATE_MSG))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get(id).await
    }

    async fn delete(&self, id: i64) -> Result<bool, ListsError> {
        let result = sqlx::query("DELETE FROM usernames WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_list(&self, list_type: ListType) -> Result<u64, ListsError> {
        let result = sqlx::query("DELETE FROM usernames WHERE list_type = $1")
            .bind(list_type.as_str())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn insert_ignore(&self, entry: NewEntry) -> Result<bool, ListsError> {
        let result = sqlx::query(
            r#"INSERT INTO usernames (username, list_type, display_name, notes)
               VALUES ($1, $2, $3, $4)
               ON CONFLICT (username, list_type) DO NOTHING"#,
        )
        .bind(&entry.username)
        .bind(entry.list_type.as_str())
        .bind(&entry.display_name)
        .bind(&entry.notes)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn search(
        &self,
        term: &str,
        list_type: Option<ListType>,
    ) -> Result<Vec<UsernameEntry>, ListsError> {
        let rows: Vec<PgUsernameRow> = sqlx::query_as(&format!(
            r#"{SELECT_COLUMNS}
               WHERE (username ILIKE $1 ESCAPE '\'
                   OR COALESCE(display_name, '') ILIKE $1 ESCAPE '\'
                   OR COALESCE(notes, '') ILIKE $1 ESCAPE '\')
                 AND ($2::TEXT IS NULL OR list_type = $2)
               ORDER BY created_at DESC, id DESC"#
        ))
        .bind(like_pattern(term))
        .bind(list_type.map(|l| l.as_str()))
        .fetch_all(&self.pool)
        .await?;
        Self::into_entries(rows)
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
