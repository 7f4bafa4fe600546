use async_trait::async_trait;

use crate::db::models::{ListStats, ListType, NewEntry, UsernameEntry};
use crate::error::ListsError;

pub const DUPLICATE_MSG: &str = "Username already exists in this list";

/// Storage contract shared by the embedded and remote backends.
///
/// Every method maps to one or two parameterized statements; the handlers
/// never see SQL.
#[async_trait]
pub trait UsernameStore: Send + Sync {
    /// Short backend name reported by the health check.
    fn backend(&self) -> &'static str;

    async fn init_schema(&self) -> Result<(), ListsError>;

    async fn ping(&self) -> Result<(), ListsError>;

    /// All entries, newest first, optionally restricted to one list.
    async fn list(&self, list_type: Option<ListType>) -> Result<Vec<UsernameEntry>, ListsError>;

    async fn get(&self, id: i64) -> Result<Option<UsernameEntry>, ListsError>;

    /// Insert a new entry. A duplicate `(username, list_type)` yields `Conflict`.
    async fn insert(&self, entry: NewEntry) -> Result<UsernameEntry, ListsError>;

    /// Overwrite the mutable columns of row `id`. `Ok(None)` when no row matched.
    async fn update(&self, id: i64, entry: NewEntry) -> Result<Option<UsernameEntry>, ListsError>;

    /// Returns whether a row was removed.
    async fn delete(&self, id: i64) -> Result<bool, ListsError>;

    /// Remove every entry of one list, returning the number removed.
    async fn delete_list(&self, list_type: ListType) -> Result<u64, ListsError>;

    /// Insert unless the pair already exists. Returns whether a row was added.
    async fn insert_ignore(&self, entry: NewEntry) -> Result<bool, ListsError>;

    /// Case-insensitive substring match over username, display name and notes.
    async fn search(
        &self,
        term: &str,
        list_type: Option<ListType>,
    ) -> Result<Vec<UsernameEntry>, ListsError>;

    async fn stats(&self) -> Result<ListStats, ListsError>;
}

/// Build a `LIKE` pattern matching `term` anywhere, with wildcards in the
/// term escaped by `\`.
pub fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}
