use axum::extract::{Path, State};
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;
use tracing::{info, warn};

use crate::db::{EntryPatch, ListType, NewEntry, UsernameEntry};
use crate::error::ListsError;
use crate::handlers::{entry_not_found, parse_id, parse_list_filter};
use crate::middleware::{ApiJson, ApiQuery};
use crate::router::ListsState;
use crate::types::ApiResponse;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub list_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateUsernameRequest {
    pub username: Option<String>,
    pub list_type: Option<String>,
    pub display_name: Option<String>,
    pub notes: Option<String>,
}

/// Absent fields keep their stored value; `null` clears the optional text fields.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUsernameRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub list_type: Option<String>,
    #[serde(default, deserialize_with = "present_or_null")]
    pub display_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "present_or_null")]
    pub notes: Option<Option<String>>,
}

fn present_or_null<'de, D>(de: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(de).map(Some)
}

/// One bulk item: a bare handle or a handle with details. Anything else is
/// kept as `Invalid` so it can be skipped without failing the batch.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum BulkItem {
    Name(String),
    Detailed {
        username: String,
        #[serde(default)]
        display_name: Option<String>,
        #[serde(default)]
        notes: Option<String>,
    },
    Invalid(serde_json::Value),
}

impl BulkItem {
    fn into_entry(self, list_type: ListType) -> Result<NewEntry, ListsError> {
        match self {
            BulkItem::Name(name) => NewEntry::new(&name, list_type, None, None),
            BulkItem::Detailed {
                username,
                display_name,
                notes,
            } => NewEntry::new(&username, list_type, display_name, notes),
            BulkItem::Invalid(value) => Err(ListsError::validation(format!(
                "unsupported bulk item: {value}"
            ))),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct BulkImportRequest {
    pub usernames: Option<Vec<BulkItem>>,
    pub list_type: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BulkImportResult {
    pub imported: usize,
    pub skipped: usize,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct DeletedEntry {
    pub id: i64,
}

#[derive(Debug, Serialize)]
pub struct DeletedList {
    pub list_type: ListType,
    pub deleted: u64,
}

/// GET /api/usernames
pub async fn list_usernames(
    State(state): State<ListsState>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> Result<ApiResponse<Vec<UsernameEntry>>, ListsError> {
    let filter = parse_list_filter(query.list_type.as_deref())?;
    let entries = state.store.list(filter).await?;
    Ok(ApiResponse::ok(entries))
}

/// GET /api/usernames/{id}
pub async fn get_username(
    State(state): State<ListsState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<UsernameEntry>, ListsError> {
    let id = parse_id(&id)?;
    let entry = state.store.get(id).await?.ok_or_else(|| entry_not_found(id))?;
    Ok(ApiResponse::ok(entry))
}

/// POST /api/usernames
pub async fn create_username(
    State(state): State<ListsState>,
    ApiJson(req): ApiJson<CreateUsernameRequest>,
) -> Result<ApiResponse<UsernameEntry>, ListsError> {
    let (Some(username), Some(list_type)) = (req.username, req.list_type) else {
        return Err(ListsError::validation("username and list_type are required"));
    };
    let list_type = ListType::from_str(&list_type)?;
    let entry = NewEntry::new(&username, list_type, req.display_name, req.notes)?;

    let created = state.store.insert(entry).await?;
    info!(
        id = created.id,
        username = %created.username,
        list_type = %created.list_type,
        "username added"
    );
    Ok(ApiResponse::created(created))
}

/// PUT /api/usernames/{id}
pub async fn update_username(
    State(state): State<ListsState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateUsernameRequest>,
) -> Result<ApiResponse<UsernameEntry>, ListsError> {
    let id = parse_id(&id)?;
    let existing = state.store.get(id).await?.ok_or_else(|| entry_not_found(id))?;

    let patch = EntryPatch {
        username: req.username,
        list_type: req.list_type.as_deref().map(ListType::from_str).transpose()?,
        display_name: req.display_name,
        notes: req.notes,
    };
    let merged = patch.merge_onto(&existing)?;

    let updated = state
        .store
        .update(id, merged)
        .await?
        .ok_or_else(|| entry_not_found(id))?;
    info!(id, "username updated");
    Ok(ApiResponse::ok(updated))
}

/// DELETE /api/usernames/{id}
pub async fn delete_username(
    State(state): State<ListsState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<DeletedEntry>, ListsError> {
    let id = parse_id(&id)?;
    if !state.store.delete(id).await? {
        return Err(entry_not_found(id));
    }
    info!(id, "username deleted");
    Ok(ApiResponse::ok(DeletedEntry { id }))
}

/// DELETE /api/usernames/list/{list_type}
pub async fn delete_list(
    State(state): State<ListsState>,
    Path(list_type): Path<String>,
) -> Result<ApiResponse<DeletedList>, ListsError> {
    let list_type = ListType::from_str(&list_type)?;
    let deleted = state.store.delete_list(list_type).await?;
    info!(%list_type, deleted, "list cleared");
    Ok(ApiResponse::ok(DeletedList { list_type, deleted }))
}

/// POST /api/usernames/bulk
///
/// Best effort: each item is an independent insert-or-ignore, so existing
/// pairs, blank handles and individual failures are counted as skipped.
pub async fn bulk_import(
    State(state): State<ListsState>,
    ApiJson(req): ApiJson<BulkImportRequest>,
) -> Result<ApiResponse<BulkImportResult>, ListsError> {
    let items = req.usernames.filter(|items| !items.is_empty()).ok_or_else(|| {
        ListsError::validation("usernames must be a non-empty array")
    })?;
    let list_type = req
        .list_type
        .as_deref()
        .ok_or_else(|| ListsError::validation("list_type is required"))
        .and_then(ListType::from_str)?;

    let total = items.len();
    let mut imported = 0;
    for item in items {
        let entry = match item.into_entry(list_type) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "bulk import item skipped");
                continue;
            }
        };
        match state.store.insert_ignore(entry).await {
            Ok(true) => imported += 1,
            Ok(false) => {}
            Err(e) => warn!(error = %e, "bulk import item failed"),
        }
    }

    info!(%list_type, imported, total, "bulk import finished");
    Ok(ApiResponse::ok(BulkImportResult {
        imported,
        skipped: total - imported,
        total,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_request_distinguishes_null_from_absent() {
        let req: UpdateUsernameRequest =
            serde_json::from_str(r#"{"display_name": null}"#).unwrap();
        assert_eq!(req.display_name, Some(None));
        assert_eq!(req.notes, None);
        assert_eq!(req.username, None);
    }

    #[test]
    fn bulk_items_accept_strings_and_objects() {
        let req: BulkImportRequest = serde_json::from_str(
            r#"{"list_type": "following", "usernames": ["@a", {"username": "b", "notes": "n"}]}"#,
        )
        .unwrap();
        let entries: Vec<NewEntry> = req
            .usernames
            .unwrap()
            .into_iter()
            .map(|item| item.into_entry(ListType::Following).unwrap())
            .collect();
        assert_eq!(entries[0].username, "a");
        assert_eq!(entries[1].username, "b");
        assert_eq!(entries[1].notes.as_deref(), Some("n"));
    }

    #[test]
    fn malformed_bulk_items_are_kept_as_invalid() {
        let req: BulkImportRequest = serde_json::from_str(
            r#"{"list_type": "following", "usernames": ["ok", null, 5, {"username": 7}]}"#,
        )
        .unwrap();
        let items = req.usernames.unwrap();
        assert_eq!(items.len(), 4);
        assert!(matches!(items[0], BulkItem::Name(_)));
        assert!(items[1..].iter().all(|i| matches!(i, BulkItem::Invalid(_))));
        let results: Vec<bool> = items
            .into_iter()
            .map(|i| i.into_entry(ListType::Following).is_ok())
            .collect();
        assert_eq!(results, vec![true, false, false, false]);
    }
}
