use crate::error::ListsError;
use crate::types::{normalize_optional_text, normalize_username};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The two lists an entry can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListType {
    Following,
    Followers,
}

impl ListType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListType::Following => "following",
            ListType::Followers => "followers",
        }
    }
}

impl fmt::Display for ListType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListType {
    type Err = ListsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "following" => Ok(ListType::Following),
            "followers" => Ok(ListType::Followers),
            _ => Err(ListsError::validation(
                "list_type must be either 'following' or 'followers'",
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UsernameEntry {
    pub id: i64,
    pub username: String,
    pub list_type: ListType,
    pub display_name: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UsernameEntry {
    /// Unicode case-insensitive substring match over the searchable fields.
    /// `needle` must already be lowercased.
    pub fn matches_term(&self, needle: &str) -> bool {
        [
            Some(self.username.as_str()),
            self.display_name.as_deref(),
            self.notes.as_deref(),
        ]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(needle))
    }
}

/// A validated row ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEntry {
    pub username: String,
    pub list_type: ListType,
    pub display_name: Option<String>,
    pub notes: Option<String>,
}

impl NewEntry {
    pub fn new(
        username: &str,
        list_type: ListType,
        display_name: Option<String>,
        notes: Option<String>,
    ) -> Result<Self, ListsError> {
        let username = normalize_username(username);
        if username.is_empty() {
            return Err(ListsError::validation("username cannot be empty"));
        }
        Ok(Self {
            username,
            list_type,
            display_name: normalize_optional_text(display_name),
            notes: normalize_optional_text(notes),
        })
    }
}

/// Partial update. `None` keeps the stored value; for the optional text
/// fields `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryPatch {
    pub username: Option<String>,
    pub list_type: Option<ListType>,
    pub display_name: Option<Option<String>>,
    pub notes: Option<Option<String>>,
}

impl EntryPatch {
    /// Overlay the patch on `existing`, producing the full row to write back.
    pub fn merge_onto(self, existing: &UsernameEntry) -> Result<NewEntry, ListsError> {
        let username = self.username.unwrap_or_else(|| existing.username.clone());
        let list_type = self.list_type.unwrap_or(existing.list_type);
        let display_name = self
            .display_name
            .unwrap_or_else(|| existing.display_name.clone());
        let notes = self.notes.unwrap_or_else(|| existing.notes.clone());
        NewEntry::new(&username, list_type, display_name, notes)
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListStats {
    pub following: i64,
    pub followers: i64,
    pub total: i64,
}

impl ListStats {
    /// Build from per-list counts; `total` is always the sum.
    pub fn from_counts<I>(counts: I) -> Self
    where
        I: IntoIterator<Item = (ListType, i64)>,
    {
        let mut stats = ListStats::default();
        for (list_type, count) in counts {
            match list_type {
                ListType::Following => stats.following += count,
                ListType::Followers => stats.followers += count,
            }
        }
        stats.total = stats.following + stats.followers;
        stats
    }
}
