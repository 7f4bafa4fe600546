pub mod health;
pub mod search;
pub mod usernames;

use std::str::FromStr;

use crate::db::ListType;
use crate::error::ListsError;

/// Optional `list_type` query filter; a blank value means "no filter".
pub(crate) fn parse_list_filter(raw: Option<&str>) -> Result<Option<ListType>, ListsError> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ListType::from_str)
        .transpose()
}

pub(crate) fn parse_id(raw: &str) -> Result<i64, ListsError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ListsError::validation(format!("Invalid id: {raw}")))
}

pub(crate) fn entry_not_found(id: i64) -> ListsError {
    ListsError::NotFound(format!("Username entry {id} not found"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_filter_is_none() {
        assert_eq!(parse_list_filter(None).unwrap(), None);
        assert_eq!(parse_list_filter(Some("  ")).unwrap(), None);
        assert_eq!(
            parse_list_filter(Some("followers")).unwrap(),
            Some(ListType::Followers)
        );
        assert!(parse_list_filter(Some("nope")).is_err());
    }

    #[test]
    fn id_must_be_integer() {
        assert_eq!(parse_id("12").unwrap(), 12);
        assert!(parse_id("abc").is_err());
    }
}
