//! Cursor pagination types for list endpoints.
//!
//! Cursors are opaque to callers: the base64-url encoding of the last
//! returned item's UUID. Because IDs are UUID v7, `id < cursor` ordered
//! descending yields a stable newest-first walk without offset drift.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default page size when the caller does not pass `limit`.
pub const DEFAULT_PAGE_SIZE: u64 = 20;
/// Hard ceiling on page size.
pub const MAX_PAGE_SIZE: u64 = 100;

/// Query parameters for cursor-paginated list endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CursorQuery {
    /// Number of items per page (clamped to [`MAX_PAGE_SIZE`]).
    pub limit: Option<u64>,
    /// Opaque cursor returned by a previous page.
    pub cursor: Option<String>,
}

impl CursorQuery {
    /// Effective page size, defaulted and clamped.
    #[must_use]
    pub fn page_size(&self) -> u64 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }

    /// Decodes the cursor into the UUID it names, if present.
    ///
    /// Returns `Err` on a cursor that is not valid base64-url or does not
    /// decode to a UUID, so callers can reject garbage instead of silently
    /// restarting from the first page.
    pub fn decode_cursor(&self) -> Result<Option<Uuid>, CursorError> {
        self.cursor.as_deref().map(decode_cursor).transpose()
    }
}

/// A single page of results plus the cursor for the next one.
#[derive(Debug, Clone, Serialize)]
pub struct CursorPage<T> {
    /// The items in this page, newest first.
    pub data: Vec<T>,
    /// Cursor for the next page; `None` when this is the last page.
    pub next_cursor: Option<String>,
    /// Whether more items exist beyond this page.
    pub has_more: bool,
}

impl<T> CursorPage<T> {
    /// Builds a page from one-more-than-requested items.
    ///
    /// `items` must have been fetched with `limit + 1`; the extra item, if
    /// present, proves there is a following page and is dropped.
    #[must_use]
    pub fn from_overfetch(mut items: Vec<T>, limit: u64, cursor_of: impl Fn(&T) -> Uuid) -> Self {
        let has_more = items.len() as u64 > limit;
        if has_more {
            items.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        }
        let next_cursor = if has_more {
            items.last().map(|item| encode_cursor(cursor_of(item)))
        } else {
            None
        };
        Self {
            data: items,
            next_cursor,
            has_more,
        }
    }
}

/// Error for malformed pagination cursors.
#[derive(Debug, thiserror::Error)]
#[error("invalid pagination cursor")]
pub struct CursorError;

/// Encodes a UUID as an opaque cursor string.
#[must_use]
pub fn encode_cursor(id: Uuid) -> String {
    base64_url::encode(id.as_bytes())
}

/// Decodes a cursor string back into a UUID.
pub fn decode_cursor(cursor: &str) -> Result<Uuid, CursorError> {
    let bytes = base64_url::decode(cursor).map_err(|_| CursorError)?;
    Uuid::from_slice(&bytes).map_err(|_| CursorError)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_roundtrip() {
        let id = Uuid::new_v4();
        let cursor = encode_cursor(id);
        assert_eq!(decode_cursor(&cursor).unwrap(), id);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_cursor("???not-base64???").is_err());
        assert!(decode_cursor("dG9vLXNob3J0").is_err());
    }

    #[test]
    fn test_page_size_defaults_and_clamps() {
        assert_eq!(CursorQuery::default().page_size(), DEFAULT_PAGE_SIZE);
        let big = CursorQuery {
            limit: Some(10_000),
            cursor: None,
        };
        assert_eq!(big.page_size(), MAX_PAGE_SIZE);
        let zero = CursorQuery {
            limit: Some(0),
            cursor: None,
        };
        assert_eq!(zero.page_size(), 1);
    }

    #[test]
    fn test_from_overfetch_paging() {
        let ids: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();

        let page = CursorPage::from_overfetch(ids.clone(), 3, |id| *id);
        assert_eq!(page.data.len(), 3);
        assert!(page.has_more);
        let next = decode_cursor(page.next_cursor.as_deref().unwrap()).unwrap();
        assert_eq!(next, ids[2]);

        let last = CursorPage::from_overfetch(ids[..2].to_vec(), 3, |id| *id);
        assert_eq!(last.data.len(), 2);
        assert!(!last.has_more);
        assert!(last.next_cursor.is_none());
    }
}
