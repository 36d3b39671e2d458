//! Opaque keyset-pagination tokens. The token is the serialized last evaluated
//! key, base64-encoded so clients treat it as a cursor and nothing more.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult, ErrorCode};

#[derive(Debug, Serialize, Deserialize)]
struct LastKey {
    k: String,
}

pub fn encode_token(last_key: &str) -> String {
    let json = serde_json::to_vec(&LastKey { k: last_key.to_string() })
        .expect("last key serializes");
    URL_SAFE_NO_PAD.encode(json)
}

pub fn decode_token(token: &str) -> AppResult<String> {
    let invalid = || AppError::domain(ErrorCode::InvalidCursor, "Malformed continuation token");
    let bytes = URL_SAFE_NO_PAD.decode(token).map_err(|_| invalid())?;
    let key: LastKey = serde_json::from_slice(&bytes).map_err(|_| invalid())?;
    Ok(key.k)
}

/// One page of results plus the cursor for the next page, if any.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

impl<T> Page<T> {
    /// Builds a page from `limit + 1` fetched rows, keyed by `key_of`.
    pub fn from_rows(mut rows: Vec<T>, limit: usize, key_of: impl Fn(&T) -> &str) -> Self {
        let next_token = if rows.len() > limit {
            rows.truncate(limit);
            rows.last().map(|row| encode_token(key_of(row)))
        } else {
            None
        };
        Page { items: rows, next_token }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trips() {
        let token = encode_token("zoe@example.com");
        assert_eq!(decode_token(&token).unwrap(), "zoe@example.com");
    }

    #[test]
    fn garbage_tokens_are_rejected_as_invalid_cursor() {
        for bad in ["%%%", "bm90LWpzb24", ""] {
            let err = decode_token(bad).unwrap_err();
            assert_eq!(err.code(), Some(ErrorCode::InvalidCursor), "{bad}");
        }
    }

    #[test]
    fn page_truncates_and_links_when_overfetched() {
        let rows: Vec<String> = (0..4).map(|i| format!("u{i}@x.com")).collect();
        let page = Page::from_rows(rows, 3, |s| s.as_str());
        assert_eq!(page.items.len(), 3);
        let cursor = page.next_token.expect("expected a cursor");
        assert_eq!(decode_token(&cursor).unwrap(), "u2@x.com");
    }

    #[test]
    fn page_omits_cursor_on_final_page() {
        let rows: Vec<String> = vec!["a@x.com".into()];
        let page = Page::from_rows(rows, 3, |s| s.as_str());
        assert_eq!(page.items.len(), 1);
        assert!(page.next_token.is_none());
    }
}
