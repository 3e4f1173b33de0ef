//! Feed pagination: the append-only page accumulator and the opaque cursor
//! wrapping upstream page tokens for use in our own URLs.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::repos::PostBatch;
use crate::domain::posts::PostSummary;

/// Accumulated feed state for one rendered view: results in fetch order plus
/// the upstream token for the next batch, if any. Append-only; discarded on
/// navigation.
#[derive(Debug, Clone, Default)]
pub struct PageState {
    pub results: Vec<PostSummary>,
    pub next_page: Option<String>,
}

impl PageState {
    pub fn empty() -> Self {
        Self::default()
    }

    /// State representing an already-rendered feed whose continuation token
    /// is known but whose entries live in the page, not on the server.
    pub fn continuation(token: impl Into<String>) -> Self {
        Self {
            results: Vec::new(),
            next_page: Some(token.into()),
        }
    }

    /// Merge a freshly fetched batch: results are concatenated in original
    /// order with no de-duplication or re-sorting, and the continuation
    /// token becomes the batch's token exactly (including `None`,
    /// signaling exhaustion).
    pub fn append(mut self, batch: PostBatch) -> Self {
        self.results.extend(batch.results);
        self.next_page = batch.next_page;
        self
    }

    /// Whether another batch can be requested. Once this is false no
    /// further fetch is attempted and the load-more affordance is hidden.
    pub fn has_more(&self) -> bool {
        self.next_page.is_some()
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct CursorPayload {
    token: String,
}

/// Cursor embedding an upstream page token in our query strings. The token
/// is treated as an uninterpreted string; encoding keeps arbitrary token
/// bytes URL-safe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCursor {
    token: String,
}

impl PageCursor {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn encode(&self) -> String {
        let payload = CursorPayload {
            token: self.token.clone(),
        };
        let serialized =
            serde_json::to_vec(&payload).expect("serializing page cursor payload should succeed");
        URL_SAFE_NO_PAD.encode(serialized)
    }

    pub fn decode(cursor: &str) -> Result<Self, PaginationError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(cursor)
            .map_err(|err| PaginationError::InvalidCursor(err.to_string()))?;
        let payload: CursorPayload = serde_json::from_slice(&bytes)
            .map_err(|err| PaginationError::InvalidCursor(err.to_string()))?;
        Ok(Self {
            token: payload.token,
        })
    }
}

#[derive(Debug, Error)]
pub enum PaginationError {
    #[error("invalid cursor: {0}")]
    InvalidCursor(String),
}
