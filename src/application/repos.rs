//! Repository trait describing the content service adapter.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::posts::{PostDetail, PostSummary};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("content service transport error: {0}")]
    Transport(String),
    #[error("content service returned status {status}")]
    UpstreamStatus { status: u16 },
    #[error("content service payload mismatch: {message}")]
    InvalidPayload { message: String },
    #[error("content service timeout")]
    Timeout,
}

impl RepoError {
    pub fn transport(err: impl std::fmt::Display) -> Self {
        Self::Transport(err.to_string())
    }

    pub fn invalid_payload(message: impl Into<String>) -> Self {
        Self::InvalidPayload {
            message: message.into(),
        }
    }
}

/// One fetched page of the feed: summaries in upstream order plus the opaque
/// token retrieving the batch after this one.
#[derive(Debug, Clone, Default)]
pub struct PostBatch {
    pub results: Vec<PostSummary>,
    pub next_page: Option<String>,
}

/// Request for one feed batch. `cursor` is the raw upstream token, absent
/// for the first page.
#[derive(Debug, Clone, Copy)]
pub struct BatchRequest<'a> {
    pub page_size: u32,
    pub cursor: Option<&'a str>,
}

impl<'a> BatchRequest<'a> {
    pub fn first(page_size: u32) -> Self {
        Self {
            page_size,
            cursor: None,
        }
    }

    pub fn after(page_size: u32, cursor: &'a str) -> Self {
        Self {
            page_size,
            cursor: Some(cursor),
        }
    }
}

#[async_trait]
pub trait ContentRepo: Send + Sync {
    /// Fetch one page of post summaries for the configured document type.
    async fn list_posts(&self, request: BatchRequest<'_>) -> Result<PostBatch, RepoError>;

    /// Fetch a single document by identifier. `Ok(None)` when the service
    /// reports the identifier unknown.
    async fn find_by_id(&self, id: &str) -> Result<Option<PostDetail>, RepoError>;

    /// Cheap reachability probe against the content service.
    async fn health_check(&self) -> Result<(), RepoError>;
}
