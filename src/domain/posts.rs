//! Post records as mapped from the content service at the fetch boundary.

use time::{OffsetDateTime, format_description::FormatItem, macros::format_description};

use crate::domain::richtext::RichText;

pub const HUMAN_DATE_FORMAT: &[FormatItem<'static>] =
    format_description!("[day padding:zero] [month repr:short] [year]");

/// Feed listing entry. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostSummary {
    pub id: String,
    pub published_at: Option<OffsetDateTime>,
    pub title: String,
    pub subtitle: String,
    pub author: String,
}

/// Full document for the reading view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDetail {
    pub id: String,
    pub published_at: Option<OffsetDateTime>,
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub banner_url: Option<String>,
    pub content: Vec<ContentBlock>,
}

/// One titled block of a post body: a heading plus a rich text document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentBlock {
    pub heading: String,
    pub body: RichText,
}

pub fn format_human_date(timestamp: OffsetDateTime) -> String {
    timestamp
        .date()
        .format(HUMAN_DATE_FORMAT)
        .expect("valid calendar date")
}
