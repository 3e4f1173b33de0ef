use std::sync::Arc;

use thiserror::Error;

use crate::application::pagination::{PageCursor, PageState};
use crate::application::repos::{BatchRequest, ContentRepo, RepoError};
use crate::domain::posts::{self, ContentBlock, PostDetail, PostSummary};
use crate::domain::reading_time;
use crate::domain::richtext::NodeKind;
use crate::presentation::views::{
    PageContext, PostBlockView, PostCard, PostDetailContext, SectionView,
};

/// Orchestrates the content repository and the pagination accumulator into
/// view contexts for the index page, the load-more partial, and the reading
/// view.
#[derive(Clone)]
pub struct FeedService {
    content: Arc<dyn ContentRepo>,
    page_size: u32,
}

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("invalid cursor: {0}")]
    InvalidCursor(String),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl FeedService {
    pub fn new(content: Arc<dyn ContentRepo>, page_size: u32) -> Self {
        Self { content, page_size }
    }

    /// Feed context for the index page: the first batch, accumulated into a
    /// fresh `PageState`.
    pub async fn initial_page(&self) -> Result<PageContext, FeedError> {
        let batch = self
            .content
            .list_posts(BatchRequest::first(self.page_size))
            .await?;
        let state = PageState::empty().append(batch);
        Ok(page_context(&state))
    }

    /// Feed context for one user-initiated "load more" request. The encoded
    /// cursor carries the upstream token of the batch to append; everything
    /// already rendered stays in the page.
    pub async fn load_more(&self, cursor: &str) -> Result<PageContext, FeedError> {
        let cursor = PageCursor::decode(cursor)
            .map_err(|err| FeedError::InvalidCursor(err.to_string()))?;
        let state = self
            .advance(PageState::continuation(cursor.token()))
            .await?;
        Ok(page_context(&state))
    }

    /// Append the next batch to `state`, issuing exactly one fetch. An
    /// exhausted state (no continuation token) is returned unchanged
    /// without touching the content service.
    pub async fn advance(&self, state: PageState) -> Result<PageState, FeedError> {
        let Some(token) = state.next_page.clone() else {
            return Ok(state);
        };

        let batch = self
            .content
            .list_posts(BatchRequest::after(self.page_size, &token))
            .await?;
        Ok(state.append(batch))
    }

    /// Reading view for a single document. `Ok(None)` is a terminal
    /// not-found.
    pub async fn post_detail(&self, id: &str) -> Result<Option<PostDetailContext>, FeedError> {
        let Some(post) = self.content.find_by_id(id).await? else {
            return Ok(None);
        };

        Ok(Some(detail_context(post)))
    }
}

fn page_context(state: &PageState) -> PageContext {
    let posts: Vec<PostCard> = state.results.iter().map(record_to_card).collect();
    let post_count = posts.len();

    PageContext {
        posts,
        post_count,
        has_results: post_count > 0,
        next_cursor: state
            .next_page
            .as_deref()
            .map(|token| PageCursor::new(token).encode()),
    }
}

fn record_to_card(record: &PostSummary) -> PostCard {
    PostCard {
        id: record.id.clone(),
        title: record.title.clone(),
        subtitle: record.subtitle.clone(),
        author: record.author.clone(),
        published: record.published_at.map(posts::format_human_date),
    }
}

fn detail_context(post: PostDetail) -> PostDetailContext {
    let reading_minutes = reading_time::estimate(&post.content);
    let sections = post.content.iter().map(section_view).collect();

    PostDetailContext {
        id: post.id,
        title: post.title,
        subtitle: post.subtitle,
        author: post.author,
        published: post.published_at.map(posts::format_human_date),
        banner_url: post.banner_url,
        reading_minutes,
        sections,
    }
}

fn section_view(block: &ContentBlock) -> SectionView {
    let mut blocks = Vec::new();
    for node in &block.body.nodes {
        match node.kind {
            NodeKind::Paragraph => blocks.push(PostBlockView::Paragraph(node.text.clone())),
            NodeKind::Heading => blocks.push(PostBlockView::Heading(node.text.clone())),
            NodeKind::ListItem => match blocks.last_mut() {
                Some(PostBlockView::List(items)) => items.push(node.text.clone()),
                _ => blocks.push(PostBlockView::List(vec![node.text.clone()])),
            },
        }
    }

    SectionView {
        heading: block.heading.clone(),
        blocks,
    }
}
