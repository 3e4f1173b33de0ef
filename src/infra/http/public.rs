use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;

use crate::{
    application::{
        error::{ErrorReport, HttpError},
        feed::FeedService,
        repos::ContentRepo,
    },
    presentation::views::{
        FeedAppendTemplate, IndexTemplate, LayoutChrome, LayoutContext, PageMetaView,
        PostDetailContext, PostTemplate, render_not_found_response, render_template_response,
    },
};

use super::middleware::{log_responses, set_request_context};

#[derive(Clone)]
pub struct HttpState {
    pub feed: Arc<FeedService>,
    pub content: Arc<dyn ContentRepo>,
    pub chrome: LayoutChrome,
}

pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/posts/{id}", get(post_detail))
        .route("/ui/posts", get(posts_partial))
        .route("/_health", get(health))
        .route("/_health/content", get(content_health))
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PartialQuery {
    cursor: Option<String>,
}

async fn index(State(state): State<HttpState>) -> Response {
    let chrome = state.chrome.clone();

    match state.feed.initial_page().await {
        Ok(content) => {
            let canonical = canonical_url(&chrome.meta.canonical, "/");
            let description = chrome.meta.description.clone();
            let meta = chrome
                .meta
                .clone()
                .with_content("Posts".to_string(), description)
                .with_canonical(canonical);
            let view = LayoutContext::new(chrome.with_meta(meta), content);
            render_template_response(IndexTemplate { view }, StatusCode::OK)
        }
        Err(err) => HttpError::from(err).into_response(),
    }
}

/// Rendered fragment for one user-initiated "load more" request. Without a
/// cursor the fragment covers the first batch, so the feed stays reachable
/// as a standalone partial.
async fn posts_partial(
    State(state): State<HttpState>,
    Query(params): Query<PartialQuery>,
) -> Result<Response, HttpError> {
    let content = match params.cursor.as_deref() {
        Some(cursor) => state.feed.load_more(cursor).await?,
        None => state.feed.initial_page().await?,
    };

    Ok(render_template_response(
        FeedAppendTemplate { content },
        StatusCode::OK,
    ))
}

async fn post_detail(State(state): State<HttpState>, Path(id): Path<String>) -> Response {
    let chrome = state.chrome.clone();

    match state.feed.post_detail(&id).await {
        Ok(Some(content)) => {
            let canonical = canonical_url(&chrome.meta.canonical, &format!("/posts/{id}"));
            let meta = post_meta(&chrome, &content, canonical);
            let view = LayoutContext::new(chrome.with_meta(meta), content);
            render_template_response(PostTemplate { view }, StatusCode::OK)
        }
        Ok(None) => render_not_found_response(chrome),
        Err(err) => HttpError::from(err).into_response(),
    }
}

async fn health() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

async fn content_health(State(state): State<HttpState>) -> Response {
    match state.content.health_check().await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            let mut response = StatusCode::SERVICE_UNAVAILABLE.into_response();
            ErrorReport::from_error(
                "infra::http::public::content_health",
                StatusCode::SERVICE_UNAVAILABLE,
                &err,
            )
            .attach(&mut response);
            response
        }
    }
}

fn post_meta(chrome: &LayoutChrome, content: &PostDetailContext, canonical: String) -> PageMetaView {
    let description = fallback_description(&content.subtitle, &chrome.meta.description);

    chrome
        .meta
        .clone()
        .with_content(content.title.clone(), description)
        .with_canonical(canonical)
}

fn fallback_description(candidate: &str, fallback: &str) -> String {
    let trimmed = candidate.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

pub(crate) fn canonical_url(base: &str, path: &str) -> String {
    let root = normalize_public_site_url(base);
    let trimmed = path.trim_start_matches('/');
    if trimmed.is_empty() {
        root.clone()
    } else {
        format!("{root}{trimmed}")
    }
}

fn normalize_public_site_url(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    format!("{trimmed}/")
}
