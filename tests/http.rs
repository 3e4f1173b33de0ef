use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use viaggio::application::feed::FeedService;
use viaggio::application::pagination::PageCursor;
use viaggio::application::repos::{BatchRequest, ContentRepo, PostBatch, RepoError};
use viaggio::domain::posts::{ContentBlock, PostDetail, PostSummary};
use viaggio::domain::richtext::{NodeKind, RichText, TextNode};
use viaggio::infra::http::{HttpState, build_router};
use viaggio::presentation::views::{BrandView, LayoutChrome, PageMetaView};

#[derive(Default)]
struct StubContentRepo {
    batches: HashMap<Option<String>, PostBatch>,
    details: HashMap<String, PostDetail>,
}

#[async_trait]
impl ContentRepo for StubContentRepo {
    async fn list_posts(&self, request: BatchRequest<'_>) -> Result<PostBatch, RepoError> {
        Ok(self
            .batches
            .get(&request.cursor.map(str::to_string))
            .cloned()
            .unwrap_or_default())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<PostDetail>, RepoError> {
        Ok(self.details.get(id).cloned())
    }

    async fn health_check(&self) -> Result<(), RepoError> {
        Ok(())
    }
}

struct UnreachableContentRepo;

#[async_trait]
impl ContentRepo for UnreachableContentRepo {
    async fn list_posts(&self, _request: BatchRequest<'_>) -> Result<PostBatch, RepoError> {
        Err(RepoError::transport("connection refused"))
    }

    async fn find_by_id(&self, _id: &str) -> Result<Option<PostDetail>, RepoError> {
        Err(RepoError::transport("connection refused"))
    }

    async fn health_check(&self) -> Result<(), RepoError> {
        Err(RepoError::transport("connection refused"))
    }
}

fn chrome() -> LayoutChrome {
    LayoutChrome {
        brand: BrandView {
            title: "spacetraveling".to_string(),
            href: "/".to_string(),
        },
        meta: PageMetaView {
            title: "spacetraveling".to_string(),
            description: "Notes from the road.".to_string(),
            canonical: "https://blog.example.com".to_string(),
        },
    }
}

fn router_with(content: Arc<dyn ContentRepo>) -> axum::Router {
    let feed = Arc::new(FeedService::new(content.clone(), 2));
    build_router(HttpState {
        feed,
        content,
        chrome: chrome(),
    })
}

fn summary(id: &str, title: &str) -> PostSummary {
    PostSummary {
        id: id.to_string(),
        published_at: None,
        title: title.to_string(),
        subtitle: "Subtitle".to_string(),
        author: "Ada".to_string(),
    }
}

async fn fetch(router: &axum::Router, uri: &str) -> (StatusCode, String) {
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .uri(uri)
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    (status, String::from_utf8_lossy(&bytes).into_owned())
}

#[tokio::test]
async fn index_renders_the_first_batch_with_a_load_more_affordance() {
    let repo = StubContentRepo {
        batches: HashMap::from([(
            None,
            PostBatch {
                results: vec![
                    summary("first-post", "First post"),
                    summary("second-post", "Second post"),
                ],
                next_page: Some("tok1".to_string()),
            },
        )]),
        details: HashMap::new(),
    };
    let router = router_with(Arc::new(repo));

    let (status, body) = fetch(&router, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("First post"));
    assert!(body.contains("Second post"));
    assert!(body.contains("Load more posts"));
    assert!(body.contains("spacetraveling | Posts"));
}

#[tokio::test]
async fn load_more_partial_drops_the_affordance_when_exhausted() {
    let repo = StubContentRepo {
        batches: HashMap::from([(
            Some("tok1".to_string()),
            PostBatch {
                results: vec![summary("third-post", "Third post")],
                next_page: None,
            },
        )]),
        details: HashMap::new(),
    };
    let router = router_with(Arc::new(repo));

    let cursor = PageCursor::new("tok1").encode();
    let (status, body) = fetch(&router, &format!("/ui/posts?cursor={cursor}")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Third post"));
    assert!(!body.contains("Load more posts"));
}

#[tokio::test]
async fn malformed_cursor_is_a_bad_request() {
    let router = router_with(Arc::new(StubContentRepo::default()));

    let (status, body) = fetch(&router, "/ui/posts?cursor=%21%21not-a-cursor").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Invalid cursor"));
}

#[tokio::test]
async fn unknown_post_renders_the_not_found_page() {
    let router = router_with(Arc::new(StubContentRepo::default()));

    let (status, body) = fetch(&router, "/posts/missing").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("Page Not Found"));
    assert!(body.contains("Back to the feed"));
}

#[tokio::test]
async fn reading_view_shows_banner_metadata_and_reading_time() {
    let body_text = vec!["word"; 201].join(" ");
    let detail = PostDetail {
        id: "how-to-hooks".to_string(),
        published_at: None,
        title: "How to hooks".to_string(),
        subtitle: "All about them".to_string(),
        author: "Ada".to_string(),
        banner_url: Some("https://images.example/banner.png".to_string()),
        content: vec![ContentBlock {
            heading: "Intro".to_string(),
            body: RichText::new(vec![TextNode {
                kind: NodeKind::Paragraph,
                text: body_text,
                spans: Vec::new(),
            }]),
        }],
    };
    let repo = StubContentRepo {
        batches: HashMap::new(),
        details: HashMap::from([(detail.id.clone(), detail)]),
    };
    let router = router_with(Arc::new(repo));

    let (status, body) = fetch(&router, "/posts/how-to-hooks").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("How to hooks"));
    assert!(body.contains("https://images.example/banner.png"));
    assert!(body.contains("2 min"));
    assert!(body.contains("Ada"));
}

#[tokio::test]
async fn unreachable_content_service_is_surfaced_on_the_index() {
    let router = router_with(Arc::new(UnreachableContentRepo));

    let (status, body) = fetch(&router, "/").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body.contains("Content service unavailable"));
}

#[tokio::test]
async fn health_endpoints_report_liveness_and_upstream_reachability() {
    let router = router_with(Arc::new(StubContentRepo::default()));
    let (status, _) = fetch(&router, "/_health").await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = fetch(&router, "/_health/content").await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let router = router_with(Arc::new(UnreachableContentRepo));
    let (status, _) = fetch(&router, "/_health/content").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}
