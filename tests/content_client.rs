use std::num::NonZeroU32;
use std::time::Duration;

use axum::Json;
use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use serde::Deserialize;
use serde_json::json;
use url::Url;

use viaggio::application::repos::{BatchRequest, ContentRepo, RepoError};
use viaggio::config::ContentSettings;
use viaggio::infra::content::ContentApiClient;

#[derive(Debug, Deserialize)]
struct DocumentsQuery {
    #[serde(rename = "type")]
    document_type: String,
    page_size: u32,
    cursor: Option<String>,
}

async fn documents(Query(query): Query<DocumentsQuery>) -> Response {
    if query.document_type != "posts" || query.page_size != 2 {
        return StatusCode::BAD_REQUEST.into_response();
    }

    let payload = match query.cursor.as_deref() {
        None => json!({
            "results": [
                {
                    "id": "first-post",
                    "first_publication_date": "2021-03-15T19:25:28Z",
                    "data": {"title": "First post", "subtitle": "One", "author": "Ada"}
                },
                {
                    "id": "second-post",
                    "first_publication_date": null,
                    "data": {"title": "Second post", "subtitle": "Two", "author": "Grace"}
                }
            ],
            "next_page": "tok1"
        }),
        Some("tok1") => json!({
            "results": [
                {
                    "id": "third-post",
                    "first_publication_date": null,
                    "data": {"title": "Third post", "subtitle": "Three", "author": "Ada"}
                }
            ],
            "next_page": null
        }),
        Some(_) => json!({"results": [], "next_page": null}),
    };

    Json(payload).into_response()
}

async fn document(Path(id): Path<String>) -> Response {
    match id.as_str() {
        "first-post" => Json(json!({
            "id": "first-post",
            "first_publication_date": "2021-03-15T19:25:28Z",
            "data": {
                "title": "First post",
                "subtitle": "One",
                "author": "Ada",
                "banner": {"url": "https://images.example/banner.png"},
                "content": [{
                    "heading": "Intro",
                    "body": [{"type": "paragraph", "text": "Hello, reader", "spans": []}]
                }]
            }
        }))
        .into_response(),
        "broken-post" => Json(json!({"id": 42})).into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn spawn_stub_api() -> Url {
    let app = axum::Router::new()
        .route("/api/documents", get(documents))
        .route("/api/documents/{id}", get(document));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("ephemeral listener");
    let addr = listener.local_addr().expect("local addr");

    tokio::spawn(async move {
        axum::serve(listener, app.into_make_service())
            .await
            .expect("stub server");
    });

    Url::parse(&format!("http://{addr}/api/")).expect("stub url")
}

fn client_for(base: Url) -> ContentApiClient {
    let settings = ContentSettings {
        api_url: base,
        document_type: "posts".to_string(),
        page_size: NonZeroU32::new(2).expect("page size"),
        request_timeout: Duration::from_secs(5),
    };
    ContentApiClient::new(&settings).expect("client")
}

#[tokio::test]
async fn list_posts_maps_pages_and_passes_the_cursor_through() {
    let client = client_for(spawn_stub_api().await);

    let first = client
        .list_posts(BatchRequest::first(2))
        .await
        .expect("first batch");
    assert_eq!(first.results.len(), 2);
    assert_eq!(first.results[0].id, "first-post");
    assert!(first.results[0].published_at.is_some());
    assert_eq!(first.results[1].author, "Grace");
    assert_eq!(first.next_page.as_deref(), Some("tok1"));

    let second = client
        .list_posts(BatchRequest::after(2, "tok1"))
        .await
        .expect("second batch");
    assert_eq!(second.results.len(), 1);
    assert_eq!(second.results[0].id, "third-post");
    assert_eq!(second.next_page, None);
}

#[tokio::test]
async fn find_by_id_maps_the_document_shape() {
    let client = client_for(spawn_stub_api().await);

    let detail = client
        .find_by_id("first-post")
        .await
        .expect("lookup")
        .expect("known document");

    assert_eq!(detail.title, "First post");
    assert_eq!(
        detail.banner_url.as_deref(),
        Some("https://images.example/banner.png")
    );
    assert_eq!(detail.content.len(), 1);
    assert_eq!(detail.content[0].body.as_text(), "Hello, reader");
}

#[tokio::test]
async fn find_by_id_of_unknown_document_is_none() {
    let client = client_for(spawn_stub_api().await);

    let detail = client.find_by_id("missing").await.expect("lookup");
    assert!(detail.is_none());
}

#[tokio::test]
async fn schema_mismatch_fails_fast() {
    let client = client_for(spawn_stub_api().await);

    let err = client
        .find_by_id("broken-post")
        .await
        .expect_err("mismatched payload rejected");
    assert!(matches!(err, RepoError::InvalidPayload { .. }));
}

#[tokio::test]
async fn health_check_probes_the_service() {
    let client = client_for(spawn_stub_api().await);
    client.health_check().await.expect("reachable service");
}

#[tokio::test]
async fn unreachable_service_is_a_transport_error() {
    let base = Url::parse("http://127.0.0.1:9/api/").expect("url");
    let client = client_for(base);

    let err = client
        .list_posts(BatchRequest::first(2))
        .await
        .expect_err("unreachable service");
    assert!(matches!(err, RepoError::Transport(_) | RepoError::Timeout));
}
