//! reqwest adapter for the external content service. Converts the service's
//! wire shapes into domain records at the boundary, failing fast on schema
//! mismatch instead of propagating undefined fields.

use std::time::Instant;

use async_trait::async_trait;
use metrics::{counter, histogram};
use reqwest::{Client, Response, StatusCode, Url};
use serde::Deserialize;
use time::OffsetDateTime;

use crate::application::repos::{BatchRequest, ContentRepo, PostBatch, RepoError};
use crate::config::ContentSettings;
use crate::domain::posts::{ContentBlock, PostDetail, PostSummary};
use crate::domain::richtext::RichText;
use crate::infra::error::InfraError;

pub struct ContentApiClient {
    client: Client,
    base: Url,
    document_type: String,
}

impl ContentApiClient {
    pub fn new(settings: &ContentSettings) -> Result<Self, InfraError> {
        let client = Client::builder()
            .user_agent(Self::user_agent())
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| InfraError::client(err.to_string()))?;

        Ok(Self {
            client,
            base: settings.api_url.clone(),
            document_type: settings.document_type.clone(),
        })
    }

    pub fn user_agent() -> &'static str {
        concat!("viaggio/", env!("CARGO_PKG_VERSION"))
    }

    fn url(&self, path: &str) -> Result<Url, RepoError> {
        self.base
            .join(path)
            .map_err(|err| RepoError::invalid_payload(format!("invalid request url: {err}")))
    }

    async fn get(&self, url: Url) -> Result<Response, RepoError> {
        let start = Instant::now();
        counter!("viaggio_content_fetch_total").increment(1);

        let result = self.client.get(url).send().await;
        histogram!("viaggio_content_fetch_ms").record(start.elapsed().as_secs_f64() * 1000.0);

        result.map_err(|err| {
            counter!("viaggio_content_fetch_failure_total").increment(1);
            transport_error(err)
        })
    }

    async fn read_json<T: for<'de> Deserialize<'de>>(response: Response) -> Result<T, RepoError> {
        let status = response.status();
        if !status.is_success() {
            counter!("viaggio_content_fetch_failure_total").increment(1);
            return Err(RepoError::UpstreamStatus {
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(transport_error)?;
        serde_json::from_slice(&bytes).map_err(|err| {
            counter!("viaggio_content_fetch_failure_total").increment(1);
            RepoError::invalid_payload(err.to_string())
        })
    }
}

#[async_trait]
impl ContentRepo for ContentApiClient {
    async fn list_posts(&self, request: BatchRequest<'_>) -> Result<PostBatch, RepoError> {
        let mut url = self.url("documents")?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("type", &self.document_type);
            query.append_pair("page_size", &request.page_size.to_string());
            if let Some(cursor) = request.cursor {
                query.append_pair("cursor", cursor);
            }
        }

        let response = self.get(url).await?;
        let batch: WireBatch = Self::read_json(response).await?;
        Ok(batch.into())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<PostDetail>, RepoError> {
        let url = self.url(&format!("documents/{id}"))?;
        let response = self.get(url).await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let detail: WireDetail = Self::read_json(response).await?;
        Ok(Some(detail.into()))
    }

    async fn health_check(&self) -> Result<(), RepoError> {
        let response = self
            .client
            .head(self.base.clone())
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status.is_server_error() {
            return Err(RepoError::UpstreamStatus {
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}

fn transport_error(err: reqwest::Error) -> RepoError {
    if err.is_timeout() {
        RepoError::Timeout
    } else {
        RepoError::transport(err)
    }
}

#[derive(Debug, Deserialize)]
struct WireBatch {
    #[serde(default)]
    results: Vec<WireSummary>,
    #[serde(default)]
    next_page: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireSummary {
    id: String,
    #[serde(default, with = "time::serde::rfc3339::option")]
    first_publication_date: Option<OffsetDateTime>,
    data: WireSummaryData,
}

#[derive(Debug, Deserialize)]
struct WireSummaryData {
    title: String,
    subtitle: String,
    author: String,
}

#[derive(Debug, Deserialize)]
struct WireDetail {
    id: String,
    #[serde(default, with = "time::serde::rfc3339::option")]
    first_publication_date: Option<OffsetDateTime>,
    data: WireDetailData,
}

#[derive(Debug, Deserialize)]
struct WireDetailData {
    title: String,
    subtitle: String,
    author: String,
    #[serde(default)]
    banner: Option<WireBanner>,
    #[serde(default)]
    content: Vec<WireBlock>,
}

#[derive(Debug, Deserialize)]
struct WireBanner {
    url: String,
}

#[derive(Debug, Deserialize)]
struct WireBlock {
    #[serde(default)]
    heading: String,
    #[serde(default)]
    body: RichText,
}

impl From<WireBatch> for PostBatch {
    fn from(batch: WireBatch) -> Self {
        Self {
            results: batch.results.into_iter().map(PostSummary::from).collect(),
            next_page: batch.next_page,
        }
    }
}

impl From<WireSummary> for PostSummary {
    fn from(summary: WireSummary) -> Self {
        Self {
            id: summary.id,
            published_at: summary.first_publication_date,
            title: summary.data.title,
            subtitle: summary.data.subtitle,
            author: summary.data.author,
        }
    }
}

impl From<WireDetail> for PostDetail {
    fn from(detail: WireDetail) -> Self {
        Self {
            id: detail.id,
            published_at: detail.first_publication_date,
            title: detail.data.title,
            subtitle: detail.data.subtitle,
            author: detail.data.author,
            banner_url: detail.data.banner.map(|banner| banner.url),
            content: detail
                .data
                .content
                .into_iter()
                .map(|block| ContentBlock {
                    heading: block.heading,
                    body: block.body,
                })
                .collect(),
        }
    }
}
