//! OpenAlex API client
//!
//! Thin HTTP layer over the works endpoints. Pacing between calls is the
//! caller's job: the enrichment loop and the collector both sleep a
//! configured delay between requests, so the client itself stays
//! rate-limit-free.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::openalex::types::{OpenAlexWork, WorksPage};

const DEFAULT_BASE_URL: &str = "https://api.openalex.org";
const USER_AGENT: &str = concat!("worksift/", env!("CARGO_PKG_VERSION"));

/// OpenAlex client errors
#[derive(Debug, Error)]
pub enum OpenAlexError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Status(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Source of single-work metadata.
///
/// The production implementation is [`OpenAlexClient`]; tests substitute a
/// stub to script responses and count calls.
#[async_trait]
pub trait WorkSource: Send + Sync {
    async fn lookup_work(&self, work_id: &str) -> Result<OpenAlexWork, OpenAlexError>;
}

/// Parameters for one `/works` search request, page-independent.
#[derive(Debug, Clone)]
pub struct WorksQuery {
    /// OpenAlex filter expression, e.g. `publication_year:2020-2025,type:article`.
    pub filter: String,
    /// Full-text search expression.
    pub search: String,
    /// Results per page.
    pub per_page: u32,
    /// Comma-separated field selection.
    pub select: String,
}

/// OpenAlex API client
pub struct OpenAlexClient {
    http_client: reqwest::Client,
    base_url: String,
    mailto: Option<String>,
}

impl OpenAlexClient {
    pub fn new(timeout: Duration, mailto: Option<String>) -> Result<Self, OpenAlexError> {
        Self::with_base_url(DEFAULT_BASE_URL, timeout, mailto)
    }

    /// Client against an alternate API root (tests point this at a fixture
    /// server).
    pub fn with_base_url(
        base_url: &str,
        timeout: Duration,
        mailto: Option<String>,
    ) -> Result<Self, OpenAlexError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| OpenAlexError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            mailto,
        })
    }

    /// Fetch one work by bare identifier (`W...`).
    pub async fn get_work(&self, work_id: &str) -> Result<OpenAlexWork, OpenAlexError> {
        let url = format!("{}/works/{}", self.base_url, work_id);
        debug!(work_id = %work_id, "Querying OpenAlex work");

        let mut request = self.http_client.get(&url);
        if let Some(mailto) = &self.mailto {
            request = request.query(&[("mailto", mailto.as_str())]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| OpenAlexError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(OpenAlexError::Status(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| OpenAlexError::Parse(e.to_string()))
    }

    /// Fetch one page of the works search endpoint.
    pub async fn search_works(
        &self,
        query: &WorksQuery,
        page: u32,
    ) -> Result<WorksPage, OpenAlexError> {
        let url = format!("{}/works", self.base_url);
        debug!(page, filter = %query.filter, "Querying OpenAlex search");

        let mut request = self
            .http_client
            .get(&url)
            .query(&[
                ("filter", query.filter.as_str()),
                ("search", query.search.as_str()),
                ("select", query.select.as_str()),
            ])
            .query(&[("per-page", query.per_page), ("page", page)]);
        if let Some(mailto) = &self.mailto {
            request = request.query(&[("mailto", mailto.as_str())]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| OpenAlexError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(OpenAlexError::Status(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| OpenAlexError::Parse(e.to_string()))
    }
}

#[async_trait]
impl WorkSource for OpenAlexClient {
    async fn lookup_work(&self, work_id: &str) -> Result<OpenAlexWork, OpenAlexError> {
        self.get_work(work_id).await
    }
}
