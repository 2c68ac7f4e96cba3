//! Typed search client.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use facetnav_query::{PageProfile, QueryParams, SearchPage, SearchRequest, SearchResponse};
use futures::future::join_all;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::backend::{HttpBackend, SearchBackend};
use crate::config::ClientConfig;
use crate::error::FetchError;

/// Auxiliary option lists used to populate filter widgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    Category,
    Language,
    LanguageGroup,
    Contest,
    Problem,
}

impl ListKind {
    /// All list kinds.
    pub const ALL: [ListKind; 5] = [
        ListKind::Category,
        ListKind::Language,
        ListKind::LanguageGroup,
        ListKind::Contest,
        ListKind::Problem,
    ];

    /// Backend path.
    pub fn path(&self) -> &'static str {
        match self {
            ListKind::Category => "/api/list/category",
            ListKind::Language => "/api/list/language",
            ListKind::LanguageGroup => "/api/list/language/group",
            ListKind::Contest => "/api/list/contest",
            ListKind::Problem => "/api/list/problem",
        }
    }
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Search client over a backend.
pub struct SearchClient<B: SearchBackend> {
    backend: Arc<B>,
    config: ClientConfig,
}

impl<B: SearchBackend> Clone for SearchClient<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            config: self.config.clone(),
        }
    }
}

impl SearchClient<HttpBackend> {
    /// HTTP client for `config`.
    pub fn from_config(config: ClientConfig) -> Result<Self, FetchError> {
        let backend = HttpBackend::new(config.clone())?;
        Ok(Self::new(backend, config))
    }
}

impl<B: SearchBackend> SearchClient<B> {
    /// Create a client.
    pub fn new(backend: B, config: ClientConfig) -> Self {
        Self {
            backend: Arc::new(backend),
            config,
        }
    }

    /// Backend in use.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Configuration in use.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Run a search and project the response.
    pub async fn search<T: DeserializeOwned>(
        &self,
        profile: &PageProfile,
        request: &SearchRequest,
    ) -> Result<SearchPage<T>, FetchError> {
        let endpoint = self.config.endpoint_for(profile);
        let started = Instant::now();
        tracing::debug!(endpoint, page = request.page, "search started");

        let body = match self.backend.get_json(endpoint, &request.to_query_params()).await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(endpoint, error = %e, "search failed");
                return Err(e);
            }
        };
        let response: SearchResponse<T> = serde_json::from_value(body).map_err(|e| {
            tracing::warn!(endpoint, error = %e, "search response did not match schema");
            FetchError::from(e)
        })?;

        let page = SearchPage::project(response, request);
        tracing::debug!(
            endpoint,
            elapsed_ms = started.elapsed().as_millis() as u64,
            total = page.stats.total_items,
            items = page.len(),
            "search finished"
        );
        Ok(page)
    }

    /// Build the request from URL parameters and run it.
    pub async fn search_params<T: DeserializeOwned>(
        &self,
        profile: &PageProfile,
        params: &QueryParams,
    ) -> Result<SearchPage<T>, FetchError> {
        let request = SearchRequest::build(params, profile);
        self.search(profile, &request).await
    }

    /// Fetch an option list. Failures yield an empty list.
    pub async fn list(&self, kind: ListKind) -> Vec<String> {
        let body = match self.backend.get_json(kind.path(), &QueryParams::new()).await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(list = %kind, error = %e, "list lookup failed");
                return Vec::new();
            }
        };

        match serde_json::from_value::<Option<Vec<String>>>(body) {
            Ok(values) => values.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(list = %kind, error = %e, "list lookup returned unexpected body");
                Vec::new()
            }
        }
    }

    /// Fetch several option lists concurrently.
    pub async fn lists(&self, kinds: &[ListKind]) -> HashMap<ListKind, Vec<String>> {
        let values = join_all(kinds.iter().map(|kind| self.list(*kind))).await;
        kinds.iter().copied().zip(values).collect()
    }
}
