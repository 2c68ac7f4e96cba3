//! Search backend boundary.
//!
//! The backend is opaque: the client only sends a path plus query
//! parameters and reads JSON back. [`HttpBackend`] talks to the real API;
//! [`InMemoryBackend`] serves canned responses for development and tests.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use facetnav_query::QueryParams;
use http::header::{HeaderMap, HeaderName, HeaderValue};

use crate::config::ClientConfig;
use crate::error::FetchError;
use crate::timeout::TimeoutConfig;

/// A request as the backend sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendRequest {
    /// Endpoint path, e.g. `/api/search/problem`.
    pub path: String,
    /// Query parameters.
    pub query: QueryParams,
}

/// Search backend trait.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// GET `path` with `query` and return the decoded JSON body.
    async fn get_json(&self, path: &str, query: &QueryParams)
        -> Result<serde_json::Value, FetchError>;
}

/// HTTP backend over `reqwest`.
pub struct HttpBackend {
    client: reqwest::Client,
    config: ClientConfig,
    timeout: TimeoutConfig,
}

impl HttpBackend {
    /// Create a backend from configuration.
    pub fn new(config: ClientConfig) -> Result<Self, FetchError> {
        let timeout = config.timeout_config();
        let client = reqwest::Client::builder()
            .connect_timeout(timeout.connect)
            .timeout(timeout.total)
            .default_headers(header_map(&config)?)
            .build()
            .map_err(|e| FetchError::Request(e.to_string()))?;

        Ok(Self {
            client,
            config,
            timeout,
        })
    }

    /// Configuration in use.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

fn header_map(config: &ClientConfig) -> Result<HeaderMap, FetchError> {
    let mut headers = HeaderMap::new();
    for (key, value) in &config.headers {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|e| FetchError::Request(format!("invalid header name {}: {}", key, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| FetchError::Request(format!("invalid header value for {}: {}", key, e)))?;
        headers.insert(name, value);
    }
    Ok(headers)
}

#[async_trait]
impl SearchBackend for HttpBackend {
    async fn get_json(
        &self,
        path: &str,
        query: &QueryParams,
    ) -> Result<serde_json::Value, FetchError> {
        let mut url = self.config.url_for(path);
        if !query.is_empty() {
            url.push('?');
            url.push_str(&query.to_query_string());
        }

        let response = tokio::time::timeout(self.timeout.response, self.client.get(&url).send())
            .await
            .map_err(|_| {
                FetchError::Timeout(format!("no response from {} after {:?}", url, self.timeout.response))
            })??;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

enum Route {
    Json(serde_json::Value),
    Fail(FetchError),
}

/// In-memory search backend (for development/testing).
///
/// Routes match on path only; every request is recorded.
#[derive(Default)]
pub struct InMemoryBackend {
    routes: Mutex<HashMap<String, Route>>,
    requests: Mutex<Vec<BackendRequest>>,
}

impl InMemoryBackend {
    /// Create an empty backend. Unknown paths answer 404.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` for `path`.
    pub fn with_json(self, path: impl Into<String>, body: serde_json::Value) -> Self {
        self.set_route(path.into(), Route::Json(body));
        self
    }

    /// Fail every request to `path`.
    pub fn with_failure(self, path: impl Into<String>, error: FetchError) -> Self {
        self.set_route(path.into(), Route::Fail(error));
        self
    }

    /// Replace the response for `path`.
    pub fn respond(&self, path: impl Into<String>, body: serde_json::Value) {
        self.set_route(path.into(), Route::Json(body));
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<BackendRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_route(&self, path: String, route: Route) {
        self.routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path, route);
    }
}

#[async_trait]
impl SearchBackend for InMemoryBackend {
    async fn get_json(
        &self,
        path: &str,
        query: &QueryParams,
    ) -> Result<serde_json::Value, FetchError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(BackendRequest {
                path: path.to_string(),
                query: query.clone(),
            });

        let routes = self.routes.lock().unwrap_or_else(PoisonError::into_inner);
        match routes.get(path) {
            Some(Route::Json(body)) => Ok(body.clone()),
            Some(Route::Fail(error)) => Err(error.clone()),
            None => Err(FetchError::Http {
                status: 404,
                url: path.to_string(),
            }),
        }
    }
}
