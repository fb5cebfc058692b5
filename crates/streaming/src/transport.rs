use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use bytes::Bytes;
use parking_lot::Mutex;
use thiserror::Error;

use crate::protocol::get_feature_info_url;
use crate::request::QueryRequest;

/// Type alias for a boxed future that can be sent between threads.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Why a single query produced no payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("invalid service url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("request failed: {0}")]
    Request(String),
    #[error("upstream HTTP {0}")]
    Status(u16),
    #[error("failed to read response: {0}")]
    Body(String),
    #[error("no response within {0:?}")]
    Timeout(Duration),
}

/// Raw response of a successful query.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPayload {
    /// Declared `Content-Type`, as sent by the server.
    pub content_type: String,
    pub body: Bytes,
}

impl QueryPayload {
    pub fn new(content_type: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self {
            content_type: content_type.into(),
            body: body.into(),
        }
    }
}

/// Sends one feature-info query.
///
/// Implementations must be `Send + Sync`; methods return boxed futures for
/// dyn-compatibility.
pub trait QueryTransport: Send + Sync {
    fn fetch<'a>(
        &'a self,
        request: &'a QueryRequest,
    ) -> BoxFuture<'a, Result<QueryPayload, TransportError>>;
}

/// HTTP transport issuing WMS `GetFeatureInfo` GETs.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl QueryTransport for HttpTransport {
    fn fetch<'a>(
        &'a self,
        request: &'a QueryRequest,
    ) -> BoxFuture<'a, Result<QueryPayload, TransportError>> {
        Box::pin(async move {
            let url = get_feature_info_url(request)?;
            let resp = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|e| TransportError::Request(e.to_string()))?;

            if !resp.status().is_success() {
                return Err(TransportError::Status(resp.status().as_u16()));
            }

            let content_type = resp
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("")
                .to_string();

            let body = resp
                .bytes()
                .await
                .map_err(|e| TransportError::Body(e.to_string()))?;

            Ok(QueryPayload { content_type, body })
        })
    }
}

#[derive(Debug, Clone)]
struct CannedResponse {
    result: Result<QueryPayload, TransportError>,
    delay: Option<Duration>,
}

/// In-memory transport keyed by service url, for tests and offline runs.
///
/// Unknown urls answer with HTTP 404. Every fetch is recorded.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    responses: BTreeMap<String, CannedResponse>,
    calls: Mutex<Vec<String>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(
        mut self,
        url: impl Into<String>,
        content_type: impl Into<String>,
        body: impl Into<Bytes>,
    ) -> Self {
        self.responses.insert(
            url.into(),
            CannedResponse {
                result: Ok(QueryPayload::new(content_type, body)),
                delay: None,
            },
        );
        self
    }

    pub fn with_json(self, url: impl Into<String>, body: serde_json::Value) -> Self {
        self.with_response(url, "application/json", body.to_string())
    }

    pub fn with_failure(mut self, url: impl Into<String>, error: TransportError) -> Self {
        self.responses.insert(
            url.into(),
            CannedResponse {
                result: Err(error),
                delay: None,
            },
        );
        self
    }

    /// Delays the answer for `url`; has no effect on unknown urls.
    pub fn with_delay(mut self, url: &str, delay: Duration) -> Self {
        if let Some(canned) = self.responses.get_mut(url) {
            canned.delay = Some(delay);
        }
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

impl QueryTransport for MemoryTransport {
    fn fetch<'a>(
        &'a self,
        request: &'a QueryRequest,
    ) -> BoxFuture<'a, Result<QueryPayload, TransportError>> {
        self.calls.lock().push(request.url.clone());
        let canned = self.responses.get(&request.url).cloned();
        Box::pin(async move {
            let Some(canned) = canned else {
                return Err(TransportError::Status(404));
            };
            if let Some(delay) = canned.delay {
                tokio::time::sleep(delay).await;
            }
            canned.result
        })
    }
}
