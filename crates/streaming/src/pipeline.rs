use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use layers::LayerId;
use tracing::{debug, warn};

use crate::config::QueryConfig;
use crate::request::QueryRequest;
use crate::transport::{QueryPayload, QueryTransport, TransportError};

/// Settled result of one dispatched query, tagged with its request.
#[derive(Debug, Clone)]
pub struct QueryOutcome {
    pub request: QueryRequest,
    pub result: Result<QueryPayload, TransportError>,
}

impl QueryOutcome {
    pub fn layer_id(&self) -> &LayerId {
        &self.request.layer_id
    }

    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Fans queries out over a transport and waits for every one to settle.
///
/// Requests run concurrently on the calling task; nothing is spawned. A failed
/// or timed-out request becomes a failed outcome and never affects the others.
#[derive(Clone)]
pub struct Dispatcher {
    transport: Arc<dyn QueryTransport>,
    timeout: Duration,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    pub fn new(transport: Arc<dyn QueryTransport>, timeout: Duration) -> Self {
        Self { transport, timeout }
    }

    pub fn from_config(transport: Arc<dyn QueryTransport>, config: &QueryConfig) -> Self {
        Self::new(transport, Duration::from_millis(config.request_timeout_ms))
    }

    /// Dispatches `requests`; outcomes come back in request order.
    pub async fn dispatch(&self, requests: Vec<QueryRequest>) -> Vec<QueryOutcome> {
        let pending = requests.into_iter().map(|request| async move {
            debug!(layer = %request.layer_id, url = %request.url, "dispatching feature-info query");
            let fetch = self.transport.fetch(&request);
            let result = match tokio::time::timeout(self.timeout, fetch).await {
                Ok(result) => result,
                Err(_) => Err(TransportError::Timeout(self.timeout)),
            };
            if let Err(err) = &result {
                warn!(layer = %request.layer_id, "feature-info query failed: {err}");
            }
            QueryOutcome { request, result }
        });
        join_all(pending).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::Dispatcher;
    use crate::config::QueryConfig;
    use crate::request::{QueryPoint, QueryRequest, build_query};
    use crate::transport::{MemoryTransport, TransportError};
    use foundation::math::Vec2;
    use layers::LayerDescriptor;
    use pretty_assertions::assert_eq;

    fn req(id: &str) -> QueryRequest {
        let layer = LayerDescriptor::new(id, format!("https://{id}.test/wms")).with_active(id);
        let point = QueryPoint::new(Vec2::new(0.0, 0.0), 1.0, "EPSG:3857");
        build_query(&layer, &point, &QueryConfig::default()).expect("request")
    }

    #[tokio::test]
    async fn every_request_settles_in_request_order() {
        let transport = MemoryTransport::new()
            .with_response("https://a.test/wms", "application/json", "{}")
            .with_delay("https://a.test/wms", Duration::from_millis(30))
            .with_failure(
                "https://b.test/wms",
                TransportError::Request("connection refused".to_string()),
            )
            .with_response("https://c.test/wms", "text/plain", "no features");
        let transport = Arc::new(transport);
        let dispatcher = Dispatcher::new(transport.clone(), Duration::from_secs(5));

        let outcomes = dispatcher.dispatch(vec![req("a"), req("b"), req("c")]).await;
        let ids: Vec<_> = outcomes.iter().map(|o| o.layer_id().as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert!(outcomes[0].is_success());
        assert_eq!(
            outcomes[1].result,
            Err(TransportError::Request("connection refused".to_string()))
        );
        assert!(outcomes[2].is_success());
        assert_eq!(transport.call_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn hung_request_times_out_alone() {
        let transport = MemoryTransport::new()
            .with_response("https://slow.test/wms", "application/json", "{}")
            .with_delay("https://slow.test/wms", Duration::from_secs(60))
            .with_response("https://fast.test/wms", "application/json", "{}");
        let dispatcher = Dispatcher::new(Arc::new(transport), Duration::from_millis(500));

        let outcomes = dispatcher.dispatch(vec![req("slow"), req("fast")]).await;
        assert_eq!(
            outcomes[0].result,
            Err(TransportError::Timeout(Duration::from_millis(500)))
        );
        assert!(outcomes[1].is_success());
    }

    #[tokio::test]
    async fn nothing_to_dispatch() {
        let dispatcher = Dispatcher::new(Arc::new(MemoryTransport::new()), Duration::from_secs(1));
        assert!(dispatcher.dispatch(Vec::new()).await.is_empty());
    }
}
