//! Request instrumentation middleware
//!
//! Reports every request handled by the exporter to the instrumentation hub
//! as a web request, so the exporter's own traffic shows up in
//! `http_status_codes` and `http_latency`.

use axum::http::Request;
use axum::response::Response;
use sensorium_monitor::InstrumentationHub;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};

// ============================================================================
// Axum Layer
// ============================================================================

/// Request instrumentation layer for Axum
#[derive(Clone)]
pub struct RequestMetricsLayer {
    hub: Arc<InstrumentationHub>,
}

impl RequestMetricsLayer {
    /// Create a new layer reporting to `hub`
    pub fn new(hub: Arc<InstrumentationHub>) -> Self {
        Self { hub }
    }
}

impl<S> Layer<S> for RequestMetricsLayer {
    type Service = RequestMetricsService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestMetricsService {
            inner,
            hub: self.hub.clone(),
        }
    }
}

// ============================================================================
// Axum Service
// ============================================================================

/// Request instrumentation service wrapper
#[derive(Clone)]
pub struct RequestMetricsService<S> {
    inner: S,
    hub: Arc<InstrumentationHub>,
}

type BoxFuture<T, E> =
    std::pin::Pin<Box<dyn std::future::Future<Output = std::result::Result<T, E>> + Send>>;

impl<S, B> Service<Request<B>> for RequestMetricsService<S>
where
    S: Service<Request<B>, Response = Response> + Send + Clone + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = BoxFuture<Response, S::Error>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<std::result::Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<B>) -> BoxFuture<Response, S::Error> {
        let hub = self.hub.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let token = hub.web_request_start();
            let result = inner.call(req).await;

            // No response means the inner service failed
            let status = result.as_ref().ok().map(|response| response.status().as_u16());
            hub.web_request_end(status, token);

            result
        })
    }
}
