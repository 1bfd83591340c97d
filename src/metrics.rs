//! Fileserver hit counting.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct Metrics {
    fileserver_hits: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self) {
        self.fileserver_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn hits(&self) -> u64 {
        self.fileserver_hits.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.fileserver_hits.store(0, Ordering::Relaxed);
    }
}

/// Counts every request that reaches the wrapped routes.
pub async fn count_hits(
    State(metrics): State<Arc<Metrics>>,
    req: Request,
    next: Next,
) -> Response {
    metrics.record_hit();
    next.run(req).await
}
