//! Logger bootstrap and per-request access log.
//!
//! Log lines use `event=<name> key=value` pairs so they stay grep-friendly.
//! `RUST_LOG` overrides the default `info` filter.

use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};
use log::{info, warn};

/// Install `env_logger` as the global logger. Repeated calls are ignored.
pub fn init() {
    let env = env_logger::Env::default().default_filter_or("info");
    if env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .try_init()
        .is_err()
    {
        warn!("event=logging_init status=skipped reason=already_initialized");
    }
}

/// Axum middleware emitting one line per handled request.
pub async fn log_request(request: Request, next: Next) -> Response {
    let started_at = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    info!(
        "event=http_request method={} path={} status={} duration_ms={}",
        method,
        path,
        response.status().as_u16(),
        started_at.elapsed().as_millis()
    );
    response
}
