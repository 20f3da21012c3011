use std::time::Instant;

use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn is_websocket_upgrade(request: &Request) -> bool {
    request
        .headers()
        .get(header::UPGRADE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.eq_ignore_ascii_case("websocket"))
}

/// Logs one summary line per HTTP exchange. For `/mcp` upgrades the duration
/// covers the handshake only; the session logs its own lifetime.
pub async fn request_logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let websocket = is_websocket_upgrade(&request);
    let started_at = Instant::now();

    let response = next.run(request).await;
    let status = response.status();
    let elapsed_ms = started_at.elapsed().as_millis();

    info!(
        method = %method,
        path = %path,
        status = status.as_u16(),
        duration_ms = elapsed_ms,
        websocket,
        "request summary"
    );

    if websocket && status != StatusCode::SWITCHING_PROTOCOLS {
        warn!(path = %path, status = status.as_u16(), "websocket upgrade refused");
    } else if status.is_client_error() {
        warn!(method = %method, path = %path, status = status.as_u16(), "rejected request");
    }

    response
}
