//! Request logging and subscriber setup.

use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use tracing::{error, info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let matched_path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    let request_id = uuid::Uuid::new_v4().to_string();

    info!(
        request_id = %request_id,
        method = %method,
        path = %matched_path,
        "Incoming request"
    );

    let response = next.run(req).await;
    let latency = start.elapsed();
    let status = response.status();

    if status.is_server_error() {
        error!(
            request_id = %request_id,
            method = %method,
            path = %matched_path,
            status = %status.as_u16(),
            latency_ms = %latency.as_millis(),
            "Server error"
        );
    } else if status.is_client_error() {
        warn!(
            request_id = %request_id,
            method = %method,
            path = %matched_path,
            status = %status.as_u16(),
            latency_ms = %latency.as_millis(),
            "Client error"
        );
    } else {
        info!(
            request_id = %request_id,
            method = %method,
            path = %matched_path,
            status = %status.as_u16(),
            latency_ms = %latency.as_millis(),
            "Request completed"
        );
    }

    response
}

fn default_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{}=info,rolegate_db=info,rolegate_auth=info,tower_http=warn",
            env!("CARGO_CRATE_NAME")
        ))
    })
}

/// Installs the global subscriber.
///
/// - console output, compact unless `LOG_FORMAT=json`, filtered by `RUST_LOG`
/// - when `LOG_DIR` is set, a daily rolling `rolegate.*.json` file at info level
pub fn init_tracing() {
    let json_console = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let compact_layer = (!json_console).then(|| {
        fmt::layer()
            .with_target(false)
            .with_file(true)
            .with_line_number(true)
            .compact()
            .with_filter(default_filter())
    });

    let json_layer = json_console.then(|| {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_filter(default_filter())
    });

    let file_layer = std::env::var("LOG_DIR")
        .ok()
        .filter(|dir| !dir.trim().is_empty())
        .and_then(|dir| {
            match RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix("rolegate")
                .filename_suffix("json")
                .build(&dir)
            {
                Ok(appender) => Some(appender),
                Err(e) => {
                    eprintln!("Failed to open log directory {dir}: {e}. File logging disabled.");
                    None
                }
            }
        })
        .map(|appender| {
            fmt::layer()
                .json()
                .with_writer(appender)
                .with_ansi(false)
                .with_current_span(true)
                .with_span_list(true)
                .with_filter(EnvFilter::new("info"))
        });

    tracing_subscriber::registry()
        .with(compact_layer)
        .with(json_layer)
        .with(file_layer)
        .init();
}
