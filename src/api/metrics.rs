//! Prometheus metrics endpoint and HTTP request tracking middleware.

use anyhow::Context;
use axum::{
    body::Body,
    extract::{MatchedPath, State},
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::Arc;
use std::time::Instant;

use crate::db::{BlogPost, ContactMessage};
use crate::AppState;

pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";
pub const HTTP_REQUEST_DURATION_SECONDS: &str = "http_request_duration_seconds";
pub const CONTACT_MESSAGES_TOTAL: &str = "contact_messages_total";
pub const COMMENTS_TOTAL: &str = "blog_comments_total";
pub const BLOG_POSTS: &str = "blog_posts";
pub const UNREAD_MESSAGES: &str = "contact_messages_unread";

/// Install the global Prometheus recorder. Call once at startup.
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;

    describe_counter!(HTTP_REQUESTS_TOTAL, "Total number of HTTP requests received");
    describe_histogram!(
        HTTP_REQUEST_DURATION_SECONDS,
        "HTTP request duration in seconds"
    );
    describe_counter!(CONTACT_MESSAGES_TOTAL, "Contact messages received");
    describe_counter!(COMMENTS_TOTAL, "Blog comments posted");
    describe_gauge!(BLOG_POSTS, "Number of published blog posts");
    describe_gauge!(UNREAD_MESSAGES, "Number of unread contact messages");

    Ok(handle)
}

/// GET /metrics - Prometheus text format, no authentication
pub async fn metrics_endpoint(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    update_gauge_metrics(&state).await;

    match state.metrics_handle.as_ref() {
        Some(h) => (StatusCode::OK, h.render()),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            "Metrics not initialized".to_string(),
        ),
    }
}

async fn update_gauge_metrics(state: &AppState) {
    if let Ok(count) = BlogPost::count(&state.db).await {
        gauge!(BLOG_POSTS).set(count as f64);
    }
    if let Ok(counts) = ContactMessage::counts_by_status(&state.db).await {
        gauge!(UNREAD_MESSAGES).set(counts.unread as f64);
    }
}

/// Records `http_requests_total` and `http_request_duration_seconds`,
/// labelled by the matched route template rather than the raw path.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();

    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|mp| mp.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());
    let method = request.method().to_string();

    let response = next.run(request).await;

    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    counter!(HTTP_REQUESTS_TOTAL, "method" => method.clone(), "path" => path.clone(), "status" => status).increment(1);
    histogram!(HTTP_REQUEST_DURATION_SECONDS, "method" => method, "path" => path).record(duration);

    response
}

pub fn record_contact_message() {
    counter!(CONTACT_MESSAGES_TOTAL).increment(1);
}

pub fn record_comment() {
    counter!(COMMENTS_TOTAL).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_names() {
        assert!(HTTP_REQUESTS_TOTAL.ends_with("_total"));
        assert!(CONTACT_MESSAGES_TOTAL.ends_with("_total"));
        assert!(COMMENTS_TOTAL.ends_with("_total"));
        assert!(HTTP_REQUEST_DURATION_SECONDS.ends_with("_seconds"));
    }
}
