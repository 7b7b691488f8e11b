//! Visit recording: one upsert per public page view.

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header, Method, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::net::SocketAddr;
use url::Url;

use crate::models::visit::format_timestamp;
use crate::AppState;

/// Insert a new (ip, url) row or bump the existing one, in a single statement.
pub async fn record_visit(
    pool: &SqlitePool,
    ip: &str,
    url: &str,
    now: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO ip_statistics (ip_address, url_visited, visit_time, visit_count)
        VALUES (?, ?, ?, 1)
        ON CONFLICT(ip_address, url_visited) DO UPDATE SET
            visit_count = visit_count + 1,
            visit_time = excluded.visit_time
        "#,
    )
    .bind(ip)
    .bind(url)
    .bind(format_timestamp(now))
    .execute(pool)
    .await?;

    Ok(())
}

/// Resolve a request target against the site's canonical base URL.
///
/// The base path is kept, so `/about` under `https://example.com/blog/`
/// becomes `https://example.com/blog/about`. Any query or fragment on the
/// base is ignored.
pub fn resolve_url(base: &Url, request_uri: &str) -> Result<String, url::ParseError> {
    let mut root = base.clone();
    root.set_query(None);
    root.set_fragment(None);

    let joined = format!(
        "{}/{}",
        root.as_str().trim_end_matches('/'),
        request_uri.strip_prefix('/').unwrap_or(request_uri)
    );
    Url::parse(&joined).map(String::from)
}

/// Middleware for the public site: records HTML page views.
///
/// A `304 Not Modified` revisit has no body to inspect, so it counts when the
/// request path looks like a page. Admin and health routes are mounted
/// outside this layer, so they are never counted. Failures are logged and the
/// response is passed through untouched.
pub async fn track_visit(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let is_get = request.method() == Method::GET;
    let page_path = looks_like_page(request.uri().path());
    let target = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".to_string());
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string());

    let response = next.run(request).await;

    let is_page_view = if response.status() == StatusCode::NOT_MODIFIED {
        page_path
    } else {
        response.status().is_success() && is_html(&response)
    };
    if !is_get || !is_page_view {
        return response;
    }

    let Some(ip) = peer else {
        tracing::debug!("No peer address for {target}, visit not recorded");
        return response;
    };

    let url = match resolve_url(&state.site_url, &target) {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!("Could not resolve {target} against site url: {e}");
            return response;
        }
    };

    if let Err(e) = record_visit(&state.db, &ip, &url, Utc::now()).await {
        tracing::warn!("Failed to record visit from {ip} to {url}: {e}");
    }

    response
}

fn is_html(response: &Response) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("text/html"))
}

/// Directory paths, `.html`/`.htm` files and extensionless paths are pages.
pub fn looks_like_page(path: &str) -> bool {
    let last = path.rsplit('/').next().unwrap_or_default();
    match last.rsplit_once('.') {
        None => true,
        Some((_, ext)) => ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"),
    }
}
