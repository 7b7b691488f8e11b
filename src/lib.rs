pub mod cli;
pub mod db;
pub mod error;
pub mod models;
pub mod recorder;
pub mod report;
pub mod routes;

use axum::{middleware, routing::get, Router};
use sqlx::SqlitePool;
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use url::Url;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    /// Canonical base that request paths are resolved against before storage.
    pub site_url: Url,
}

async fn health() -> &'static str {
    "ok"
}

/// Build the full Axum application router.
///
/// `site` is the public site whose HTML page views get recorded. The admin
/// and health routes sit outside the tracking layer. Caller is responsible
/// for running [`db::ensure_schema`] on `pool` beforehand.
pub fn build_app(pool: SqlitePool, site_url: Url, site: Router) -> Router {
    let state = AppState { db: pool, site_url };

    let tracked_site = site.layer(middleware::from_fn_with_state(
        state.clone(),
        recorder::track_visit,
    ));

    Router::new()
        .route("/health", get(health))
        .merge(routes::admin::router())
        .merge(routes::api::router())
        .with_state(state)
        .merge(tracked_site)
        .layer(
            TraceLayer::new_for_http()
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}
