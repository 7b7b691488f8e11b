#![allow(dead_code)]

use axum::body::Body;
use axum::extract::{ConnectInfo, Path};
use axum::http::{Request, StatusCode};
use axum::response::{Html, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use http_body_util::BodyExt;
use ipstats::models::VisitRecord;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::net::SocketAddr;
use std::str::FromStr;
use tower_http::services::ServeDir;
use url::Url;

pub const SITE_URL: &str = "https://example.com";

pub struct TestApp {
    pub router: Router,
    pub db: SqlitePool,
}

/// Stand-in for the host site whose page views get recorded.
fn site() -> Router {
    Router::new()
        .route("/", get(|| async { Html("<h1>Home</h1>") }))
        .route(
            "/posts/{slug}",
            get(|Path(slug): Path<String>| async move { Html(format!("<h1>{slug}</h1>")) }),
        )
        .route(
            "/feed.json",
            get(|| async { Json(serde_json::json!({ "items": [] })) }),
        )
        .route(
            "/broken",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, Html("<h1>Oops</h1>")) }),
        )
}

/// The bundled `public/` directory, served the way the binary serves it.
pub fn static_site() -> Router {
    Router::new().fallback_service(ServeDir::new(concat!(env!("CARGO_MANIFEST_DIR"), "/public")))
}

pub async fn memory_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .create_if_missing(true);

    SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("Failed to create in-memory SQLite pool")
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_site(site()).await
    }

    pub async fn with_site(site: Router) -> Self {
        let pool = memory_pool().await;

        ipstats::db::ensure_schema(&pool)
            .await
            .expect("Failed to create schema");

        let router = ipstats::build_app(pool.clone(), Url::parse(SITE_URL).unwrap(), site);

        Self { router, db: pool }
    }

    /// Send a request through the app and return the response.
    pub async fn request(&self, req: Request<Body>) -> Response {
        tower::ServiceExt::oneshot(self.router.clone(), req)
            .await
            .unwrap()
    }

    /// Send a GET request without a peer address.
    pub async fn get(&self, uri: &str) -> Response {
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        self.request(req).await
    }

    /// Send a GET request as if it arrived from `ip`.
    pub async fn get_from(&self, uri: &str, ip: &str) -> Response {
        let addr = SocketAddr::new(ip.parse().expect("valid test ip"), 40000);
        let req = Request::builder()
            .uri(uri)
            .extension(ConnectInfo(addr))
            .body(Body::empty())
            .unwrap();
        self.request(req).await
    }

    /// Send a conditional GET, as a browser revisiting a cached page does.
    pub async fn revisit_from(&self, uri: &str, ip: &str, last_modified: &str) -> Response {
        let addr = SocketAddr::new(ip.parse().expect("valid test ip"), 40000);
        let req = Request::builder()
            .uri(uri)
            .header("if-modified-since", last_modified)
            .extension(ConnectInfo(addr))
            .body(Body::empty())
            .unwrap();
        self.request(req).await
    }

    /// Send a POST form request as if it arrived from `ip`.
    pub async fn post_form_from(&self, uri: &str, body: &str, ip: &str) -> Response {
        let addr = SocketAddr::new(ip.parse().expect("valid test ip"), 40000);
        let req = Request::builder()
            .uri(uri)
            .method("POST")
            .header("content-type", "application/x-www-form-urlencoded")
            .extension(ConnectInfo(addr))
            .body(Body::from(body.to_string()))
            .unwrap();
        self.request(req).await
    }

    /// Send a POST form request.
    pub async fn post_form(&self, uri: &str, body: &str) -> Response {
        let req = Request::builder()
            .uri(uri)
            .method("POST")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.request(req).await
    }

    /// Record `times` visits from `ip` to `url` at `at`.
    pub async fn visit(&self, ip: &str, url: &str, times: usize, at: DateTime<Utc>) {
        for _ in 0..times {
            ipstats::recorder::record_visit(&self.db, ip, url, at)
                .await
                .expect("Failed to record visit");
        }
    }

    pub async fn records(&self) -> Vec<VisitRecord> {
        sqlx::query_as("SELECT * FROM ip_statistics ORDER BY ip_address, url_visited")
            .fetch_all(&self.db)
            .await
            .unwrap()
    }
}

/// Read the full response body as a String.
pub async fn body_string(resp: Response) -> String {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Read the full response body as JSON.
pub async fn body_json(resp: Response) -> serde_json::Value {
    let body = body_string(resp).await;
    serde_json::from_str(&body).unwrap()
}
