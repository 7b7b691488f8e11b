use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS ip_statistics (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    ip_address TEXT NOT NULL,
    visit_time TEXT NOT NULL,
    url_visited TEXT NOT NULL,
    visit_count INTEGER NOT NULL DEFAULT 1
)
"#;

// Backs the ON CONFLICT target of the visit upsert.
const CREATE_INDEX_PAIR: &str =
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_ip_statistics_pair ON ip_statistics(ip_address, url_visited)";

const CREATE_INDEX_VISIT_TIME: &str =
    "CREATE INDEX IF NOT EXISTS idx_ip_statistics_visit_time ON ip_statistics(visit_time)";

pub async fn init_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    // Ensure data directory exists
    if let Some(path) = database_url.strip_prefix("sqlite:") {
        if let Some(parent) = Path::new(path).parent() {
            std::fs::create_dir_all(parent).ok();
        }
    }

    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

    SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
}

/// Create the visit-log table and its indexes if they are missing.
///
/// Safe to call repeatedly. Meant for activation time (`ipstats install` or
/// server startup), never from a request handler.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(CREATE_TABLE).execute(pool).await?;
    sqlx::query(CREATE_INDEX_PAIR).execute(pool).await?;
    sqlx::query(CREATE_INDEX_VISIT_TIME).execute(pool).await?;
    Ok(())
}
