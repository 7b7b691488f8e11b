use chrono::{Duration, Utc};
use clap::{Args, Parser, Subcommand};
use sqlx::SqlitePool;
use url::Url;

use crate::{db, report};

#[derive(Parser, Debug)]
#[command(author, version, about = "Per-visit IP/URL statistics with an admin report")]
pub struct Cli {
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite:data/ipstats.db", global = true)]
    pub database_url: String,

    #[command(flatten)]
    pub serve: ServeArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the public site with visit tracking plus the admin report (default)
    Serve,
    /// Create the visit-log table if it does not exist
    Install,
    /// Delete rows whose last visit is older than the given number of days
    Prune {
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        older_than_days: u32,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:3000", global = true)]
    pub bind: String,
    /// Canonical base that request paths are resolved against
    #[arg(
        long,
        env = "SITE_URL",
        default_value = "http://localhost:3000",
        global = true,
        value_parser = parse_site_url
    )]
    pub site_url: Url,
    /// Directory served as the tracked public site
    #[arg(long, env = "SITE_DIR", default_value = "public", global = true)]
    pub site_dir: String,
}

fn parse_site_url(value: &str) -> Result<Url, String> {
    let url = Url::parse(value).map_err(|e| e.to_string())?;
    if url.cannot_be_a_base() {
        return Err(format!("'{value}' cannot be used as a base URL"));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(format!("'{value}' must not have a query or fragment"));
    }
    Ok(url)
}

impl Cli {
    pub fn init() -> Self {
        Cli::parse()
    }
}

pub async fn install(pool: &SqlitePool) -> Result<(), Box<dyn std::error::Error>> {
    db::ensure_schema(pool).await?;
    println!("Schema ready");
    Ok(())
}

pub async fn prune(pool: &SqlitePool, older_than_days: u32) -> Result<(), Box<dyn std::error::Error>> {
    let cutoff = Utc::now() - Duration::days(i64::from(older_than_days));
    let deleted = report::prune_before(pool, cutoff).await?;
    tracing::info!(deleted, older_than_days, "pruned visit rows");
    println!("Deleted {} rows last visited before {}", deleted, cutoff.to_rfc3339());
    Ok(())
}
