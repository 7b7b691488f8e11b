use axum::Router;
use ipstats::cli::{self, Cli, Command};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::init();
    let pool = ipstats::db::init_pool(&cli.database_url).await?;

    match cli.command {
        Some(Command::Install) => return cli::install(&pool).await,
        Some(Command::Prune { older_than_days }) => return cli::prune(&pool, older_than_days).await,
        Some(Command::Serve) | None => {}
    }

    if let Err(e) = ipstats::db::ensure_schema(&pool).await {
        tracing::error!("Failed to create visit-log table: {e}");
        return Err(e.into());
    }

    let serve = cli.serve;
    let site = Router::new().fallback_service(ServeDir::new(&serve.site_dir));
    let app = ipstats::build_app(pool, serve.site_url.clone(), site);

    let addr: SocketAddr = serve.bind.parse()?;
    let listener = TcpListener::bind(addr).await?;

    tracing::info!("listening on {}, site {} from {}", addr, serve.site_url, serve.site_dir);
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;
    Ok(())
}
