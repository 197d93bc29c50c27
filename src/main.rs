use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use prompe_backend::cli;
use prompe_backend::config::Config;
use prompe_backend::provider;
use prompe_backend::routes::{build_router, AppState};
use prompe_backend::store::PostStore;
use prompe_backend::uploads::Uploads;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = cli::Args::parse();

    let default_filter = if args.debug { "prompe_backend=debug,tower_http=debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    let cfg = Config::load(&args)?;
    let store = PostStore::open(Path::new(&cfg.db_path))?;
    let uploads = Uploads::new(Path::new(&cfg.upload_dir))?;
    let provider = provider::make_provider(&cfg);

    let addr: SocketAddr = format!("{}:{}", cfg.host, cfg.port).parse()?;
    let state = AppState {
        cfg: Arc::new(cfg),
        provider,
        store: Arc::new(store),
        uploads: Arc::new(uploads),
        http: reqwest::Client::new(),
    };
    let app = build_router(state);

    info!("prompe-backend listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
