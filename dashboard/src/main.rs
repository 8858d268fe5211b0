use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use plot_dashboard::catalog::PlotCatalog;
use plot_dashboard::cli::Cli;
use plot_dashboard::state::AppState;
use plot_dashboard::{build_router, layout_config};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    shared::init_tracing!(cli.verbosity())?;

    let config = cli.apply(shared::load_server_config!()?);
    let layout_path = cli.layout_path(&config);
    let layout = layout_config::load(&layout_path)
        .with_context(|| format!("Failed to load layout config {}", layout_path.display()))?;

    if !config.plots_root.is_dir() {
        warn!(root = %config.plots_root.display(), "plots root is not a directory");
    }

    let state = Arc::new(AppState::new(PlotCatalog::new(
        config.plots_root.clone(),
        layout,
    )));
    let app = build_router(state);

    let addr = SocketAddr::new(config.bind, config.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;
    info!(%addr, root = %config.plots_root.display(), "plot dashboard listening");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
