use std::sync::Arc;

use axum::Router;
use axum::routing::get;

use crate::state::AppState;

pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod filename;
pub mod layout_config;
pub mod paths;
pub mod routes;
pub mod state;
pub mod styles;
pub mod views;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(views::plots::plot_viewer))
        .route("/gallery", get(views::gallery::gallery))
        .route("/plots/{*path}", get(routes::serve_plot))
        .route("/download/{*path}", get(routes::download_plot))
        .route("/styles.css", get(views::styles))
        .with_state(state)
}
