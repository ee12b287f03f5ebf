//! HTTP server assembly.

use anyhow::Result;
use axum::routing::{get, post};
use axum::Router;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::state::AppState;
use super::{meta_routes, search_routes, track_routes};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/analyze/url", post(search_routes::analyze_url))
        .route("/api/search/artist", post(search_routes::search_artist))
        .route("/api/search/song", post(search_routes::search_song))
        .route("/api/search/catalog", post(search_routes::search_catalog))
        .route(
            "/api/tracks/{track_id}/licensing",
            get(track_routes::get_licensing),
        )
        .route("/api/tracks/detail", post(track_routes::get_track_detail))
        .route("/api/meta/health", get(meta_routes::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until the shutdown token fires.
pub async fn run_server(state: AppState, port: u16, shutdown: CancellationToken) -> Result<()> {
    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!(port, "Listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;
    Ok(())
}
