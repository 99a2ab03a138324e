mod handlers;
mod state;
mod static_files;

use axum::http::{header, HeaderValue};
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::assessment::Assessor;
pub use state::AppState;

pub fn build_router(assessor: Assessor) -> Router {
    let state = Arc::new(AppState { assessor });

    // Every assessment is a fresh draw; never let a cache replay one.
    let api = Router::new()
        .route("/assess", get(handlers::assess))
        .route("/resolve", get(handlers::resolve))
        .route("/bands", get(handlers::bands))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ));

    Router::new()
        .route("/", get(handlers::index))
        .route("/style.css", get(handlers::style))
        .route("/app.js", get(handlers::script))
        .nest("/api", api)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve on an already-bound listener until the process is stopped.
pub async fn serve(listener: tokio::net::TcpListener, assessor: Assessor) -> std::io::Result<()> {
    axum::serve(listener, build_router(assessor)).await
}

pub async fn start(host: &str, port: u16, assessor: Assessor) -> std::io::Result<()> {
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("flood risk server listening on http://{}", addr);
    eprintln!("  Press Ctrl+C to stop.");

    serve(listener, assessor).await
}
