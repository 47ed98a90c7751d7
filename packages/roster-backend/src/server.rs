//! HTTP server: binds the listener and serves the API until shutdown.

use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::api::api_router;
use crate::state::AppState;

pub async fn serve(state: AppState) -> std::io::Result<()> {
    let port = state.port;
    let bind_addr = state.bind_address.clone();

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app: Router = api_router().layer(cors).with_state(state);

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", bind_addr, port)).await?;
    let actual_port = listener.local_addr()?.port();

    log::info!(
        "HTTP server listening on http://{}:{}",
        bind_addr,
        actual_port
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    log::info!("Shutdown signal received");
}
