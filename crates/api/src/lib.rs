pub mod routes;

use std::future::Future;
use std::net::SocketAddr;

use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::info;

use common::Result;

pub use routes::LIVENESS_TEXT;

/// Router exposing only the liveness route.
pub fn router() -> Router {
    Router::new()
        .merge(routes::health_router())
        .layer(TraceLayer::new_for_http())
}

/// Serve the liveness endpoint on all interfaces until `shutdown` resolves.
pub async fn serve(port: u16, shutdown: impl Future<Output = ()> + Send + 'static) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!(%addr, "Liveness endpoint listening");
    axum::serve(listener, router())
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}
