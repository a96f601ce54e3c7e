use axum::{routing::get, Router};

/// Body returned by the liveness probe.
pub const LIVENESS_TEXT: &str = "Bot de Sinais Ativo";

pub fn health_router() -> Router {
    Router::new().route("/", get(liveness))
}

/// Liveness probe for the hosting platform. No auth, and it does not reflect
/// monitoring health.
async fn liveness() -> &'static str {
    LIVENESS_TEXT
}
