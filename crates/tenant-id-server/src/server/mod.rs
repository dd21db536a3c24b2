pub mod config;
pub mod envelope;
pub mod error;
pub mod handler;
pub mod middleware;
pub mod state;
pub mod telemetry;


use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};

use crate::server::{middleware::stamp_sid, state::AppState};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handler::health))
        .route("/apps", post(handler::create_app))
        .route("/apps/{app_id}/keys", post(handler::issue_key))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            stamp_sid,
        ))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
