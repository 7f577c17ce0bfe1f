//! Prediction Oracle API Server
//!
//! HTTP surface over the prediction lifecycle: generate-and-submit,
//! finalize, contract reads, and dry-run variants that never touch the chain.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::{
    http::{header, Method},
    Router,
};
use oracle_services::LifecycleOrchestrator;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<LifecycleOrchestrator>,
}

impl AppState {
    pub fn new(orchestrator: LifecycleOrchestrator) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
        }
    }
}

/// Build the full application router
pub fn app(state: AppState) -> Router {
    // Configure CORS for frontend
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .merge(routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
