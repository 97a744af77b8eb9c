//! PDF Flipbook Server Library
//!
//! Serves the flipbook single-page app, relays PDFs around CORS
//! restrictions, and hosts the viewer pipeline that turns a remote PDF into
//! a navigable flipbook.
//!
//! # Modules
//!
//! - `viewer`: PDF source, rasterizer, pagination, flip renderers, orchestrator
//! - `routes`: HTTP handlers (health, relay, viewer API, SPA)
//! - `config`, `error`, `state`: server plumbing

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod viewer;

use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use state::AppState;

/// Build the application router
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/test", get(routes::health::test_endpoint))
        .nest("/proxy", routes::proxy::router())
        .nest("/api/v1/viewer", routes::viewer::router())
        .route("/", get(routes::spa::index))
        .fallback_service(routes::spa::service(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
