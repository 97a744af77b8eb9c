//! Health check endpoints

use axum::{extract::State, Json};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub port: u16,
    pub environment: String,
}

#[derive(Serialize)]
pub struct TestResponse {
    pub message: &'static str,
    pub timestamp: String,
    pub port: u16,
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let server = &state.config().server;
    Json(HealthResponse {
        status: "OK",
        timestamp: now(),
        port: server.port,
        environment: server.environment.clone(),
    })
}

pub async fn test_endpoint(State(state): State<AppState>) -> Json<TestResponse> {
    Json(TestResponse {
        message: "PDF Flipbook server is running!",
        timestamp: now(),
        port: state.config().server.port,
    })
}
