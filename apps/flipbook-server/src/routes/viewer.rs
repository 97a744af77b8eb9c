//! Viewer session API
//!
//! Drives the process-local viewer over HTTP:
//! - Load a PDF and build its flipbook
//! - Navigate (buttons, arrow keys, page turns)
//! - Fetch rendered pages and the original document

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::Response,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::state::AppState;
use crate::viewer::ViewerView;

/// Create the viewer router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_view).delete(clear))
        .route("/load", post(load))
        .route("/next", post(next))
        .route("/previous", post(previous))
        .route("/jump", post(jump))
        .route("/key", post(key))
        .route("/error", delete(dismiss_error))
        .route("/pages/:page", get(page_image))
        .route("/document", get(download))
}

#[derive(Debug, Deserialize)]
pub struct LoadRequest {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct JumpRequest {
    pub page: usize,
}

#[derive(Debug, Deserialize)]
pub struct KeyRequest {
    pub key: String,
}

async fn get_view(State(state): State<AppState>) -> Json<ViewerView> {
    Json(state.viewer().view().await)
}

async fn load(
    State(state): State<AppState>,
    Json(request): Json<LoadRequest>,
) -> Result<Json<ViewerView>> {
    let viewer = state.viewer();
    viewer.load(&request.url).await?;
    Ok(Json(viewer.view().await))
}

async fn next(State(state): State<AppState>) -> Json<ViewerView> {
    let viewer = state.viewer();
    viewer.next().await;
    Json(viewer.view().await)
}

async fn previous(State(state): State<AppState>) -> Json<ViewerView> {
    let viewer = state.viewer();
    viewer.previous().await;
    Json(viewer.view().await)
}

async fn jump(
    State(state): State<AppState>,
    Json(request): Json<JumpRequest>,
) -> Json<ViewerView> {
    let viewer = state.viewer();
    viewer.turn_to(request.page).await;
    Json(viewer.view().await)
}

async fn key(State(state): State<AppState>, Json(request): Json<KeyRequest>) -> Json<ViewerView> {
    let viewer = state.viewer();
    viewer.handle_key(&request.key).await;
    Json(viewer.view().await)
}

async fn clear(State(state): State<AppState>) -> Json<ViewerView> {
    let viewer = state.viewer();
    viewer.clear().await;
    Json(viewer.view().await)
}

async fn dismiss_error(State(state): State<AppState>) -> Json<ViewerView> {
    let viewer = state.viewer();
    viewer.dismiss_error();
    Json(viewer.view().await)
}

/// Rendered page as PNG
async fn page_image(State(state): State<AppState>, Path(page): Path<usize>) -> Result<Response> {
    let image = state
        .viewer()
        .page_image(page)
        .ok_or_else(|| AppError::NotFound(format!("Page {} not found", page)))?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "image/png")
        .header(header::CONTENT_LENGTH, image.data.len())
        .header(header::CACHE_CONTROL, "no-store")
        .body(Body::from(image.data))
        .map_err(|e| AppError::Internal(e.to_string()))
}

/// Original PDF of the displayed document
async fn download(State(state): State<AppState>) -> Result<Response> {
    let document = state
        .viewer()
        .document()
        .ok_or_else(|| AppError::NotFound("No PDF loaded to download".to_string()))?;
    let data = document.data.as_ref().clone();

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/pdf")
        .header(header::CONTENT_LENGTH, data.len())
        .header(
            header::CONTENT_DISPOSITION,
            "attachment; filename=\"document.pdf\"",
        )
        .body(Body::from(data))
        .map_err(|e| AppError::Internal(e.to_string()))
}
