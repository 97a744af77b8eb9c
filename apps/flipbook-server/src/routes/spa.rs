//! Single-page app hosting
//!
//! Static files come from the configured directory; anything else falls
//! back to `index.html` so client-side routes resolve. A `?pdf=<url>` on the
//! entry page starts loading that document right away.

use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    response::Html,
    routing::{get, MethodRouter},
};
use tower_http::services::ServeDir;

use crate::error::{AppError, Result};
use crate::state::AppState;
use crate::viewer::ViewerEntry;

/// Static file service with the SPA index as fallback
pub fn service(state: AppState) -> ServeDir<MethodRouter> {
    let index: MethodRouter = get(index).with_state(state.clone());
    ServeDir::new(&state.config().assets.static_dir)
        .append_index_html_on_directories(false)
        .fallback(index)
}

/// Serve `index.html`, starting an auto-load when the entry parameter is set
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Html<String>> {
    if let ViewerEntry::AutoLoad(url) = ViewerEntry::from_query(&query) {
        let viewer = state.viewer().clone();
        tracing::info!("Auto-loading PDF from entry parameter: {}", url);
        tokio::spawn(async move {
            if let Err(e) = viewer.load(&url).await {
                tracing::warn!("Auto-load of {} failed: {}", url, e);
            }
        });
    }

    let path = state.config().assets.static_dir.join("index.html");
    match tokio::fs::read_to_string(&path).await {
        Ok(html) => Ok(Html(html)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(AppError::NotFound(format!("{} not found", path.display())))
        }
        Err(e) => Err(e.into()),
    }
}
