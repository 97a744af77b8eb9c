//! Application state management

use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::viewer::{MupdfSource, PdfSource, ViewerError, ViewerOrchestrator};

/// Error type for state initialization
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Failed to initialize PDF source: {0}")]
    PdfSource(#[from] ViewerError),
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    http: reqwest::Client,
    viewer: Arc<ViewerOrchestrator>,
}

impl AppState {
    /// Build the relay client and the viewer backed by MuPDF
    pub fn new(config: Config) -> Result<Self, StateError> {
        let mut source = MupdfSource::new(config.relay.timeout_secs, &config.relay.user_agent)?;
        if let Some(base) = &config.viewer.relay_base_url {
            source = source.with_relay(base.clone());
        }
        Self::with_source(config, Arc::new(source))
    }

    /// Build with a caller-supplied PDF source
    pub fn with_source(config: Config, source: Arc<dyn PdfSource>) -> Result<Self, StateError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.relay.timeout_secs))
            .user_agent(config.relay.user_agent.as_str())
            .build()?;

        let renderer = config.viewer.renderer.build();
        let renderer_name = renderer.name();
        let viewer = ViewerOrchestrator::new(source, renderer, config.viewer_options());
        tracing::info!(
            "Viewer ready (renderer: {}, scale: {})",
            renderer_name,
            viewer.options().scale
        );

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                http,
                viewer: Arc::new(viewer),
            }),
        })
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Client used by the relay for upstream fetches
    pub fn http_client(&self) -> &reqwest::Client {
        &self.inner.http
    }

    /// The process-local viewer
    pub fn viewer(&self) -> &Arc<ViewerOrchestrator> {
        &self.inner.viewer
    }
}
