//! Viewer orchestrator
//!
//! Sequences one "load a PDF and display it" request end to end:
//!
//! ```text
//! url ─► PdfSource::open ─► PageRasterizer::rasterize_all ─► FlipRenderer::init
//!                                                               │
//!                        PaginationController ◄── FlipEvent ────┘
//!                               │
//!                               └── NavCommand ──► FlipRenderer
//! ```
//!
//! # Concurrency
//!
//! Only the newest load may change the visible state. Every load takes a
//! generation number; a load that finds a newer generation after any
//! suspension point drops its result and reports [`ViewerError::Superseded`]
//! to its own caller only.
//!
//! Lock order is renderer (async mutex) before session (`parking_lot`). The
//! session lock is never held across an `.await`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::watch;

use super::error::{ViewerError, ViewerResult};
use super::flip::{
    flip_channel, FlipConfig, FlipContainer, FlipEventStream, FlipOrigin, FlipRenderer, PageFrame,
};
use super::input::{validate_url, NavigationKey};
use super::pagination::{NavCommand, PaginationController};
use super::rasterizer::{PageRasterizer, DEFAULT_SCALE};
use super::source::PdfSource;
use super::types::{DocumentHandle, ImageSequence, PageImage, RasterProgress, ViewerState};

/// Tunables for a viewer instance
#[derive(Debug, Clone)]
pub struct ViewerOptions {
    pub scale: f32,
    pub render_concurrency: usize,
    pub container: FlipContainer,
    pub flip: FlipConfig,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            render_concurrency: 1,
            container: FlipContainer::default(),
            flip: FlipConfig::default(),
        }
    }
}

/// State plus what the renderer currently shows
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerView {
    #[serde(flatten)]
    pub state: ViewerState,
    pub page_label: String,
    pub can_go_previous: bool,
    pub can_go_next: bool,
    pub visible_pages: Vec<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame: Option<PageFrame>,
    pub renderer: &'static str,
    /// Options the flipbook was built with; clients animate flips with them
    pub flip: FlipConfig,
}

#[derive(Default)]
struct Session {
    controller: PaginationController,
    is_loading: bool,
    last_error: Option<String>,
    source_url: Option<String>,
    progress: Option<RasterProgress>,
    document: Option<DocumentHandle>,
    images: Arc<ImageSequence>,
    events: Option<FlipEventStream>,
}

impl Session {
    /// Drop the displayed document and return to `Empty`
    fn reset(&mut self) {
        self.controller.clear();
        self.document = None;
        self.images = Arc::new(ImageSequence::new());
        self.events = None;
        self.progress = None;
    }

    /// Apply flips reported by the renderer
    fn sync_renderer_events(&mut self) {
        let Some(events) = self.events.as_mut() else {
            return;
        };
        while let Ok(event) = events.try_recv() {
            let changed = self.controller.external_jump(event.page);
            if changed && event.origin == FlipOrigin::Command {
                tracing::warn!(
                    "Renderer flipped to page {} on command; controller was out of sync",
                    event.page
                );
            }
        }
    }

    fn snapshot(&self) -> ViewerState {
        ViewerState {
            current_page: self.controller.current_page(),
            total_pages: self.controller.total_pages(),
            is_loading: self.is_loading,
            last_error: self.last_error.clone(),
            source_url: self.source_url.clone(),
            progress: self.progress,
        }
    }
}

/// Top-level viewer coordinator
pub struct ViewerOrchestrator {
    source: Arc<dyn PdfSource>,
    rasterizer: PageRasterizer,
    renderer: tokio::sync::Mutex<Box<dyn FlipRenderer>>,
    renderer_name: &'static str,
    session: Mutex<Session>,
    generation: AtomicU64,
    options: ViewerOptions,
    notifier: watch::Sender<ViewerState>,
}

impl ViewerOrchestrator {
    pub fn new(
        source: Arc<dyn PdfSource>,
        renderer: Box<dyn FlipRenderer>,
        options: ViewerOptions,
    ) -> Self {
        let rasterizer = PageRasterizer::with_concurrency(source.clone(), options.render_concurrency);
        let (notifier, _) = watch::channel(ViewerState::default());
        let renderer_name = renderer.name();

        Self {
            source,
            rasterizer,
            renderer: tokio::sync::Mutex::new(renderer),
            renderer_name,
            session: Mutex::new(Session::default()),
            generation: AtomicU64::new(0),
            options,
            notifier,
        }
    }

    pub fn options(&self) -> &ViewerOptions {
        &self.options
    }

    /// Receive a new [`ViewerState`] after every change
    pub fn subscribe(&self) -> watch::Receiver<ViewerState> {
        self.notifier.subscribe()
    }

    /// Current state
    pub fn state(&self) -> ViewerState {
        let mut session = self.session.lock();
        session.sync_renderer_events();
        session.snapshot()
    }

    /// State together with the renderer's view
    pub async fn view(&self) -> ViewerView {
        let renderer = self.renderer.lock().await;
        let state = self.state();
        ViewerView {
            page_label: state.page_label(),
            can_go_previous: state.can_go_previous(),
            can_go_next: state.can_go_next(),
            visible_pages: renderer.visible_pages(),
            frame: renderer.frame(),
            renderer: self.renderer_name,
            flip: self.options.flip.clone(),
            state,
        }
    }

    /// Whether a flip renderer instance is live
    pub async fn has_renderer(&self) -> bool {
        self.renderer.lock().await.is_initialized()
    }

    /// Rasterized page `index` (1-based) of the displayed document
    pub fn page_image(&self, index: usize) -> Option<PageImage> {
        self.session.lock().images.get(index).cloned()
    }

    /// The displayed document, if any
    pub fn document(&self) -> Option<DocumentHandle> {
        self.session.lock().document.clone()
    }

    /// Load and display the PDF at `url`
    ///
    /// Supersedes any load still in flight. On failure the viewer is left
    /// empty with `last_error` set.
    pub async fn load(&self, url: &str) -> ViewerResult<ViewerState> {
        let url = match validate_url(url) {
            Ok(url) => url,
            Err(e) => {
                self.session.lock().last_error = Some(e.user_message());
                self.publish();
                return Err(e);
            }
        };

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::info!("Loading PDF from {} (load #{})", url, generation);

        {
            let mut renderer = self.renderer.lock().await;
            self.ensure_current(generation)?;
            renderer.destroy();

            let mut session = self.session.lock();
            session.reset();
            session.is_loading = true;
            session.last_error = None;
            session.source_url = Some(url.clone());
        }
        self.publish();

        match self.run_load(generation, &url).await {
            Ok(state) => {
                tracing::info!("Flipbook ready: {} pages from {}", state.total_pages, url);
                Ok(state)
            }
            Err(ViewerError::Superseded) => {
                tracing::debug!("Discarding result of superseded load #{}", generation);
                Err(ViewerError::Superseded)
            }
            Err(e) => {
                tracing::warn!("Failed to load PDF from {}: {}", url, e);
                self.record_failure(generation, &e);
                Err(e)
            }
        }
    }

    async fn run_load(&self, generation: u64, url: &str) -> ViewerResult<ViewerState> {
        let handle = self.source.open(url).await?;
        self.ensure_current(generation)?;
        tracing::info!("PDF loaded with {} pages", handle.page_count);

        let images = self
            .rasterizer
            .rasterize_all(&handle, self.options.scale, |progress| {
                self.report_progress(generation, progress);
            })
            .await?;
        self.ensure_current(generation)?;

        let mut renderer = self.renderer.lock().await;
        self.ensure_current(generation)?;

        let (sink, stream) = flip_channel();
        renderer
            .init(&self.options.container, &images, &self.options.flip, sink)
            .await?;
        if let Err(e) = self.ensure_current(generation) {
            renderer.destroy();
            return Err(e);
        }

        let state = {
            let mut session = self.session.lock();
            session.controller.load(handle.page_count);
            session.document = Some(handle);
            session.images = Arc::new(images);
            session.events = Some(stream);
            session.is_loading = false;
            session.progress = None;
            session.snapshot()
        };
        drop(renderer);

        self.publish();
        Ok(state)
    }

    /// Flip forward one page
    pub async fn next(&self) -> ViewerState {
        self.navigate(PaginationController::next).await
    }

    /// Flip back one page
    pub async fn previous(&self) -> ViewerState {
        self.navigate(PaginationController::previous).await
    }

    /// Keyboard binding; unbound keys leave the state untouched
    pub async fn handle_key(&self, key: &str) -> ViewerState {
        match NavigationKey::from_key(key) {
            Some(NavigationKey::Previous) => self.previous().await,
            Some(NavigationKey::Next) => self.next().await,
            None => self.state(),
        }
    }

    /// Turn the renderer directly to `page`, as a drag or corner click does
    ///
    /// The controller follows through the renderer's flip event.
    pub async fn turn_to(&self, page: usize) -> ViewerState {
        let mut renderer = self.renderer.lock().await;
        renderer.turn_to(page);
        let state = self.state();
        drop(renderer);
        self.publish();
        state
    }

    async fn navigate(&self, step: fn(&mut PaginationController) -> Option<NavCommand>) -> ViewerState {
        let mut renderer = self.renderer.lock().await;
        let state = {
            let mut session = self.session.lock();
            session.sync_renderer_events();
            match step(&mut session.controller) {
                Some(NavCommand::Next) => renderer.go_to_next(),
                Some(NavCommand::Previous) => renderer.go_to_previous(),
                None => {}
            }
            session.sync_renderer_events();
            session.snapshot()
        };
        drop(renderer);
        self.publish();
        state
    }

    /// Destroy the flipbook and cancel any load in flight
    pub async fn clear(&self) -> ViewerState {
        self.generation.fetch_add(1, Ordering::SeqCst);
        let mut renderer = self.renderer.lock().await;
        renderer.destroy();
        let state = {
            let mut session = self.session.lock();
            session.reset();
            session.is_loading = false;
            session.last_error = None;
            session.source_url = None;
            session.snapshot()
        };
        drop(renderer);
        self.publish();
        state
    }

    /// Dismiss the error message
    pub fn dismiss_error(&self) -> ViewerState {
        let state = {
            let mut session = self.session.lock();
            session.last_error = None;
            session.snapshot()
        };
        self.publish();
        state
    }

    /// Leave the viewer empty with the failure's message, unless a newer
    /// load or a clear has taken over
    ///
    /// Newer loads bump the generation before resetting under the session
    /// lock, so checking it while holding that lock is race free.
    fn record_failure(&self, generation: u64, error: &ViewerError) -> bool {
        {
            let mut session = self.session.lock();
            if !self.is_current(generation) {
                return false;
            }
            session.reset();
            session.is_loading = false;
            session.source_url = None;
            session.last_error = Some(error.user_message());
        }
        self.publish();
        true
    }

    fn report_progress(&self, generation: u64, progress: RasterProgress) -> bool {
        {
            let mut session = self.session.lock();
            if !self.is_current(generation) {
                return false;
            }
            session.progress = Some(progress);
        }
        tracing::debug!("Rendered page {} of {}", progress.rendered, progress.total);
        self.publish();
        true
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    fn ensure_current(&self, generation: u64) -> ViewerResult<()> {
        if self.is_current(generation) {
            Ok(())
        } else {
            Err(ViewerError::Superseded)
        }
    }

    fn publish(&self) {
        let state = self.state();
        self.notifier.send_replace(state);
    }
}
