//! Flip renderer capability
//!
//! A flip renderer presents an [`ImageSequence`] as turnable pages, accepts
//! navigation commands and reports every completed flip as a [`FlipEvent`].
//! Two interchangeable implementations are provided:
//!
//! - [`TurnRenderer`]: book layout with a lone cover followed by two-page spreads
//! - [`PageFlipRenderer`]: single pages, or cover-less spreads in double mode

mod page_flip;
mod turn;

pub use page_flip::PageFlipRenderer;
pub use turn::TurnRenderer;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use super::error::{ViewerError, ViewerResult};
use super::types::ImageSequence;

/// What caused a flip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FlipOrigin {
    /// `go_to_next` / `go_to_previous`
    Command,
    /// Drag, corner click or direct page turn
    Gesture,
}

/// Emitted after each completed flip with the resulting page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlipEvent {
    pub page: usize,
    pub origin: FlipOrigin,
}

pub type FlipEventSink = mpsc::UnboundedSender<FlipEvent>;
pub type FlipEventStream = mpsc::UnboundedReceiver<FlipEvent>;

/// Create a connected sink/stream pair for one renderer instance
pub fn flip_channel() -> (FlipEventSink, FlipEventStream) {
    mpsc::unbounded_channel()
}

/// Element the flipbook is laid out in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlipContainer {
    pub id: String,
    pub width: u32,
    pub height: u32,
}

impl FlipContainer {
    pub fn new(id: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            id: id.into(),
            width,
            height,
        }
    }

    fn validate(&self) -> ViewerResult<()> {
        if self.id.trim().is_empty() {
            return Err(ViewerError::Init("container has no id".to_string()));
        }
        if self.width == 0 || self.height == 0 {
            return Err(ViewerError::Init(format!(
                "container {} has zero size ({}x{})",
                self.id, self.width, self.height
            )));
        }
        Ok(())
    }
}

impl Default for FlipContainer {
    fn default() -> Self {
        Self::new("flipbook", 1200, 800)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    Single,
    #[default]
    Double,
}

impl std::str::FromStr for DisplayMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(DisplayMode::Single),
            "double" => Ok(DisplayMode::Double),
            other => Err(format!("unknown display mode: {}", other)),
        }
    }
}

/// How pages are sized inside the container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum PageSizing {
    Fixed { width: u32, height: u32 },
    #[default]
    StretchToFit,
}

/// Flipbook options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlipConfig {
    pub sizing: PageSizing,
    pub display: DisplayMode,
    /// Flip animation length
    pub duration_ms: u32,
    pub auto_center: bool,
    pub gradients: bool,
    /// Shadow depth of the lifted page, in pixels
    pub elevation: u32,
}

impl Default for FlipConfig {
    fn default() -> Self {
        Self {
            sizing: PageSizing::StretchToFit,
            display: DisplayMode::Double,
            duration_ms: 600,
            auto_center: true,
            gradients: true,
            elevation: 50,
        }
    }
}

/// Size of one page frame after layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageFrame {
    pub width: u32,
    pub height: u32,
}

/// Interactive paginated view over an image sequence
#[async_trait]
pub trait FlipRenderer: Send + Sync {
    /// Implementation name, for logs and the API
    fn name(&self) -> &'static str;

    /// Lay out `pages` in `container`; a live instance is replaced
    ///
    /// Fails with `Init` when the container or the sequence is empty.
    async fn init(
        &mut self,
        container: &FlipContainer,
        pages: &ImageSequence,
        config: &FlipConfig,
        events: FlipEventSink,
    ) -> ViewerResult<()>;

    /// Flip forward; no-op on the last page
    fn go_to_next(&mut self);

    /// Flip back; no-op on the first page
    fn go_to_previous(&mut self);

    /// Turn directly to `page`, as a user gesture would
    fn turn_to(&mut self, page: usize);

    /// Page the renderer considers current, `None` when not initialized
    fn current_page(&self) -> Option<usize>;

    /// Pages currently on screen, in left-to-right order
    fn visible_pages(&self) -> Vec<usize>;

    fn frame(&self) -> Option<PageFrame>;

    fn is_initialized(&self) -> bool;

    /// Release the instance; safe to call at any time, any number of times
    fn destroy(&mut self);
}

/// Renderer-independent flipbook state
#[derive(Debug)]
pub(crate) struct FlipBook {
    total: usize,
    current: usize,
    display: DisplayMode,
    frame: PageFrame,
    events: FlipEventSink,
}

impl FlipBook {
    pub(crate) fn build(
        container: &FlipContainer,
        pages: &ImageSequence,
        config: &FlipConfig,
        events: FlipEventSink,
    ) -> ViewerResult<Self> {
        container.validate()?;
        let first = pages
            .get(1)
            .ok_or_else(|| ViewerError::Init("no pages to display".to_string()))?;

        let frame = layout(container, (first.width, first.height), config);
        Ok(Self {
            total: pages.len(),
            current: 1,
            display: config.display,
            frame,
            events,
        })
    }

    pub(crate) fn current(&self) -> usize {
        self.current
    }

    pub(crate) fn total(&self) -> usize {
        self.total
    }

    pub(crate) fn display(&self) -> DisplayMode {
        self.display
    }

    pub(crate) fn frame(&self) -> PageFrame {
        self.frame
    }

    pub(crate) fn next(&mut self) {
        if self.current < self.total {
            self.flip(self.current + 1, FlipOrigin::Command);
        }
    }

    pub(crate) fn previous(&mut self) {
        if self.current > 1 {
            self.flip(self.current - 1, FlipOrigin::Command);
        }
    }

    pub(crate) fn turn_to(&mut self, page: usize) {
        if (1..=self.total).contains(&page) && page != self.current {
            self.flip(page, FlipOrigin::Gesture);
        }
    }

    fn flip(&mut self, page: usize, origin: FlipOrigin) {
        self.current = page;
        // A dropped receiver only means nobody is listening anymore
        let _ = self.events.send(FlipEvent { page, origin });
    }
}

/// Fit page frames into the container
fn layout(container: &FlipContainer, first_page: (u32, u32), config: &FlipConfig) -> PageFrame {
    match config.sizing {
        PageSizing::Fixed { width, height } => PageFrame { width, height },
        PageSizing::StretchToFit => {
            let columns = match config.display {
                DisplayMode::Single => 1,
                DisplayMode::Double => 2,
            };
            let (page_w, page_h) = (first_page.0.max(1) as f64, first_page.1.max(1) as f64);
            let slot_w = container.width as f64 / columns as f64;
            let slot_h = container.height as f64;
            let scale = (slot_w / page_w).min(slot_h / page_h);
            PageFrame {
                width: (page_w * scale).floor().max(1.0) as u32,
                height: (page_h * scale).floor().max(1.0) as u32,
            }
        }
    }
}
