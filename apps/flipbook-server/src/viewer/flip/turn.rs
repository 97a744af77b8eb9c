//! Book-style renderer
//!
//! The first page is a lone cover on the right; after it pages pair up as
//! even-left / odd-right spreads, like a printed book.

use async_trait::async_trait;

use super::{
    DisplayMode, FlipBook, FlipConfig, FlipContainer, FlipEventSink, FlipRenderer, PageFrame,
};
use crate::viewer::error::ViewerResult;
use crate::viewer::types::ImageSequence;

#[derive(Debug, Default)]
pub struct TurnRenderer {
    book: Option<FlipBook>,
}

impl TurnRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FlipRenderer for TurnRenderer {
    fn name(&self) -> &'static str {
        "turn"
    }

    async fn init(
        &mut self,
        container: &FlipContainer,
        pages: &ImageSequence,
        config: &FlipConfig,
        events: FlipEventSink,
    ) -> ViewerResult<()> {
        self.destroy();
        let book = FlipBook::build(container, pages, config, events)?;
        tracing::debug!(
            "Turn renderer ready in #{}: {} pages, {:?}, frame {}x{}",
            container.id,
            book.total(),
            book.display(),
            book.frame().width,
            book.frame().height
        );
        self.book = Some(book);
        Ok(())
    }

    fn go_to_next(&mut self) {
        if let Some(book) = self.book.as_mut() {
            book.next();
        }
    }

    fn go_to_previous(&mut self) {
        if let Some(book) = self.book.as_mut() {
            book.previous();
        }
    }

    fn turn_to(&mut self, page: usize) {
        if let Some(book) = self.book.as_mut() {
            book.turn_to(page);
        }
    }

    fn current_page(&self) -> Option<usize> {
        self.book.as_ref().map(FlipBook::current)
    }

    fn visible_pages(&self) -> Vec<usize> {
        let Some(book) = self.book.as_ref() else {
            return Vec::new();
        };
        let (page, total) = (book.current(), book.total());

        match book.display() {
            DisplayMode::Single => vec![page],
            DisplayMode::Double if page == 1 => vec![1],
            DisplayMode::Double => {
                let left = if page % 2 == 0 { page } else { page - 1 };
                if left < total {
                    vec![left, left + 1]
                } else {
                    vec![left]
                }
            }
        }
    }

    fn frame(&self) -> Option<PageFrame> {
        self.book.as_ref().map(FlipBook::frame)
    }

    fn is_initialized(&self) -> bool {
        self.book.is_some()
    }

    fn destroy(&mut self) {
        if self.book.take().is_some() {
            tracing::debug!("Turn renderer destroyed");
        }
    }
}
