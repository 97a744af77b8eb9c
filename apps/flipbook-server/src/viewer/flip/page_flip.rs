//! Page-flip style renderer
//!
//! Shows one page at a time in single mode. In double mode pages pair up
//! from the start (1-2, 3-4, ...) without a separate cover.

use async_trait::async_trait;

use super::{
    DisplayMode, FlipBook, FlipConfig, FlipContainer, FlipEventSink, FlipRenderer, PageFrame,
};
use crate::viewer::error::ViewerResult;
use crate::viewer::types::ImageSequence;

#[derive(Debug, Default)]
pub struct PageFlipRenderer {
    book: Option<FlipBook>,
}

impl PageFlipRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FlipRenderer for PageFlipRenderer {
    fn name(&self) -> &'static str {
        "page-flip"
    }

    async fn init(
        &mut self,
        container: &FlipContainer,
        pages: &ImageSequence,
        config: &FlipConfig,
        events: FlipEventSink,
    ) -> ViewerResult<()> {
        self.destroy();
        self.book = Some(FlipBook::build(container, pages, config, events)?);
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
        match self.book.as_ref() {
            None => Vec::new(),
            Some(book) if book.display() == DisplayMode::Single => vec![book.current()],
            Some(book) => {
                let left = if book.current() % 2 == 1 {
                    book.current()
                } else {
                    book.current() - 1
                };
                (left..=(left + 1).min(book.total())).collect()
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
        self.book = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewer::flip::flip_channel;
    use crate::viewer::flip::tests::sequence;

    #[tokio::test]
    async fn test_double_mode_pairs_from_first_page() {
        let (tx, _rx) = flip_channel();
        let mut r = PageFlipRenderer::new();
        r.init(&FlipContainer::default(), &sequence(3), &FlipConfig::default(), tx)
            .await
            .unwrap();

        assert_eq!(r.visible_pages(), vec![1, 2]);
        r.go_to_next();
        assert_eq!(r.visible_pages(), vec![1, 2]);
        r.go_to_next();
        assert_eq!(r.visible_pages(), vec![3]);
        assert_eq!(r.current_page(), Some(3));
    }

    #[tokio::test]
    async fn test_destroy_before_init() {
        let mut r = PageFlipRenderer::new();
        r.destroy();
        r.destroy();
        assert!(!r.is_initialized());
        assert_eq!(r.frame(), None);
    }
}
