//! PDF source capability
//!
//! Retrieval, decoding and rasterization of PDF pages live behind this trait
//! so the rest of the pipeline never touches a concrete decoder.

use async_trait::async_trait;

use super::error::ViewerResult;
use super::types::{DocumentHandle, PageDescriptor, RawPixmap};

/// Produces decoded documents and rasterizes their pages
#[async_trait]
pub trait PdfSource: Send + Sync {
    /// Fetch and decode the document at `url`
    ///
    /// Fails with `Fetch`, `Decode` or `Auth`.
    async fn open(&self, url: &str) -> ViewerResult<DocumentHandle>;

    /// Look up page `index` (1-based); `Index` error when out of range
    fn get_page(&self, handle: &DocumentHandle, index: usize) -> ViewerResult<PageDescriptor> {
        handle.page(index)
    }

    /// Rasterize a page at `scale` (> 0). Deterministic for a fixed input.
    async fn render_page(&self, page: &PageDescriptor, scale: f32) -> ViewerResult<RawPixmap>;
}
