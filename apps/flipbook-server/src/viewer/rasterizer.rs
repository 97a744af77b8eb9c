//! Page rasterizer
//!
//! Turns a [`DocumentHandle`] into a complete [`ImageSequence`]: every page is
//! rendered through the [`PdfSource`] and encoded as PNG. Renders may overlap
//! up to the configured concurrency, but results are always collected in
//! page order and any failure aborts the whole sequence.

use std::io::Cursor;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use image::{DynamicImage, RgbaImage};

use super::error::{ViewerError, ViewerResult};
use super::source::PdfSource;
use super::types::{DocumentHandle, ImageSequence, PageImage, RasterProgress, RawPixmap};

/// Default rasterization scale
pub const DEFAULT_SCALE: f32 = 1.5;

/// Renders all pages of a document into PNG images
pub struct PageRasterizer {
    source: Arc<dyn PdfSource>,
    concurrency: usize,
}

impl PageRasterizer {
    /// Sequential rasterizer (one page in flight)
    pub fn new(source: Arc<dyn PdfSource>) -> Self {
        Self::with_concurrency(source, 1)
    }

    /// Allow up to `concurrency` pages to render at once
    pub fn with_concurrency(source: Arc<dyn PdfSource>, concurrency: usize) -> Self {
        Self {
            source,
            concurrency: concurrency.max(1),
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Render pages `1..=page_count` in order
    ///
    /// `progress` is called after each page is appended to the sequence.
    pub async fn rasterize_all<F>(
        &self,
        handle: &DocumentHandle,
        scale: f32,
        progress: F,
    ) -> ViewerResult<ImageSequence>
    where
        F: Fn(RasterProgress) + Send + Sync,
    {
        let total = handle.page_count;
        let mut sequence = ImageSequence::with_capacity(total);

        let mut renders = stream::iter(1..=total)
            .map(|index| self.render_one(handle, index, scale))
            .buffered(self.concurrency);

        while let Some(result) = renders.next().await {
            sequence.push(result?)?;
            progress(RasterProgress {
                rendered: sequence.len(),
                total,
            });
        }

        Ok(sequence)
    }

    async fn render_one(
        &self,
        handle: &DocumentHandle,
        index: usize,
        scale: f32,
    ) -> ViewerResult<PageImage> {
        let page = self.source.get_page(handle, index)?;
        let pixmap = self
            .source
            .render_page(&page, scale)
            .await
            .map_err(|e| as_render_error(index, e))?;

        tokio::task::spawn_blocking(move || encode_png(index, pixmap))
            .await
            .map_err(|e| ViewerError::Render {
                page: index,
                reason: format!("Encode task failed: {}", e),
            })?
    }
}

fn as_render_error(page: usize, err: ViewerError) -> ViewerError {
    match err {
        ViewerError::Render { .. } => err,
        other => ViewerError::Render {
            page,
            reason: other.to_string(),
        },
    }
}

/// Encode a raw RGBA buffer as a PNG page image
pub fn encode_png(index: usize, pixmap: RawPixmap) -> ViewerResult<PageImage> {
    let RawPixmap {
        width,
        height,
        rgba,
    } = pixmap;

    let img = RgbaImage::from_raw(width, height, rgba).ok_or_else(|| ViewerError::Render {
        page: index,
        reason: format!("pixel buffer does not match {}x{}", width, height),
    })?;

    let mut data = Vec::new();
    DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut data), image::ImageFormat::Png)
        .map_err(|e| ViewerError::Render {
            page: index,
            reason: e.to_string(),
        })?;

    Ok(PageImage {
        index,
        data,
        width,
        height,
    })
}
