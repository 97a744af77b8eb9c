//! Viewer data model
//!
//! All entities are session-scoped and held in memory. Page indices are
//! 1-based throughout this module.

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use super::error::{ViewerError, ViewerResult};

/// Page size in points (72 points = 1 inch)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    pub const LETTER: PageSize = PageSize {
        width: 612.0,
        height: 792.0,
    };

    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// A decoded PDF owned by one viewing session
///
/// The raw bytes are retained so the source can reopen the document for each
/// page operation, and so the viewer can hand the original file back for
/// download. Page sizes are read once at decode time.
#[derive(Debug, Clone)]
pub struct DocumentHandle {
    pub id: Uuid,
    pub source_url: String,
    pub page_count: usize,
    pub page_sizes: Arc<Vec<PageSize>>,
    pub data: Arc<Vec<u8>>,
}

impl DocumentHandle {
    pub fn new(source_url: impl Into<String>, data: Vec<u8>, page_sizes: Vec<PageSize>) -> Self {
        Self {
            id: Uuid::new_v4(),
            source_url: source_url.into(),
            page_count: page_sizes.len(),
            page_sizes: Arc::new(page_sizes),
            data: Arc::new(data),
        }
    }

    /// Describe page `index` (1-based)
    pub fn page(&self, index: usize) -> ViewerResult<PageDescriptor> {
        let size = index
            .checked_sub(1)
            .and_then(|i| self.page_sizes.get(i))
            .ok_or(ViewerError::Index {
                index,
                count: self.page_count,
            })?;
        Ok(PageDescriptor {
            index,
            width: size.width,
            height: size.height,
            data: Arc::clone(&self.data),
        })
    }
}

/// One page of a document, ready to be rendered
#[derive(Debug, Clone)]
pub struct PageDescriptor {
    /// 1-based page index
    pub index: usize,
    /// Page width in points (72 points = 1 inch)
    pub width: f32,
    /// Page height in points
    pub height: f32,
    pub data: Arc<Vec<u8>>,
}

/// Raw RGBA pixel buffer produced by a source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPixmap {
    pub width: u32,
    pub height: u32,
    /// Row-major RGBA, `width * height * 4` bytes
    pub rgba: Vec<u8>,
}

/// One rasterized, encoded page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageImage {
    pub index: usize,
    /// PNG-encoded bytes
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Ordered pages of one document
///
/// Indices are always contiguous `1..=len` in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageSequence {
    pages: Vec<PageImage>,
}

impl ImageSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pages: Vec::with_capacity(capacity),
        }
    }

    /// Append the next page; its index must be `len() + 1`
    pub fn push(&mut self, page: PageImage) -> ViewerResult<()> {
        let expected = self.pages.len() + 1;
        if page.index != expected {
            return Err(ViewerError::Index {
                index: page.index,
                count: self.pages.len(),
            });
        }
        self.pages.push(page);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Page by 1-based index
    pub fn get(&self, index: usize) -> Option<&PageImage> {
        index.checked_sub(1).and_then(|i| self.pages.get(i))
    }

    pub fn iter(&self) -> impl Iterator<Item = &PageImage> {
        self.pages.iter()
    }
}

/// Advisory rasterization progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RasterProgress {
    pub rendered: usize,
    pub total: usize,
}

/// Observable viewer state
///
/// `current_page == 0` iff `total_pages == 0`; otherwise
/// `1 <= current_page <= total_pages`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerState {
    pub current_page: usize,
    pub total_pages: usize,
    pub is_loading: bool,
    pub last_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<RasterProgress>,
}

impl ViewerState {
    /// Text for the "page X of Y" indicator
    pub fn page_label(&self) -> String {
        format!("Page {} of {}", self.current_page, self.total_pages)
    }

    pub fn can_go_previous(&self) -> bool {
        self.total_pages > 0 && self.current_page > 1
    }

    pub fn can_go_next(&self) -> bool {
        self.total_pages > 0 && self.current_page < self.total_pages
    }

    pub fn has_document(&self) -> bool {
        self.total_pages > 0
    }
}
