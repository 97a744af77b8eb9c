//! PDF flipbook viewer pipeline
//!
//! load → rasterize → paginate → navigate:
//!
//! - `source`: PDF retrieval/decoding capability ([`PdfSource`]) and its
//!   MuPDF implementation
//! - `rasterizer`: every page to a PNG [`PageImage`], in page order
//! - `pagination`: navigation state machine
//! - `flip`: page-turning renderer capability and two implementations
//! - `orchestrator`: end-to-end sequencing, error translation, stale-load
//!   protection

pub mod error;
pub mod flip;
pub mod input;
pub mod mupdf_source;
pub mod orchestrator;
pub mod pagination;
pub mod rasterizer;
pub mod source;
pub mod types;

pub use error::{FetchError, ViewerError, ViewerResult};
pub use flip::{
    DisplayMode, FlipConfig, FlipContainer, FlipEvent, FlipOrigin, FlipRenderer, PageFlipRenderer,
    PageSizing, TurnRenderer,
};
pub use input::{validate_url, NavigationKey, ViewerEntry};
pub use mupdf_source::MupdfSource;
pub use orchestrator::{ViewerOptions, ViewerOrchestrator, ViewerView};
pub use pagination::{NavCommand, PaginationController, PaginationState};
pub use rasterizer::PageRasterizer;
pub use source::PdfSource;
pub use types::{
    DocumentHandle, ImageSequence, PageDescriptor, PageImage, PageSize, RasterProgress, RawPixmap,
    ViewerState,
};
