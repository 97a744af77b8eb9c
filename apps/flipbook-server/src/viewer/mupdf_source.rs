//! MuPDF-backed PDF source
//!
//! Fetches documents over HTTP (directly, or through the CORS relay when a
//! relay base URL is configured and the direct fetch fails) and decodes and
//! rasterizes them with MuPDF.
//!
//! MuPDF documents are not thread-safe, so nothing MuPDF-owned outlives a
//! single blocking task: every operation reopens the document from the
//! retained bytes on a `spawn_blocking` thread.

use std::time::Duration;

use async_trait::async_trait;
use mupdf::{Colorspace, Document, Matrix};
use tokio::time::timeout;

use super::error::{FetchError, ViewerError, ViewerResult};
use super::input::validate_url;
use super::source::PdfSource;
use super::types::{DocumentHandle, PageDescriptor, PageSize, RawPixmap};

/// Decoding gives up after this long; some malformed files make MuPDF spin
const DECODE_TIMEOUT_SECS: u64 = 30;
/// Per-page rasterization limit
const RENDER_TIMEOUT_SECS: u64 = 30;
/// `%PDF-` may be preceded by junk, but only within the first KiB
const HEADER_SEARCH_WINDOW: usize = 1024;

/// Default upstream user agent
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; PDF-Flipbook/1.0)";

/// PDF source backed by reqwest + MuPDF
pub struct MupdfSource {
    client: reqwest::Client,
    timeout_secs: u64,
    relay_base: Option<String>,
}

impl MupdfSource {
    /// Create a source whose fetches time out after `timeout_secs`
    pub fn new(timeout_secs: u64, user_agent: &str) -> ViewerResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(user_agent)
            .build()
            .map_err(|e| FetchError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            timeout_secs,
            relay_base: None,
        })
    }

    /// Retry failed direct fetches through `<base>/proxy/pdf?url=...`
    pub fn with_relay(mut self, base: impl Into<String>) -> Self {
        self.relay_base = Some(base.into());
        self
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| map_transport_error(e, self.timeout_secs))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| map_transport_error(e, self.timeout_secs))?;
        Ok(bytes.to_vec())
    }

    async fn fetch_with_fallback(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        match (self.fetch(url).await, &self.relay_base) {
            (Ok(bytes), _) => Ok(bytes),
            (Err(FetchError::Network(reason)), Some(base)) => {
                tracing::info!("Direct fetch of {} failed ({}), retrying through relay", url, reason);
                self.fetch(&relay_url(base, url)).await
            }
            (Err(e), _) => Err(e),
        }
    }
}

#[async_trait]
impl PdfSource for MupdfSource {
    async fn open(&self, url: &str) -> ViewerResult<DocumentHandle> {
        let url = validate_url(url)?;
        let data = self.fetch_with_fallback(&url).await?;
        tracing::debug!("Fetched {} bytes from {}", data.len(), url);

        let decode_result = timeout(
            Duration::from_secs(DECODE_TIMEOUT_SECS),
            tokio::task::spawn_blocking(move || {
                let sizes = decode_page_sizes(&data)?;
                Ok::<_, ViewerError>((data, sizes))
            }),
        )
        .await;

        let (data, sizes) = match decode_result {
            Ok(join_result) => join_result
                .map_err(|e| ViewerError::Decode(format!("Decode task failed: {}", e)))??,
            Err(_) => {
                return Err(ViewerError::Decode(format!(
                    "Decoding timed out after {} seconds",
                    DECODE_TIMEOUT_SECS
                )))
            }
        };

        Ok(DocumentHandle::new(url, data, sizes))
    }

    async fn render_page(&self, page: &PageDescriptor, scale: f32) -> ViewerResult<RawPixmap> {
        let index = page.index;
        if !(scale > 0.0) {
            return Err(ViewerError::Render {
                page: index,
                reason: format!("invalid scale {}", scale),
            });
        }

        let data = page.data.clone();
        let render_result = timeout(
            Duration::from_secs(RENDER_TIMEOUT_SECS),
            tokio::task::spawn_blocking(move || render_pixmap(&data, index, scale)),
        )
        .await;

        match render_result {
            Ok(Ok(result)) => result.map_err(|e| ViewerError::Render {
                page: index,
                reason: e.to_string(),
            }),
            Ok(Err(join_err)) => Err(ViewerError::Render {
                page: index,
                reason: format!("Render task failed: {}", join_err),
            }),
            Err(_) => Err(ViewerError::Render {
                page: index,
                reason: format!("timed out after {} seconds", RENDER_TIMEOUT_SECS),
            }),
        }
    }
}

/// Relay endpoint for `url`
pub fn relay_url(base: &str, url: &str) -> String {
    format!(
        "{}/proxy/pdf?url={}",
        base.trim_end_matches('/'),
        urlencoding::encode(url)
    )
}

fn map_transport_error(err: reqwest::Error, timeout_secs: u64) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout(timeout_secs)
    } else {
        FetchError::Network(err.to_string())
    }
}

fn has_pdf_header(data: &[u8]) -> bool {
    let window = &data[..data.len().min(HEADER_SEARCH_WINDOW)];
    window.windows(5).any(|w| w == b"%PDF-")
}

fn open_document(data: &[u8]) -> ViewerResult<Document> {
    if !has_pdf_header(data) {
        return Err(ViewerError::Decode("missing %PDF- header".to_string()));
    }
    Ok(Document::from_bytes(data, "application/pdf")?)
}

fn decode_page_sizes(data: &[u8]) -> ViewerResult<Vec<PageSize>> {
    let doc = open_document(data)?;
    if doc.needs_password()? {
        return Err(ViewerError::Auth);
    }

    let count = doc.page_count()?;
    let mut sizes = Vec::with_capacity(count.max(0) as usize);
    for i in 0..count {
        let bounds = doc.load_page(i)?.bounds()?;
        sizes.push(PageSize::new(bounds.x1 - bounds.x0, bounds.y1 - bounds.y0));
    }
    Ok(sizes)
}

fn render_pixmap(data: &[u8], index: usize, scale: f32) -> ViewerResult<RawPixmap> {
    let doc = open_document(data)?;
    let page = doc.load_page(index as i32 - 1)?;

    let matrix = Matrix::new_scale(scale, scale);
    let colorspace = Colorspace::device_rgb();
    let pixmap = page.to_pixmap(&matrix, &colorspace, false, true)?;

    let width = pixmap.width() as u32;
    let height = pixmap.height() as u32;
    let rgba = samples_to_rgba(pixmap.samples(), pixmap.n() as usize, width, height);

    Ok(RawPixmap {
        width,
        height,
        rgba,
    })
}

/// Widened before multiplying; large pages at high scales exceed `u32`
fn pixel_count(width: u32, height: u32) -> usize {
    width as usize * height as usize
}

/// Expand `n`-component samples (gray, RGB, RGBA) into RGBA
fn samples_to_rgba(samples: &[u8], n: usize, width: u32, height: u32) -> Vec<u8> {
    let pixels = pixel_count(width, height);
    let mut rgba = Vec::with_capacity(pixels * 4);

    for p in 0..pixels {
        let offset = p * n;
        let px = |c: usize| samples.get(offset + c).copied().unwrap_or(0);
        match n {
            1 | 2 => {
                let v = px(0);
                let a = if n == 2 { px(1) } else { 255 };
                rgba.extend_from_slice(&[v, v, v, a]);
            }
            _ => {
                let a = if n >= 4 { px(3) } else { 255 };
                rgba.extend_from_slice(&[px(0), px(1), px(2), a]);
            }
        }
    }
    rgba
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relay_url_encodes_target() {
        assert_eq!(
            relay_url("http://localhost:3000/", "https://a.com/x.pdf?v=1"),
            "http://localhost:3000/proxy/pdf?url=https%3A%2F%2Fa.com%2Fx.pdf%3Fv%3D1"
        );
    }

    #[test]
    fn test_pdf_header_detection() {
        assert!(has_pdf_header(b"%PDF-1.7\n..."));
        assert!(has_pdf_header(b"\xEF\xBB\xBF%PDF-1.4"));
        assert!(!has_pdf_header(b"<html>not found</html>"));
        assert!(!has_pdf_header(b""));
    }

    #[test]
    fn test_non_pdf_bytes_fail_to_decode() {
        assert!(matches!(
            decode_page_sizes(b"<html>oops</html>"),
            Err(ViewerError::Decode(_))
        ));
    }

    #[test]
    fn test_samples_to_rgba() {
        assert_eq!(samples_to_rgba(&[1, 2, 3], 3, 1, 1), vec![1, 2, 3, 255]);
        assert_eq!(samples_to_rgba(&[9], 1, 1, 1), vec![9, 9, 9, 255]);
        assert_eq!(samples_to_rgba(&[1, 2, 3, 4], 4, 1, 1), vec![1, 2, 3, 4]);
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_pixel_count_does_not_overflow() {
        assert_eq!(pixel_count(65_536, 65_536), 1 << 32);
        assert_eq!(pixel_count(200, 100), 20_000);
    }
}
