//! Shared helpers for integration tests

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use flipbook_server::config::Config;
use flipbook_server::state::AppState;
use flipbook_server::viewer::{
    DocumentHandle, FetchError, PageDescriptor, PageSize, PdfSource, RawPixmap, ViewerError,
    ViewerResult,
};

/// Serve `router` on an ephemeral local port, returning its base URL
pub async fn spawn_upstream(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// A well-formed PDF with `pages` blank 200x100pt pages
pub fn minimal_pdf(pages: usize) -> Vec<u8> {
    build_pdf(pages, None)
}

/// A one-page PDF under the standard security handler (RC4, revision 2)
/// whose user password is not empty
pub fn password_protected_pdf() -> Vec<u8> {
    let owner = "0123456789abcdef".repeat(4);
    let user = "fedcba9876543210".repeat(4);
    build_pdf(
        1,
        Some(format!(
            "<< /Filter /Standard /V 1 /R 2 /Length 40 /O <{}> /U <{}> /P -44 >>",
            owner, user
        )),
    )
}

fn build_pdf(pages: usize, encrypt: Option<String>) -> Vec<u8> {
    let kids: Vec<String> = (0..pages).map(|i| format!("{} 0 R", i + 3)).collect();
    let mut objects = vec![
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        format!("<< /Type /Pages /Kids [{}] /Count {} >>", kids.join(" "), pages),
    ];
    for _ in 0..pages {
        objects.push("<< /Type /Page /Parent 2 0 R /MediaBox [0 0 200 100] >>".to_string());
    }

    let mut trailer = format!("/Size {} /Root 1 0 R", objects.len() + 1);
    if let Some(encrypt) = encrypt {
        objects.push(encrypt);
        trailer = format!(
            "/Size {} /Root 1 0 R /Encrypt {} 0 R /ID [<00112233445566778899aabbccddeeff> <00112233445566778899aabbccddeeff>]",
            objects.len() + 1,
            objects.len()
        );
    }

    let mut out = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::new();
    for (i, object) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, object).as_bytes());
    }

    let xref = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1).as_bytes());
    for offset in offsets {
        out.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
    }
    out.extend_from_slice(
        format!("trailer\n<< {} >>\nstartxref\n{}\n%%EOF\n", trailer, xref).as_bytes(),
    );
    out
}

/// Source for `https://docs.test/<n>.pdf` documents with `n` pages
///
/// Any other host is unreachable.
pub struct StubSource;

#[async_trait]
impl PdfSource for StubSource {
    async fn open(&self, url: &str) -> ViewerResult<DocumentHandle> {
        let pages = url
            .strip_prefix("https://docs.test/")
            .and_then(|rest| rest.strip_suffix(".pdf"))
            .and_then(|n| n.parse::<usize>().ok())
            .ok_or_else(|| ViewerError::Fetch(FetchError::Network("connection refused".into())))?;
        Ok(DocumentHandle::new(
            url,
            b"%PDF-1.4 stub".to_vec(),
            vec![PageSize::LETTER; pages],
        ))
    }

    async fn render_page(&self, _page: &PageDescriptor, _scale: f32) -> ViewerResult<RawPixmap> {
        Ok(RawPixmap {
            width: 4,
            height: 4,
            rgba: vec![200; 4 * 4 * 4],
        })
    }
}

pub fn test_config(static_dir: &Path) -> Config {
    let mut config = Config::default();
    config.server.port = 4321;
    config.server.environment = "test".to_string();
    config.assets.static_dir = static_dir.to_path_buf();
    config.relay.timeout_secs = 5;
    config.viewer.duration_ms = 300;
    config
}

/// App state backed by [`StubSource`]
pub fn stub_state(static_dir: &Path) -> AppState {
    AppState::with_source(test_config(static_dir), Arc::new(StubSource)).unwrap()
}
