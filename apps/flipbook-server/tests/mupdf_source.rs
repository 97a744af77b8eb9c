//! MuPDF source against a local upstream

mod common;

use std::time::Duration;

use axum::{http::StatusCode, routing::get, Router};
use flipbook_server::viewer::{FetchError, MupdfSource, PdfSource, ViewerError};

use common::{minimal_pdf, password_protected_pdf, spawn_upstream};

async fn upstream() -> String {
    spawn_upstream(
        Router::new()
            .route("/two.pdf", get(|| async { minimal_pdf(2) }))
            .route("/locked.pdf", get(|| async { password_protected_pdf() }))
            .route(
                "/slow.pdf",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(3)).await;
                    minimal_pdf(1)
                }),
            )
            .route("/page.html", get(|| async { "<html>not a pdf</html>" }))
            .route(
                "/forbidden.pdf",
                get(|| async { (StatusCode::FORBIDDEN, "nope") }),
            ),
    )
    .await
}

fn source() -> MupdfSource {
    MupdfSource::new(5, "flipbook-tests").unwrap()
}

#[tokio::test]
async fn test_open_and_render() {
    let base = upstream().await;
    let source = source();

    let handle = source.open(&format!("{}/two.pdf", base)).await.unwrap();
    assert_eq!(handle.page_count, 2);

    let page = source.get_page(&handle, 2).unwrap();
    assert_eq!((page.width, page.height), (200.0, 100.0));

    let pixmap = source.render_page(&page, 1.0).await.unwrap();
    assert_eq!((pixmap.width, pixmap.height), (200, 100));
    assert_eq!(pixmap.rgba.len(), 200 * 100 * 4);

    assert!(matches!(
        source.get_page(&handle, 3),
        Err(ViewerError::Index { index: 3, count: 2 })
    ));
}

#[tokio::test]
async fn test_http_errors() {
    let base = upstream().await;
    let source = source();

    assert_eq!(
        source.open(&format!("{}/missing.pdf", base)).await.unwrap_err(),
        ViewerError::Fetch(FetchError::Status(404))
    );
    assert_eq!(
        source.open(&format!("{}/forbidden.pdf", base)).await.unwrap_err(),
        ViewerError::Fetch(FetchError::Status(403))
    );
}

#[tokio::test]
async fn test_non_pdf_body_is_decode_error() {
    let base = upstream().await;
    assert!(matches!(
        source().open(&format!("{}/page.html", base)).await,
        Err(ViewerError::Decode(_))
    ));
}

#[tokio::test]
async fn test_unreachable_host_is_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    assert!(matches!(
        source().open(&format!("http://{}/doc.pdf", addr)).await,
        Err(ViewerError::Fetch(FetchError::Network(_)))
    ));
}

#[tokio::test]
async fn test_relay_fallback() {
    let relay = spawn_upstream(Router::new().route("/proxy/pdf", get(|| async { minimal_pdf(1) }))).await;
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let dead = listener.local_addr().unwrap();
    drop(listener);

    let source = source().with_relay(relay);
    let handle = source.open(&format!("http://{}/doc.pdf", dead)).await.unwrap();
    assert_eq!(handle.page_count, 1);
}

#[tokio::test]
async fn test_slow_upstream_times_out() {
    let base = upstream().await;
    let source = MupdfSource::new(1, "flipbook-tests").unwrap();

    assert_eq!(
        source.open(&format!("{}/slow.pdf", base)).await.unwrap_err(),
        ViewerError::Fetch(FetchError::Timeout(1))
    );
}

#[tokio::test]
async fn test_password_protected_pdf_is_auth_error() {
    let base = upstream().await;
    assert_eq!(
        source().open(&format!("{}/locked.pdf", base)).await.unwrap_err(),
        ViewerError::Auth
    );
}
