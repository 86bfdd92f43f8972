//! Attachment resolution: classification by declared content type, the
//! degrade-to-nothing rule, and the per-widget handle memo.

use std::sync::Arc;

use quibble_client::{resolve_attachment, AttachmentCache, AttachmentHandle};
use quibble_mock_server::MockServer;
use tests::png_bytes;

#[tokio::test]
async fn image_content_types_yield_displayable_handles() {
    let server = Arc::new(MockServer::new());
    server.test_store_attachment("cat.png", "image/png", png_bytes(10, 10));

    let handle = resolve_attachment(&*server, "cat.png")
        .await
        .expect("image attachment resolves");
    match handle {
        AttachmentHandle::Image { media_type, bytes } => {
            assert_eq!(media_type, "image/png");
            assert!(!bytes.is_empty());
        }
        other => panic!("expected an image handle, got {other:?}"),
    }
}

#[tokio::test]
async fn text_content_types_yield_downloads_under_the_original_name() {
    let server = Arc::new(MockServer::new());
    server.test_store_attachment("notes.txt", "text/plain", b"dear diary".to_vec());

    let handle = resolve_attachment(&*server, "notes.txt")
        .await
        .expect("text attachment resolves");
    assert_eq!(
        handle,
        AttachmentHandle::Download {
            filename: String::from("notes.txt"),
            bytes: b"dear diary".to_vec(),
        }
    );
}

#[tokio::test]
async fn anything_else_degrades_to_no_attachment() {
    let server = Arc::new(MockServer::new());
    server.test_store_attachment("blob.bin", "application/octet-stream", vec![0, 1, 2]);
    server.test_store_attachment("weird.x", "definitely not a mime type", vec![3]);

    assert_eq!(resolve_attachment(&*server, "blob.bin").await, None);
    assert_eq!(resolve_attachment(&*server, "weird.x").await, None);
    assert_eq!(resolve_attachment(&*server, "missing.png").await, None);
}

#[tokio::test]
async fn the_cache_fetches_each_attachment_once() {
    let server = Arc::new(MockServer::new());
    server.test_store_attachment("cat.png", "image/png", png_bytes(10, 10));
    let mut cache = AttachmentCache::new();

    assert!(cache.get("cat.png").is_none());
    assert!(cache.resolve(&*server, "cat.png").await.is_some());
    assert!(cache.resolve(&*server, "cat.png").await.is_some());
    assert!(cache.get("cat.png").is_some());
    // the second resolve was a memo hit: a lightbox re-open never re-fetches
    assert_eq!(server.test_attachment_fetches(), 1);
}

#[tokio::test]
async fn failed_resolutions_are_not_cached() {
    let server = Arc::new(MockServer::new());
    let mut cache = AttachmentCache::new();

    assert!(cache.resolve(&*server, "late.png").await.is_none());
    // the attachment shows up later (e.g. replication lag); a new render
    // pass picks it up
    server.test_store_attachment("late.png", "image/png", png_bytes(4, 4));
    assert!(cache.resolve(&*server, "late.png").await.is_some());
    assert_eq!(server.test_attachment_fetches(), 2);
}
