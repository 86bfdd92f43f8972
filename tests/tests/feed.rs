//! The presence subscription: latest-value delivery, cancellation on
//! teardown, and release of the feed slot.

use std::sync::Arc;

use futures::channel::{mpsc, oneshot};
use futures::StreamExt;
use quibble_client::{watch_presence, CommentWidget, PresenceFeed};
use quibble_mock_server::MockServer;

#[tokio::test]
async fn updates_flow_until_the_canceller_is_dropped() {
    let server = Arc::new(MockServer::new());
    server.test_set_online(vec![String::from("ada")]);

    let (cancel, canceller) = oneshot::channel();
    let (seen_tx, mut seen) = mpsc::unbounded();
    let feed: Arc<dyn PresenceFeed> = server.clone();
    let driver = tokio::spawn(watch_presence(feed, cancel, move |update| {
        seen_tx.unbounded_send(update).expect("collector alive");
    }));

    // subscribing immediately delivers the current value
    let first = seen.next().await.expect("initial value");
    assert_eq!(first.online, vec!["ada"]);

    server.test_set_online(vec![String::from("ada"), String::from("ben")]);
    let second = seen.next().await.expect("pushed update");
    assert_eq!(second.online, vec!["ada", "ben"]);

    // tearing the holder down stops the driver and ends the stream
    drop(canceller);
    driver.await.expect("driver exits cleanly");
    assert_eq!(seen.next().await, None);

    // the next push prunes the dead subscription
    server.test_set_online(Vec::new());
    assert_eq!(server.test_feed_count(), 0);
}

#[tokio::test]
async fn the_widget_tracks_the_latest_presence_value() {
    let server = Arc::new(MockServer::new());
    let mut widget = CommentWidget::new(server.clone());

    let (seen_tx, mut seen) = mpsc::unbounded();
    let driver = tokio::spawn(widget.presence_driver(move |update| {
        seen_tx.unbounded_send(update).expect("collector alive");
    }));

    let initial = seen.next().await.expect("initial value");
    widget.note_presence(initial);
    assert!(widget.online().is_empty());

    server.test_set_online(vec![String::from("eve")]);
    let update = seen.next().await.expect("pushed update");
    widget.note_presence(update);
    assert_eq!(widget.online(), [String::from("eve")].as_slice());

    widget.release_presence();
    driver.await.expect("driver exits cleanly");
}
