use std::sync::Arc;

use futures::{channel::oneshot, select, FutureExt, StreamExt};

use crate::{api::PresenceUpdate, remote::PresenceFeed};

/// Forward presence updates to `on_update` until the feed ends or the
/// receiver half of `cancel` is dropped. The widget holds that receiver
/// for its lifetime: acquire on mount, release on unmount, and a torn-down
/// widget is never called back.
pub async fn watch_presence(
    feed: Arc<dyn PresenceFeed>,
    mut cancel: oneshot::Sender<()>,
    mut on_update: impl FnMut(PresenceUpdate),
) {
    let mut updates = match feed.subscribe().await {
        Ok(subscription) => subscription.fuse(),
        Err(e) => {
            tracing::error!("failed subscribing to presence feed: {e}");
            return;
        }
    };
    let mut cancellation = cancel.cancellation().fuse();
    loop {
        select! {
            _ = cancellation => {
                tracing::debug!("presence feed released");
                return;
            }
            update = updates.next() => match update {
                Some(update) => on_update(update),
                None => return,
            },
        }
    }
}
