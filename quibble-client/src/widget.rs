use std::sync::Arc;

use futures::channel::oneshot;

use crate::{
    api::{CommentId, Error, PresenceUpdate},
    attachment::{AttachmentCache, AttachmentHandle},
    challenge::ChallengeSession,
    feed::watch_presence,
    form::CommentForm,
    picture::ImageNormalizer,
    remote::{ChallengeService, CommentStore, FieldValidator, PresenceFeed},
    thread::{ThreadView, DEFAULT_PAGE_SIZE},
};

/// Bounding box oversized image attachments are scaled into
const IMAGE_BOX: (u32, u32) = (320, 240);

/// Everything one mounted widget instance owns for one page load: the
/// displayed thread, the shared challenge puzzle, the attachment memo and
/// the latest presence value. All state is in memory; nothing survives the
/// page.
pub struct CommentWidget<R> {
    remote: Arc<R>,
    pub thread: ThreadView,
    pub session: ChallengeSession,
    pub attachments: AttachmentCache,
    normalizer: ImageNormalizer,
    online: Vec<String>,
    // dropping this cancels the presence driver; see watch_presence
    feed_canceller: Option<oneshot::Receiver<()>>,
}

impl<R> CommentWidget<R>
where
    R: CommentStore + FieldValidator + ChallengeService + 'static,
{
    pub fn new(remote: Arc<R>) -> CommentWidget<R> {
        CommentWidget::with_page_size(remote, DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(remote: Arc<R>, page_size: usize) -> CommentWidget<R> {
        let session = ChallengeSession::new(remote.clone());
        CommentWidget {
            remote,
            thread: ThreadView::new(page_size),
            session,
            attachments: AttachmentCache::new(),
            normalizer: ImageNormalizer::new(IMAGE_BOX.0, IMAGE_BOX.1),
            online: Vec::new(),
            feed_canceller: None,
        }
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// Re-fetch the whole tree; the only way the displayed thread changes
    pub async fn refresh(&mut self) -> Result<(), Error> {
        let comments = self.remote.fetch_comments().await?;
        self.thread.set_comments(comments);
        Ok(())
    }

    /// A new top-level form (`parent` = None) or reply form, with the
    /// shared puzzle freshly loaded. Refreshing the shared session means
    /// any other open form's displayed puzzle is superseded.
    pub async fn open_form(&self, parent: Option<CommentId>) -> CommentForm {
        let mut form = CommentForm::new(parent);
        form.load_challenge(&self.session).await;
        form
    }

    /// Drive the form through the pipeline; on success the thread is
    /// re-fetched so the new comment shows up. Returns whether the
    /// submission went through (failure details live in `form.alert`).
    pub async fn submit_form(&mut self, form: &mut CommentForm) -> bool {
        let created = form
            .submit(&*self.remote, &*self.remote, &self.session, &self.normalizer)
            .await;
        match created {
            Some(_) => {
                if let Err(e) = self.refresh().await {
                    tracing::error!("failed re-fetching comments after submission: {e}");
                }
                true
            }
            None => false,
        }
    }

    pub async fn preview_form(&self, form: &mut CommentForm) {
        form.show_preview(&*self.remote).await;
    }

    /// Resolve (and memoize) the attachment handle for a rendered node
    pub async fn attachment(&mut self, filename: &str) -> Option<&AttachmentHandle> {
        self.attachments.resolve(&*self.remote, filename).await
    }

    /// Record the newest presence value; the widget only ever displays the
    /// latest one
    pub fn note_presence(&mut self, update: PresenceUpdate) {
        self.online = update.online;
    }

    pub fn online(&self) -> &[String] {
        &self.online
    }
}

impl<R> CommentWidget<R>
where
    R: CommentStore + FieldValidator + ChallengeService + PresenceFeed + 'static,
{
    /// Future that pumps presence updates into `on_update` until the
    /// widget releases the feed (or is dropped). The caller spawns it on
    /// whatever executor drives the page.
    pub fn presence_driver(
        &mut self,
        on_update: impl FnMut(PresenceUpdate),
    ) -> impl std::future::Future<Output = ()> {
        let (cancel, canceller) = oneshot::channel();
        self.feed_canceller = Some(canceller);
        let feed: Arc<dyn PresenceFeed> = self.remote.clone();
        watch_presence(feed, cancel, on_update)
    }

    /// Release the presence feed without tearing the widget down
    pub fn release_presence(&mut self) {
        self.feed_canceller = None;
    }
}
