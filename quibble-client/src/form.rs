use std::ops::Range;

use crate::{
    api::{Challenge, Comment, CommentFields, CommentId, NewAttachment},
    challenge::ChallengeSession,
    picture::ImageNormalizer,
    remote::{CommentStore, FieldValidator},
    submit::{self, SubmitError},
};

/// An in-progress, not-yet-submitted comment or reply. Mutated field by
/// field as the user types; cleared only on successful submission.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Draft {
    pub username: String,
    pub email: String,
    pub homepage: String,
    pub content: String,
    pub attachment: Option<NewAttachment>,
    /// Present iff this draft is a reply
    pub parent: Option<CommentId>,
    pub challenge_answer: String,
}

impl Draft {
    pub fn reply_to(parent: CommentId) -> Draft {
        Draft {
            parent: Some(parent),
            ..Draft::default()
        }
    }

    pub fn fields(&self) -> CommentFields {
        CommentFields {
            username: self.username.clone(),
            email: self.email.clone(),
            content: self.content.clone(),
            parent_id: self.parent,
            homepage: self.homepage_opt(),
        }
    }

    pub(crate) fn homepage_opt(&self) -> Option<String> {
        (!self.homepage.is_empty()).then(|| self.homepage.clone())
    }

    /// Everything resets except who this draft replies to
    fn clear(&mut self) {
        *self = Draft {
            parent: self.parent,
            ..Draft::default()
        };
    }
}

/// Wrap `selection` (a byte range into `content`) in an open/close tag
/// pair, as the formatting toolbar does. Returns the new text and the
/// caret position just past the inserted closing tag.
pub fn insert_tag(
    content: &str,
    selection: Range<usize>,
    tag: &str,
    attr: &str,
) -> (String, usize) {
    let open = format!("<{tag}{attr}>");
    let close = format!("</{tag}>");
    let mut out = String::with_capacity(content.len() + open.len() + close.len());
    out.push_str(&content[..selection.start]);
    out.push_str(&open);
    out.push_str(&content[selection.clone()]);
    out.push_str(&close);
    out.push_str(&content[selection.end..]);
    let caret = selection.end + open.len() + close.len();
    (out, caret)
}

/// One comment form: the draft being typed plus the messaging state around
/// it. Several forms may be open at once (the table's own form plus reply
/// forms); they share the widget's `ChallengeSession`.
pub struct CommentForm {
    pub draft: Draft,
    /// User-visible failure message, if the last attempt failed
    pub alert: Option<String>,
    /// Render-only sanitized rendition, if the user asked for one
    pub preview: Option<String>,
    /// The puzzle this form is showing
    pub challenge: Option<Challenge>,
}

impl CommentForm {
    pub fn new(parent: Option<CommentId>) -> CommentForm {
        CommentForm {
            draft: match parent {
                Some(id) => Draft::reply_to(id),
                None => Draft::default(),
            },
            alert: None,
            preview: None,
            challenge: None,
        }
    }

    /// Fetch a fresh puzzle into the form. A fetch failure leaves the form
    /// usable (the user can retry); it is logged, not surfaced.
    pub async fn load_challenge(&mut self, session: &ChallengeSession) {
        self.challenge = match session.refresh().await {
            Ok(challenge) => Some(challenge),
            Err(e) => {
                tracing::error!("failed to fetch challenge puzzle: {e}");
                None
            }
        };
    }

    /// Drive the submission pipeline for this form's draft. Returns the
    /// created comment on success so the caller can re-fetch the thread.
    /// Pass or fail, the puzzle was spent: the answer field clears and a
    /// fresh puzzle is loaded. On failure every other field survives and
    /// `alert` carries the message to show.
    pub async fn submit(
        &mut self,
        store: &dyn CommentStore,
        validator: &dyn FieldValidator,
        session: &ChallengeSession,
        normalizer: &ImageNormalizer,
    ) -> Option<Comment> {
        self.alert = None;
        let result = submit::submit(&self.draft, store, validator, session, normalizer).await;
        self.draft.challenge_answer.clear();
        self.load_challenge(session).await;
        match result {
            Ok(created) => {
                self.draft.clear();
                self.preview = None;
                Some(created)
            }
            Err(e) => {
                self.alert = Some(alert_for(&e));
                None
            }
        }
    }

    /// The preview path: validation feedback plus a render-only rendition,
    /// without ever touching the challenge. The rendition is produced even
    /// when validation rejects (the alert says so next to it).
    pub async fn show_preview(&mut self, validator: &dyn FieldValidator) {
        let preview = submit::preview(&self.draft, validator).await;
        if let Some(rejection) = &preview.rejection {
            self.alert = Some(alert_for(rejection));
        }
        self.preview = Some(preview.html);
    }
}

/// Map a pipeline failure to the message the user sees. Challenge and
/// validator rejections pass the collaborator's own wording through
/// verbatim; everything else gets fixed text.
fn alert_for(e: &SubmitError) -> String {
    match e {
        SubmitError::ChallengeRejected(reason) => reason.clone(),
        SubmitError::ValidationRejected(reason) => reason.clone(),
        SubmitError::MarkupUnbalanced => {
            String::from("The comment contains unclosed HTML tags.")
        }
        SubmitError::AttachmentTooLarge { .. } => {
            String::from("The attached file exceeds the 100 KiB limit.")
        }
        SubmitError::Picture(_) => {
            String::from("Something went wrong while processing the image. Please try again later.")
        }
        SubmitError::Network(_) => String::from("Something went wrong. Please try again later."),
    }
}
