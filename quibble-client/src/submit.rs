//! The gate a draft passes before it may leave the client: challenge
//! verification, remote field validation, attachment normalization, markup
//! balance, sanitization, then the actual store call. Stages run strictly
//! in that order and the first failure aborts the whole attempt.

use crate::{
    api::{self, Error, NewAttachment},
    challenge::ChallengeSession,
    form::Draft,
    markup,
    picture::{ImageNormalizer, PictureError},
    remote::{CommentStore, FieldValidator},
};

/// Hard ceiling for `text/*` attachments: 100 KiB, no truncation
pub const MAX_TEXT_ATTACHMENT_BYTES: u64 = 100 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// Wrong puzzle answer; the puzzle is spent and a fresh one is needed
    #[error("{0}")]
    ChallengeRejected(String),

    /// The validator's reason, surfaced to the user verbatim
    #[error("{0}")]
    ValidationRejected(String),

    #[error("comment body contains unbalanced markup")]
    MarkupUnbalanced,

    #[error("attachment is {size} bytes, over the {limit} byte limit")]
    AttachmentTooLarge { size: u64, limit: u64 },

    /// The original file is never submitted in place of a failed resize
    #[error("image processing failed: {0}")]
    Picture(#[from] PictureError),

    #[error("network error: {0}")]
    Network(String),
}

impl From<Error> for SubmitError {
    fn from(e: Error) -> SubmitError {
        match e {
            Error::ChallengeRejected(reason) => SubmitError::ChallengeRejected(reason),
            Error::ValidationRejected(reason) => SubmitError::ValidationRejected(reason),
            Error::Network(reason) => SubmitError::Network(reason),
            e => SubmitError::Network(e.to_string()),
        }
    }
}

/// Run the whole pipeline for one draft. On success the created comment
/// comes back so the caller can re-fetch the thread; on failure the draft
/// is untouched (the form layer owns clearing the spent challenge answer).
pub async fn submit(
    draft: &Draft,
    store: &dyn CommentStore,
    validator: &dyn FieldValidator,
    session: &ChallengeSession,
    normalizer: &ImageNormalizer,
) -> Result<api::Comment, SubmitError> {
    tracing::debug!("verifying challenge answer");
    session.verify(&draft.challenge_answer).await?;

    tracing::debug!("validating draft fields");
    validator.validate(&draft.fields()).await?;

    let attachment = match &draft.attachment {
        None => None,
        Some(file) => {
            tracing::debug!(filename = %file.filename, "normalizing attachment");
            Some(normalize_attachment(file, normalizer)?)
        }
    };

    if !markup::is_balanced(&draft.content) {
        return Err(SubmitError::MarkupUnbalanced);
    }

    // what goes over the wire is the sanitized body, never the raw one
    let content = markup::sanitize(&draft.content);

    tracing::debug!("submitting comment");
    let created = store
        .post_comment(api::NewComment {
            username: draft.username.clone(),
            email: draft.email.clone(),
            content,
            parent_id: draft.parent,
            homepage: draft.homepage_opt(),
            attachment,
        })
        .await?;
    Ok(created)
}

fn normalize_attachment(
    file: &NewAttachment,
    normalizer: &ImageNormalizer,
) -> Result<NewAttachment, SubmitError> {
    match file.media_type.parse::<mime::Mime>() {
        Ok(m) if m.type_() == mime::IMAGE => {
            let bytes = normalizer.resize(&file.bytes, &file.media_type)?;
            Ok(NewAttachment {
                filename: file.filename.clone(),
                media_type: file.media_type.clone(),
                bytes,
            })
        }
        Ok(m) if m.type_() == mime::TEXT => {
            let size = file.bytes.len() as u64;
            if size > MAX_TEXT_ATTACHMENT_BYTES {
                return Err(SubmitError::AttachmentTooLarge {
                    size,
                    limit: MAX_TEXT_ATTACHMENT_BYTES,
                });
            }
            Ok(file.clone())
        }
        _ => Ok(file.clone()),
    }
}

/// Result of the preview path: remote validation then sanitization, with
/// the challenge left untouched
pub struct Preview {
    /// The validator's rejection, if any; the rendition is produced anyway
    pub rejection: Option<SubmitError>,
    /// Render-only sanitized body
    pub html: String,
}

pub async fn preview(draft: &Draft, validator: &dyn FieldValidator) -> Preview {
    let rejection = match validator.validate(&draft.fields()).await {
        Ok(()) => None,
        Err(e) => Some(SubmitError::from(e)),
    };
    Preview {
        rejection,
        html: markup::sanitize(&draft.content),
    }
}
