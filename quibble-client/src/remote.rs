//! Contracts for the widget's four remote collaborators. The comment
//! store, validator, and challenge verifier are black boxes behind these
//! traits; `HttpRemote` speaks to the real ones, the mock server crate
//! implements them in memory for tests.

use async_trait::async_trait;
use futures::channel::mpsc;

use crate::api::{
    AttachmentData, Challenge, Comment, CommentFields, Error, NewComment, PresenceUpdate,
};

#[async_trait]
pub trait CommentStore: Send + Sync {
    /// The whole discussion, already nested
    async fn fetch_comments(&self) -> Result<Vec<Comment>, Error>;

    /// Store a finished submission; the store assigns id and timestamp
    async fn post_comment(&self, new: NewComment) -> Result<Comment, Error>;

    /// Bytes and declared content type of a stored attachment
    async fn fetch_attachment(&self, filename: &str) -> Result<AttachmentData, Error>;
}

#[async_trait]
pub trait FieldValidator: Send + Sync {
    /// A rejection carries the validator's own human-readable reason,
    /// which is shown to the user verbatim
    async fn validate(&self, fields: &CommentFields) -> Result<(), Error>;
}

#[async_trait]
pub trait ChallengeService: Send + Sync {
    async fn fetch_challenge(&self) -> Result<Challenge, Error>;

    /// Puzzles are single-use: pass or fail, the current puzzle is spent
    async fn verify_challenge(&self, answer: &str) -> Result<(), Error>;
}

#[async_trait]
pub trait PresenceFeed: Send + Sync {
    /// Push subscription delivering the viewer list; dropping the
    /// receiver releases the slot
    async fn subscribe(&self) -> Result<mpsc::UnboundedReceiver<PresenceUpdate>, Error>;
}

pub trait Remote: CommentStore + FieldValidator + ChallengeService + PresenceFeed {}

impl<T> Remote for T where T: CommentStore + FieldValidator + ChallengeService + PresenceFeed {}
