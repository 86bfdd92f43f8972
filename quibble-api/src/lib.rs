use chrono::Utc;

mod error;
pub use error::Error;

pub type Time = chrono::DateTime<Utc>;

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct CommentId(pub i64);

/// One node of the discussion tree, as served by the comment store.
///
/// Immutable on the client: the tree only ever changes by re-fetching it
/// whole after a successful submission.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    pub username: String,
    pub email: String,

    /// Restricted-HTML body; sanitized before it ever reached the store
    pub content: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,

    /// Stored filename of the attachment, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<String>,

    pub created_at: Time,

    /// Child comments; each one's conceptual parent id is this node's id
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub replies: Vec<Comment>,
}

pub fn find_comment(comments: &mut Vec<Comment>, id: CommentId) -> Option<&mut Comment> {
    for c in comments.iter_mut() {
        if c.id == id {
            return Some(c);
        }
        if let Some(res) = find_comment(&mut c.replies, id) {
            return Some(res);
        }
    }
    None
}

/// A comment submission, as handed to the store once the pipeline let it
/// through. `content` is the sanitized body, never the raw draft text.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    pub username: String,
    pub email: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<CommentId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<NewAttachment>,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAttachment {
    pub filename: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

/// The semantic fields the remote validator rules on
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentFields {
    pub username: String,
    pub email: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<CommentId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
}

/// A challenge puzzle as issued by the challenge service: an opaque
/// renderable (the original service serves inline SVG text). Single-use.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Challenge {
    pub svg: String,
}

/// A stored attachment's bytes plus the content type declared by the store
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AttachmentData {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Latest value of the live-presence feed
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct PresenceUpdate {
    pub online: Vec<String>,
}
