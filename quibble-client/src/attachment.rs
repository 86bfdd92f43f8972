use std::collections::HashMap;

use crate::{api::AttachmentData, remote::CommentStore};

/// What a rendered comment can do with its attachment
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AttachmentHandle {
    /// Locally displayable image; the widget keys its lightbox on the
    /// attachment filename so re-opening never re-fetches
    Image { bytes: Vec<u8>, media_type: String },
    /// Downloadable file offered under its original name
    Download { filename: String, bytes: Vec<u8> },
}

/// Fetch a stored attachment and classify it by the content type the store
/// declares. Anything unexpected (missing file, transport failure, a
/// content type that is neither image nor text) degrades to `None`: a
/// comment without its attachment, never a broken page. Callers render
/// per node and may drop the future if the node goes away.
pub async fn resolve_attachment(
    store: &dyn CommentStore,
    filename: &str,
) -> Option<AttachmentHandle> {
    let AttachmentData {
        bytes,
        content_type,
    } = match store.fetch_attachment(filename).await {
        Ok(data) => data,
        Err(e) => {
            tracing::error!(filename, "failed fetching attachment: {e}");
            return None;
        }
    };
    let mime_type = match content_type.parse::<mime::Mime>() {
        Ok(m) => m,
        Err(_) => {
            tracing::error!(filename, %content_type, "unparseable attachment content type");
            return None;
        }
    };
    if mime_type.type_() == mime::IMAGE {
        Some(AttachmentHandle::Image {
            bytes,
            media_type: content_type,
        })
    } else if mime_type.type_() == mime::TEXT {
        Some(AttachmentHandle::Download {
            filename: filename.to_string(),
            bytes,
        })
    } else {
        tracing::error!(filename, %content_type, "unhandled attachment content type");
        None
    }
}

/// Per-widget memo of resolved handles, keyed by filename. Only successful
/// resolutions are cached; a missing attachment is retried on the next
/// render pass.
#[derive(Default)]
pub struct AttachmentCache {
    handles: HashMap<String, AttachmentHandle>,
}

impl AttachmentCache {
    pub fn new() -> AttachmentCache {
        AttachmentCache::default()
    }

    pub fn get(&self, filename: &str) -> Option<&AttachmentHandle> {
        self.handles.get(filename)
    }

    pub async fn resolve(
        &mut self,
        store: &dyn CommentStore,
        filename: &str,
    ) -> Option<&AttachmentHandle> {
        if !self.handles.contains_key(filename) {
            if let Some(handle) = resolve_attachment(store, filename).await {
                self.handles.insert(filename.to_string(), handle);
            }
        }
        self.handles.get(filename)
    }
}
