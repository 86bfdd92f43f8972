mod attachment;
pub use attachment::{resolve_attachment, AttachmentCache, AttachmentHandle};

mod challenge;
pub use challenge::ChallengeSession;

mod feed;
pub use feed::watch_presence;

mod form;
pub use form::{insert_tag, CommentForm, Draft};

mod http;
pub use http::HttpRemote;

mod markup;
pub use markup::{is_balanced, sanitize};

mod order;
pub use order::{Order, SortDirection, SortField};

mod picture;
pub use picture::{ImageNormalizer, PictureError};

mod remote;
pub use remote::{ChallengeService, CommentStore, FieldValidator, PresenceFeed, Remote};

mod submit;
pub use submit::{preview, submit, Preview, SubmitError, MAX_TEXT_ATTACHMENT_BYTES};

mod thread;
pub use thread::{ThreadView, DEFAULT_PAGE_SIZE};

mod widget;
pub use widget::CommentWidget;

pub mod api {
    pub use quibble_api::*;
}
