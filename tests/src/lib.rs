//! Shared fixtures for the end-to-end tests driving `quibble-client`
//! against `quibble-mock-server`.

use std::io::Cursor;

use quibble_client::api::{Comment, CommentId};
use quibble_client::Draft;

/// A comment created `minute` minutes after a fixed epoch, so tests can
/// pin relative creation order without touching the clock
pub fn comment_at(id: i64, username: &str, minute: i64, replies: Vec<Comment>) -> Comment {
    Comment {
        id: CommentId(id),
        username: username.to_string(),
        email: format!("{username}@example.com"),
        content: String::from("hello"),
        homepage: None,
        attachment: None,
        created_at: chrono::DateTime::from_timestamp(1_700_000_000 + minute * 60, 0)
            .expect("valid timestamp"),
        replies,
    }
}

/// A draft that passes the mock validator, with the given body
pub fn valid_draft(content: &str) -> Draft {
    Draft {
        username: String::from("ada"),
        email: String::from("ada@example.com"),
        content: content.to_string(),
        ..Draft::default()
    }
}

/// Single-color PNG of the given dimensions
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
        width,
        height,
        image::Rgb([30, 90, 160]),
    ));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png)
        .expect("encoding fixture png");
    out.into_inner()
}

pub fn png_dimensions(bytes: &[u8]) -> (u32, u32) {
    let img = image::load_from_memory(bytes).expect("decoding fixture png");
    (img.width(), img.height())
}
