//! reqwest implementation of the boundary traits against the comment
//! service's REST surface.

use async_trait::async_trait;
use lazy_static::lazy_static;
use reqwest::multipart;

use crate::{
    api::{AttachmentData, Challenge, Comment, CommentFields, Error, NewComment},
    remote::{ChallengeService, CommentStore, FieldValidator},
};

// No request may hang the pipeline forever; an expired request surfaces as
// a network error like any other transport failure.
const REQUEST_TIMEOUT_SECS: u64 = 30;

lazy_static! {
    static ref CLIENT: reqwest::Client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()
        .expect("building the shared http client");
}

/// One comment service instance, addressed by host
/// (e.g. `http://localhost:3000`)
pub struct HttpRemote {
    host: String,
}

#[derive(serde::Deserialize)]
struct CommentsResponse {
    comments: Vec<Comment>,
}

#[derive(serde::Serialize)]
struct VerifyRequest<'a> {
    captcha: &'a str,
}

impl HttpRemote {
    pub fn new(host: impl Into<String>) -> HttpRemote {
        HttpRemote { host: host.into() }
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/api/{}", self.host, path)
    }
}

/// Transport failures become `Error::Network`; a non-success response is
/// parsed as wire error contents, falling back on the status code when the
/// body is not ours.
async fn check(
    resp: Result<reqwest::Response, reqwest::Error>,
) -> Result<reqwest::Response, Error> {
    let resp = resp.map_err(|e| Error::Network(e.to_string()))?;
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status();
    let body = resp
        .bytes()
        .await
        .map_err(|e| Error::Network(e.to_string()))?;
    Err(Error::parse(&body).unwrap_or_else(|_| match status {
        reqwest::StatusCode::NOT_FOUND => Error::NotFound,
        _ => Error::Unknown(String::from_utf8_lossy(&body).into_owned()),
    }))
}

#[async_trait]
impl CommentStore for HttpRemote {
    async fn fetch_comments(&self) -> Result<Vec<Comment>, Error> {
        let resp = check(CLIENT.get(self.api_url("comments")).send().await).await?;
        let data: CommentsResponse = resp
            .json()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;
        Ok(data.comments)
    }

    async fn post_comment(&self, new: NewComment) -> Result<Comment, Error> {
        let mut form = multipart::Form::new()
            .text("username", new.username)
            .text("email", new.email)
            .text("content", new.content);
        if let Some(parent) = new.parent_id {
            form = form.text("parentId", parent.0.to_string());
        }
        if let Some(homepage) = new.homepage {
            form = form.text("homepage", homepage);
        }
        if let Some(file) = new.attachment {
            let part = multipart::Part::bytes(file.bytes)
                .file_name(file.filename)
                .mime_str(&file.media_type)
                .map_err(|e| Error::Network(e.to_string()))?;
            form = form.part("file", part);
        }
        let resp = check(
            CLIENT
                .post(self.api_url("comment"))
                .multipart(form)
                .send()
                .await,
        )
        .await?;
        resp.json().await.map_err(|e| Error::Network(e.to_string()))
    }

    async fn fetch_attachment(&self, filename: &str) -> Result<AttachmentData, Error> {
        let resp = check(
            CLIENT
                .get(self.api_url(&format!("commentFile/{filename}")))
                .send()
                .await,
        )
        .await?;
        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;
        Ok(AttachmentData {
            bytes: bytes.to_vec(),
            content_type,
        })
    }
}

#[async_trait]
impl FieldValidator for HttpRemote {
    async fn validate(&self, fields: &CommentFields) -> Result<(), Error> {
        check(
            CLIENT
                .post(self.api_url("validate/comment"))
                .json(fields)
                .send()
                .await,
        )
        .await?;
        Ok(())
    }
}

#[async_trait]
impl ChallengeService for HttpRemote {
    // the challenge endpoints live next to /api, not under it
    async fn fetch_challenge(&self) -> Result<Challenge, Error> {
        let resp = check(CLIENT.get(format!("{}/captcha", self.host)).send().await).await?;
        let svg = resp
            .text()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;
        Ok(Challenge { svg })
    }

    async fn verify_challenge(&self, answer: &str) -> Result<(), Error> {
        check(
            CLIENT
                .post(format!("{}/verifyCaptcha", self.host))
                .json(&VerifyRequest { captcha: answer })
                .send()
                .await,
        )
        .await?;
        Ok(())
    }
}
