use anyhow::{anyhow, Context};
use serde_json::json;

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Unknown error: {0}")]
    Unknown(String),

    #[error("{0}")]
    ChallengeRejected(String),

    #[error("{0}")]
    ValidationRejected(String),

    #[error("Not found")]
    NotFound,

    /// Transport-level failure; never produced by a collaborator, only by
    /// the client talking to one
    #[error("Network error: {0}")]
    Network(String),
}

impl Error {
    pub fn status_code(&self) -> http::StatusCode {
        use http::StatusCode;
        match self {
            Error::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::ChallengeRejected(_) => StatusCode::BAD_REQUEST,
            Error::ValidationRejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::Network(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn contents(&self) -> Vec<u8> {
        serde_json::to_vec(&match self {
            Error::Unknown(msg) => json!({
                "message": msg,
                "type": "unknown",
            }),
            Error::ChallengeRejected(msg) => json!({
                "message": msg,
                "type": "challenge-rejected",
            }),
            Error::ValidationRejected(msg) => json!({
                "message": msg,
                "type": "validation-rejected",
            }),
            Error::NotFound => json!({
                "message": "not found",
                "type": "not-found",
            }),
            Error::Network(msg) => json!({
                "message": msg,
                "type": "network",
            }),
        })
        .expect("serializing error contents")
    }

    pub fn parse(body: &[u8]) -> anyhow::Result<Error> {
        let data: serde_json::Value =
            serde_json::from_slice(body).context("parsing error contents")?;
        let message = || {
            data.get("message")
                .and_then(|msg| msg.as_str())
                .unwrap_or("")
                .to_string()
        };
        Ok(
            match data
                .get("type")
                .and_then(|t| t.as_str())
                .ok_or_else(|| anyhow!("error type is not a string"))?
            {
                "unknown" => Error::Unknown(message()),
                "challenge-rejected" => Error::ChallengeRejected(message()),
                "validation-rejected" => Error::ValidationRejected(message()),
                "not-found" => Error::NotFound,
                "network" => Error::Network(message()),
                _ => return Err(anyhow!("error contents has unknown type")),
            },
        )
    }
}
