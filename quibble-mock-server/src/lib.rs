//! In-memory stand-in for the widget's four remote collaborators: the
//! comment store, the field validator, the challenge service, and the
//! presence feed. Tests drive `quibble-client` against this the way the
//! real widget drives the production services.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use futures::channel::mpsc;
use quibble_client::api::{
    self, AttachmentData, Challenge, Comment, CommentFields, CommentId, Error, NewComment,
    PresenceUpdate,
};
use quibble_client::{ChallengeService, CommentStore, FieldValidator, PresenceFeed};

pub struct MockServer(Mutex<State>);

struct State {
    comments: Vec<Comment>,
    attachments: HashMap<String, AttachmentData>,
    next_id: i64,
    // challenge puzzles are single-use: verify always consumes this
    challenge_answer: Option<String>,
    challenges_issued: u64,
    banned_words: Vec<String>,
    online: Vec<String>,
    feeds: Vec<mpsc::UnboundedSender<PresenceUpdate>>,
    validate_calls: usize,
    verify_calls: usize,
    attachment_fetches: usize,
}

impl MockServer {
    pub fn new() -> MockServer {
        MockServer(Mutex::new(State {
            comments: Vec::new(),
            attachments: HashMap::new(),
            next_id: 1,
            challenge_answer: None,
            challenges_issued: 0,
            banned_words: Vec::new(),
            online: Vec::new(),
            feeds: Vec::new(),
            validate_calls: 0,
            verify_calls: 0,
            attachment_fetches: 0,
        }))
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.0.lock().expect("mock server state poisoned")
    }

    /// Answer of the puzzle currently issued, for tests that want to pass
    pub fn test_challenge_answer(&self) -> Option<String> {
        self.state().challenge_answer.clone()
    }

    pub fn test_challenges_issued(&self) -> u64 {
        self.state().challenges_issued
    }

    /// Make the validator reject any content containing `word`
    pub fn test_ban_word(&self, word: &str) {
        self.state().banned_words.push(word.to_string());
    }

    /// Seed the stored tree directly (fixed ids and timestamps)
    pub fn test_seed_comments(&self, comments: Vec<Comment>) {
        let mut state = self.state();
        state.next_id = 1_000;
        state.comments = comments;
    }

    /// Store attachment bytes under a filename, as if a past submission
    /// uploaded them
    pub fn test_store_attachment(&self, filename: &str, content_type: &str, bytes: Vec<u8>) {
        self.state().attachments.insert(
            filename.to_string(),
            AttachmentData {
                bytes,
                content_type: content_type.to_string(),
            },
        );
    }

    /// Set the viewer list and push it to every live subscriber
    pub fn test_set_online(&self, online: Vec<String>) {
        let mut state = self.state();
        state.online = online.clone();
        let update = PresenceUpdate { online };
        state
            .feeds
            .retain(|feed| feed.unbounded_send(update.clone()).is_ok());
    }

    /// Live subscriber count; closed feeds are pruned on the next push
    pub fn test_feed_count(&self) -> usize {
        self.state().feeds.len()
    }

    pub fn test_comments(&self) -> Vec<Comment> {
        self.state().comments.clone()
    }

    pub fn test_validate_calls(&self) -> usize {
        self.state().validate_calls
    }

    pub fn test_verify_calls(&self) -> usize {
        self.state().verify_calls
    }

    pub fn test_attachment_fetches(&self) -> usize {
        self.state().attachment_fetches
    }
}

impl Default for MockServer {
    fn default() -> MockServer {
        MockServer::new()
    }
}

#[async_trait]
impl CommentStore for MockServer {
    async fn fetch_comments(&self) -> Result<Vec<Comment>, Error> {
        Ok(self.state().comments.clone())
    }

    async fn post_comment(&self, new: NewComment) -> Result<Comment, Error> {
        let mut state = self.state();
        let id = CommentId(state.next_id);
        state.next_id += 1;

        let attachment = new.attachment.map(|file| {
            state.attachments.insert(
                file.filename.clone(),
                AttachmentData {
                    bytes: file.bytes,
                    content_type: file.media_type,
                },
            );
            file.filename
        });

        let comment = Comment {
            id,
            username: new.username,
            email: new.email,
            content: new.content,
            homepage: new.homepage,
            attachment,
            created_at: Utc::now(),
            replies: Vec::new(),
        };

        match new.parent_id {
            None => state.comments.push(comment.clone()),
            Some(parent_id) => match api::find_comment(&mut state.comments, parent_id) {
                Some(parent) => parent.replies.push(comment.clone()),
                None => return Err(Error::NotFound),
            },
        }
        Ok(comment)
    }

    async fn fetch_attachment(&self, filename: &str) -> Result<AttachmentData, Error> {
        let mut state = self.state();
        state.attachment_fetches += 1;
        state
            .attachments
            .get(filename)
            .cloned()
            .ok_or(Error::NotFound)
    }
}

#[async_trait]
impl FieldValidator for MockServer {
    async fn validate(&self, fields: &CommentFields) -> Result<(), Error> {
        let mut state = self.state();
        state.validate_calls += 1;
        if fields.username.trim().is_empty() {
            return Err(Error::ValidationRejected(String::from(
                "Please enter a user name.",
            )));
        }
        if !fields.email.contains('@') {
            return Err(Error::ValidationRejected(String::from(
                "That does not look like an e-mail address.",
            )));
        }
        if fields.content.trim().is_empty() {
            return Err(Error::ValidationRejected(String::from(
                "The comment is empty.",
            )));
        }
        for word in &state.banned_words {
            if fields.content.contains(word.as_str()) {
                return Err(Error::ValidationRejected(format!(
                    "The word {word:?} is not welcome here."
                )));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ChallengeService for MockServer {
    async fn fetch_challenge(&self) -> Result<Challenge, Error> {
        let mut state = self.state();
        state.challenges_issued += 1;
        let answer = format!("{:04}", state.challenges_issued);
        let svg = format!("<svg><text>{answer}</text></svg>");
        state.challenge_answer = Some(answer);
        Ok(Challenge { svg })
    }

    async fn verify_challenge(&self, answer: &str) -> Result<(), Error> {
        let mut state = self.state();
        state.verify_calls += 1;
        match state.challenge_answer.take() {
            Some(expected) if expected == answer => Ok(()),
            Some(_) => Err(Error::ChallengeRejected(String::from(
                "The characters do not match the picture.",
            ))),
            None => Err(Error::ChallengeRejected(String::from(
                "No active challenge; request a new one.",
            ))),
        }
    }
}

#[async_trait]
impl PresenceFeed for MockServer {
    async fn subscribe(&self) -> Result<mpsc::UnboundedReceiver<PresenceUpdate>, Error> {
        let mut state = self.state();
        let (sender, receiver) = mpsc::unbounded();
        // new subscribers immediately see the current viewer list
        sender
            .unbounded_send(PresenceUpdate {
                online: state.online.clone(),
            })
            .expect("receiver is still in scope");
        state.feeds.push(sender);
        Ok(receiver)
    }
}
