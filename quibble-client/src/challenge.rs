use std::sync::{Arc, Mutex};

use crate::{
    api::{Challenge, Error},
    remote::ChallengeService,
};

/// The one challenge puzzle a widget instance shows, passed explicitly to
/// every form that shares it instead of living in ambient state. Verifying
/// any draft's answer spends the puzzle for every open form on that
/// widget; separate widget instances get separate sessions and never
/// cross-invalidate.
pub struct ChallengeSession {
    service: Arc<dyn ChallengeService>,
    current: Mutex<Option<Challenge>>,
}

impl ChallengeSession {
    pub fn new(service: Arc<dyn ChallengeService>) -> ChallengeSession {
        ChallengeSession {
            service,
            current: Mutex::new(None),
        }
    }

    /// The puzzle currently on display, if one has been fetched
    pub fn current(&self) -> Option<Challenge> {
        self.current
            .lock()
            .expect("challenge state poisoned")
            .clone()
    }

    /// Fetch a fresh puzzle and make it the displayed one
    pub async fn refresh(&self) -> Result<Challenge, Error> {
        let challenge = self.service.fetch_challenge().await?;
        *self.current.lock().expect("challenge state poisoned") = Some(challenge.clone());
        Ok(challenge)
    }

    /// Submit an answer. Puzzles are single-use: the displayed puzzle is
    /// spent whatever the outcome, so callers re-fetch after any attempt.
    pub async fn verify(&self, answer: &str) -> Result<(), Error> {
        self.current
            .lock()
            .expect("challenge state poisoned")
            .take();
        self.service.verify_challenge(answer).await
    }
}
