//! Key-rotating dispatcher.
//!
//! A logical request is tried against the key under the cursor. A 429 rotates
//! the cursor and tries the next key; any other failure is returned as-is.
//! Each key is tried at most once per logical request, and the cursor is kept
//! between requests so rate-limited keys are not retried first next time.

use std::future::Future;

use tracing::{debug, warn};

use crate::llm_client::key_pool::KeyPool;
use crate::llm_client::LlmError;

/// Classified failure of a single attempt.
#[derive(Debug)]
pub enum FailureKind {
    /// Upstream answered 429 for this key.
    RateLimited,
    Other(LlmError),
}

/// Result of one attempt against one key.
#[derive(Debug)]
pub enum RequestOutcome<T> {
    Success(T),
    Failure(FailureKind),
}

impl<T> RequestOutcome<T> {
    pub fn rate_limited() -> Self {
        RequestOutcome::Failure(FailureKind::RateLimited)
    }

    pub fn other(error: LlmError) -> Self {
        RequestOutcome::Failure(FailureKind::Other(error))
    }
}

/// Owns the key pool and its rotation cursor.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    pool: KeyPool,
}

impl Dispatcher {
    pub fn new(pool: KeyPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &KeyPool {
        &self.pool
    }

    /// Runs `attempt` with successive keys until one succeeds, a non-rate-limit
    /// failure occurs, or every key has been rate limited once.
    ///
    /// `attempt` receives an owned copy of the key so the returned future does
    /// not borrow the pool.
    pub async fn dispatch<T, F, Fut>(&mut self, mut attempt: F) -> Result<T, LlmError>
    where
        F: FnMut(String) -> Fut,
        Fut: Future<Output = RequestOutcome<T>>,
    {
        if self.pool.is_empty() {
            return Err(LlmError::NoCredentials);
        }
        let total = self.pool.len();

        for attempt_no in 1..=total {
            let slot = self.pool.cursor();
            let key = self
                .pool
                .current()
                .map(str::to_string)
                .ok_or(LlmError::NoCredentials)?;

            debug!(slot, attempt = attempt_no, total, "Dispatching completion request");

            match attempt(key).await {
                RequestOutcome::Success(value) => {
                    debug!(slot, attempts = attempt_no, "Completion request succeeded");
                    return Ok(value);
                }
                RequestOutcome::Failure(FailureKind::RateLimited) => {
                    self.pool.advance();
                    warn!(
                        slot,
                        next_slot = self.pool.cursor(),
                        "Key rate limited, rotating to next key"
                    );
                }
                RequestOutcome::Failure(FailureKind::Other(e)) => {
                    warn!(slot, "Completion request failed without rotation: {e}");
                    return Err(e);
                }
            }
        }

        Err(LlmError::ExhaustedPool { attempts: total })
    }
}
