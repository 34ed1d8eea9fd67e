use std::time::Duration;

use futures_retry::{ErrorHandler, RetryPolicy};
use tracing::debug;

use crate::error::LeaseError;

/// Keeps polling at a fixed cadence while the mutex is held by someone else and
/// forwards every other failure untouched. Bounding the attempts is up to the
/// caller.
pub(crate) struct PollWhileContended {
    delay: Duration,
}

impl PollWhileContended {
    pub(crate) fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl ErrorHandler<LeaseError> for PollWhileContended {
    type OutError = LeaseError;

    fn handle(&mut self, attempt: usize, e: LeaseError) -> RetryPolicy<LeaseError> {
        if e.is_contended() {
            debug!(attempt, delay = ?self.delay, "mutex contended, polling again");
            RetryPolicy::WaitRetry(self.delay)
        } else {
            RetryPolicy::ForwardError(e)
        }
    }
}
