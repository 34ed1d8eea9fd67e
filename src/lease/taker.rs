use std::{cmp::min, sync::Arc, time::Duration};

use futures_retry::FutureRetry;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::{
    error::{LeaseError, Outcome},
    util::retry::PollWhileContended,
};

use super::{broker::LeaseBroker, LeaseGrant, LeaseName};

/// Acquires a mutex, optionally polling until a deadline while it is contended.
pub(crate) struct LeaseTaker<B> {
    broker: Arc<B>,
    poll_interval: Duration,
}

impl<B: LeaseBroker> LeaseTaker<B> {
    pub(crate) fn new(broker: Arc<B>, poll_interval: Duration) -> Self {
        Self {
            broker,
            poll_interval,
        }
    }

    /// With `timeout_secs <= 0` this is exactly one lock call. Otherwise
    /// contention is retried every `min(poll_interval, timeout)` until the
    /// deadline passes, which ends in `TimedOut`. A timeout too large to put
    /// on the clock polls without a deadline.
    pub(crate) async fn take(&self, name: &LeaseName, timeout_secs: i64) -> Outcome<LeaseGrant> {
        if timeout_secs <= 0 {
            return self.broker.try_acquire(name).await;
        }

        let timeout = Duration::from_secs(timeout_secs as u64);
        let deadline = Instant::now().checked_add(timeout);
        let delay = min(self.poll_interval, timeout);
        let broker = &self.broker;
        let mut attempts = 0usize;

        let result = FutureRetry::new(
            move || {
                attempts += 1;
                let polling = attempts > 1;
                async move {
                    if polling && deadline.map_or(false, |deadline| Instant::now() > deadline) {
                        return Err(LeaseError::TimedOut {
                            name: name.clone(),
                            timeout,
                        });
                    }
                    debug!(%name, attempt = attempts, "trying to lock mutex");
                    broker.try_acquire(name).await
                }
            },
            PollWhileContended::new(delay),
        )
        .await;

        match result {
            Ok((grant, attempts)) => {
                info!(%name, attempts, "mutex locked");
                Ok(grant)
            }
            Err((err, attempts)) => {
                debug!(%name, attempts, %err, "giving up on mutex");
                Err(err)
            }
        }
    }
}
