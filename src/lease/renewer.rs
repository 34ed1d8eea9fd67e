use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use bytes::Bytes;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::{
    error::{LeaseError, Outcome},
    interface::report::Reporter,
    util::runnable::{run_with_fixed_delay, PeriodicRunnable},
};

use super::{broker::LeaseBroker, LeaseHandle};

/// How an auto-renewal session ended.
#[derive(Debug)]
pub enum RenewalExit {
    /// Stop was requested and the lease was handed back.
    Released(Bytes),
    /// Stop was requested but the server refused or never saw the release.
    ReleaseFailed(LeaseError),
    /// A renewal was rejected; the lease is gone and nothing was released.
    RenewalFailed(LeaseError),
}

impl RenewalExit {
    pub fn is_success(&self) -> bool {
        matches!(self, RenewalExit::Released(_))
    }
}

/// Keeps a single lease alive until told to stop.
pub(crate) struct LeaseRenewer<B, R> {
    broker: Arc<B>,
    reporter: R,
    handle: LeaseHandle,
    renew_interval: Duration,
}

impl<B: LeaseBroker, R: Reporter> LeaseRenewer<B, R> {
    pub(crate) fn new(
        broker: Arc<B>,
        reporter: R,
        handle: LeaseHandle,
        renew_interval: Duration,
    ) -> Self {
        Self {
            broker,
            reporter,
            handle,
            renew_interval,
        }
    }

    /// Renews every `renew_interval` until a renewal fails or `stop` fires.
    ///
    /// `stop` only pre-empts the wait between renewals. A renewal that is
    /// already on the wire finishes first, so the release is always the last
    /// call this lease sees.
    pub(crate) async fn run(mut self, stop: CancellationToken) -> RenewalExit {
        let interval = self.renew_interval;
        if let Err(err) = run_with_fixed_delay(&mut self, interval, &stop).await {
            warn!(name = %self.handle.name(), %err, "could not refresh anymore");
            return RenewalExit::RenewalFailed(err);
        }

        let name = self.handle.name();
        match self.broker.release(name, self.handle.token()).await {
            Ok(body) => {
                info!(%name, "mutex released");
                RenewalExit::Released(body)
            }
            Err(err) => {
                warn!(%name, %err, "release on shutdown failed");
                RenewalExit::ReleaseFailed(err)
            }
        }
    }
}

#[async_trait]
impl<B: LeaseBroker, R: Reporter> PeriodicRunnable for LeaseRenewer<B, R> {
    type Error = LeaseError;

    async fn run_once(&mut self) -> Outcome<()> {
        let grant = self
            .broker
            .renew(self.handle.name(), self.handle.token())
            .await?;
        self.handle.refresh(&grant);
        info!(
            name = %self.handle.name(),
            expires_at = ?self.handle.expires_at(),
            "mutex refreshed"
        );
        self.reporter.renewed(&self.handle, &grant);
        Ok(())
    }
}
