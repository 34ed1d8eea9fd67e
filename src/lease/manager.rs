use std::{sync::Arc, time::Duration};

use bytes::Bytes;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::{
    config::ClientConfig,
    error::{ConfigError, Outcome},
    interface::report::Reporter,
};

use super::{
    broker::{HttpLeaseBroker, LeaseBroker},
    renewer::{LeaseRenewer, RenewalExit},
    taker::LeaseTaker,
    LeaseGrant, LeaseHandle, LeaseName, LeaseToken,
};

/// Entry point for every lease operation of one command invocation.
pub struct LeaseManager<B> {
    broker: Arc<B>,
    lease_taker: LeaseTaker<B>,
    renew_interval: Duration,
}

impl LeaseManager<HttpLeaseBroker> {
    pub fn connect(config: &ClientConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(Arc::new(HttpLeaseBroker::new(config)?), config))
    }
}

impl<B: LeaseBroker> LeaseManager<B> {
    pub fn new(broker: Arc<B>, config: &ClientConfig) -> Self {
        Self {
            lease_taker: LeaseTaker::new(broker.clone(), config.poll_interval),
            broker,
            renew_interval: config.renew_interval,
        }
    }

    /// `timeout_secs <= 0` is a single attempt, anything larger polls until
    /// the mutex is free or the timeout is used up.
    pub async fn acquire(&self, name: &LeaseName, timeout_secs: i64) -> Outcome<LeaseGrant> {
        self.lease_taker.take(name, timeout_secs).await
    }

    pub async fn inspect(&self, name: &LeaseName) -> Outcome<Bytes> {
        self.broker.inspect(name).await
    }

    pub async fn renew(&self, name: &LeaseName, token: &LeaseToken) -> Outcome<LeaseGrant> {
        let result = self.broker.renew(name, token).await;
        if let Err(err) = &result {
            warn!(%name, %err, "refresh rejected");
        }
        result
    }

    pub async fn release(&self, name: &LeaseName, token: &LeaseToken) -> Outcome<Bytes> {
        let result = self.broker.release(name, token).await;
        match &result {
            Ok(_) => info!(%name, "mutex released"),
            Err(err) => warn!(%name, %err, "release rejected"),
        }
        result
    }

    /// Keeps `handle` alive until `stop` fires or a renewal is rejected.
    pub async fn auto_renew<R: Reporter>(
        &self,
        handle: LeaseHandle,
        reporter: R,
        stop: CancellationToken,
    ) -> RenewalExit {
        info!(name = %handle.name(), interval = ?self.renew_interval, "auto-refresh started");
        LeaseRenewer::new(self.broker.clone(), reporter, handle, self.renew_interval)
            .run(stop)
            .await
    }
}
