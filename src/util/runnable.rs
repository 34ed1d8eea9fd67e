use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Waits `delay`, runs once, and repeats until either a run fails or `stop`
/// fires. Only the wait is cancellable; a run in progress always completes.
pub(crate) async fn run_with_fixed_delay<T: PeriodicRunnable>(
    runnable: &mut T,
    delay: Duration,
    stop: &CancellationToken,
) -> Result<(), T::Error> {
    loop {
        tokio::select! {
            biased;
            _ = stop.cancelled() => return Ok(()),
            _ = tokio::time::sleep(delay) => {}
        }

        runnable.run_once().await?;
    }
}

#[async_trait]
pub(crate) trait PeriodicRunnable: Send {
    type Error: Send;

    async fn run_once(&mut self) -> Result<(), Self::Error>;
}
