use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub(crate) mod retry;
pub(crate) mod runnable;

/// Cancels the returned token on SIGINT or SIGTERM (Ctrl-C elsewhere).
///
/// Handlers are installed before this returns, so a signal arriving while the
/// watcher task is still unscheduled is not lost to the default disposition.
pub fn spawn_shutdown_watcher() -> CancellationToken {
    let stop = CancellationToken::new();
    let trigger = stop.clone();
    let mut termination = Termination::listen();
    tokio::spawn(async move {
        termination.recv().await;
        info!("termination requested");
        trigger.cancel();
    });
    stop
}

#[cfg(unix)]
struct Termination {
    interrupt: Option<tokio::signal::unix::Signal>,
    terminate: Option<tokio::signal::unix::Signal>,
}

#[cfg(unix)]
impl Termination {
    fn listen() -> Self {
        use tokio::signal::unix::{signal, SignalKind};

        let listen = |kind: SignalKind, label: &str| match signal(kind) {
            Ok(signal) => Some(signal),
            Err(err) => {
                warn!(%err, signal = label, "cannot listen for signal");
                None
            }
        };
        Self {
            interrupt: listen(SignalKind::interrupt(), "SIGINT"),
            terminate: listen(SignalKind::terminate(), "SIGTERM"),
        }
    }

    async fn recv(&mut self) {
        tokio::select! {
            _ = next(&mut self.interrupt) => {}
            _ = next(&mut self.terminate) => {}
        }
    }
}

/// Resolves on the next delivery; a missing or closed listener never resolves.
#[cfg(unix)]
async fn next(signal: &mut Option<tokio::signal::unix::Signal>) {
    if let Some(signal) = signal {
        if signal.recv().await.is_some() {
            return;
        }
    }
    std::future::pending::<()>().await
}

#[cfg(windows)]
struct Termination {
    ctrl_c: Option<tokio::signal::windows::CtrlC>,
}

#[cfg(windows)]
impl Termination {
    fn listen() -> Self {
        let ctrl_c = match tokio::signal::windows::ctrl_c() {
            Ok(ctrl_c) => Some(ctrl_c),
            Err(err) => {
                warn!(%err, "cannot listen for Ctrl-C");
                None
            }
        };
        Self { ctrl_c }
    }

    async fn recv(&mut self) {
        if let Some(ctrl_c) = &mut self.ctrl_c {
            if ctrl_c.recv().await.is_some() {
                return;
            }
        }
        std::future::pending::<()>().await
    }
}
