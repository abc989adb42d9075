//! Signal handling for live runs. A spawned task waits for SIGINT (and
//! SIGTERM on unix) and raises a shared flag; the execution loop checks the
//! flag between sample launches. Raising is idempotent, so a second signal
//! while the first is being handled does nothing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared set-once flag recording that a termination signal arrived.
#[derive(Debug, Clone, Default)]
pub struct InterruptFlag(Arc<AtomicBool>);

impl InterruptFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Spawns the signal listener. Live mode only; replay has no lifecycle to
/// interrupt and installs nothing.
pub fn install(flag: InterruptFlag) {
    tokio::spawn(async move {
        wait_for_termination().await;
        tracing::info!("termination signal received, interrupting run");
        flag.raise();
    });
}

#[cfg(unix)]
async fn wait_for_termination() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut term) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = term.recv() => {}
            }
        }
        Err(e) => {
            tracing::warn!("cannot listen for SIGTERM: {e}");
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_termination() {
    let _ = tokio::signal::ctrl_c().await;
}
