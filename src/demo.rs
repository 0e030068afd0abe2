//! Demo mode: periodically throw away every change made through the API.
//!
//! Starting demo mode snapshots every registered service. A background
//! thread then resets all of them to that snapshot once per interval until
//! [`DemoMode::stop`] is called.

use crate::registry::Registry;
use anyhow::{Context, Result};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

pub struct DemoMode {
    stop_tx: mpsc::Sender<()>,
    worker: thread::JoinHandle<()>,
}

impl DemoMode {
    /// Snapshot `registry` and start the reset loop.
    pub fn start(registry: Arc<Registry>, interval: Duration) -> Result<Self> {
        registry.snapshot_all();
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let worker = thread::Builder::new()
            .name("brrtcrud-demo".to_string())
            .spawn(move || loop {
                match stop_rx.recv_timeout(interval) {
                    Err(mpsc::RecvTimeoutError::Timeout) => {
                        registry.reset_all();
                        debug!("Demo data reset");
                    }
                    Ok(()) | Err(mpsc::RecvTimeoutError::Disconnected) => break,
                }
            })
            .context("Failed to spawn demo mode thread")?;
        info!(interval_secs = interval.as_secs_f64(), "Demo mode enabled");
        Ok(Self { stop_tx, worker })
    }

    /// Stop resetting and wait for the background thread.
    pub fn stop(self) {
        // Worker may already be gone
        let _ = self.stop_tx.send(());
        if self.worker.join().is_err() {
            warn!("Demo mode thread panicked");
        }
        info!("Demo mode stopped");
    }
}
