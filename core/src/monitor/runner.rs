//! The background probe loop behind every [`HostMonitor`](super::HostMonitor).
//!
//! Lifecycle: `Running` until a stop is requested, then `Stopped` for good.
//! A stop never interrupts a probe already in flight; it only cuts short the
//! interval wait and prevents the next cycle.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, mpsc};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use hostmon_common::Endpoint;
use tokio::sync::Notify;
use tracing::{debug, error, info};

use crate::observer::{ObserverRegistry, StateChange};
use crate::probe::Prober;

/// State shared between the loop and the owning monitor.
///
/// `available` is written by the loop only; `shutdown` by the owner only.
#[derive(Default)]
pub(crate) struct MonitorState {
    available: AtomicBool,
    shutdown: AtomicBool,
    wake: Notify,
}

impl MonitorState {
    pub(crate) fn is_available(&self) -> bool {
        self.available.load(Ordering::Acquire)
    }

    pub(crate) fn is_shutdown_requested(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }

    /// Flags the loop for shutdown and wakes it if it is waiting.
    ///
    /// Returns `false` if shutdown had already been requested.
    pub(crate) fn request_shutdown(&self) -> bool {
        if self.shutdown.swap(true, Ordering::AcqRel) {
            return false;
        }
        // Stores a permit when nobody waits yet, so a stop issued mid-probe
        // still ends the following wait immediately.
        self.wake.notify_one();
        true
    }

    /// Records the latest probe result, returning the previous one.
    fn record(&self, available: bool) -> bool {
        self.available.swap(available, Ordering::AcqRel)
    }
}

pub(crate) struct MonitorLoop {
    pub(crate) endpoint: Endpoint,
    pub(crate) interval: Duration,
    pub(crate) prober: Arc<dyn Prober>,
    pub(crate) observers: Arc<ObserverRegistry>,
    pub(crate) state: Arc<MonitorState>,
}

impl MonitorLoop {
    /// Starts the loop on a dedicated thread with its own single-threaded runtime.
    ///
    /// The runtime is built and dropped on that thread, never on the caller's,
    /// which may itself be inside a runtime. Returns once the runtime is up.
    pub(crate) fn spawn(self) -> io::Result<JoinHandle<()>> {
        let (ready_tx, ready_rx) = mpsc::sync_channel::<io::Result<()>>(1);

        let handle: JoinHandle<()> = thread::Builder::new()
            .name(format!("hostmon {}", self.endpoint.target()))
            .spawn(move || {
                let runtime = match tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                {
                    Ok(runtime) => runtime,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                let _ = ready_tx.send(Ok(()));
                runtime.block_on(self.run());
            })?;

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(handle),
            Ok(Err(e)) => {
                let _ = handle.join();
                Err(e)
            }
            Err(_) => {
                let _ = handle.join();
                Err(io::Error::other("monitor thread exited before starting"))
            }
        }
    }

    async fn run(self) {
        info!("Monitoring {} every {:?}", self.endpoint, self.interval);

        while !self.state.is_shutdown_requested() {
            self.cycle().await;

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = self.state.wake.notified() => {}
            }
        }

        info!("Stopped monitoring {}", self.endpoint);
    }

    /// One probe, plus a notification if availability flipped.
    async fn cycle(&self) {
        let available: bool = self.probe().await;
        debug!(
            "{} is {}",
            self.endpoint,
            if available { "reachable" } else { "unreachable" }
        );

        if self.state.record(available) == available {
            return;
        }

        info!(
            available,
            "{} became {}",
            self.endpoint,
            if available { "available" } else { "unavailable" }
        );

        let change = StateChange {
            endpoint: self.endpoint.clone(),
            interval: self.interval,
            available,
        };
        self.observers.notify_all(&change);
    }

    /// Runs the prober as its own task so a panicking prober reads as
    /// "unavailable" instead of killing the loop.
    async fn probe(&self) -> bool {
        let prober: Arc<dyn Prober> = self.prober.clone();
        let endpoint: Endpoint = self.endpoint.clone();

        match tokio::spawn(async move { prober.probe(&endpoint).await }).await {
            Ok(available) => available,
            Err(e) => {
                error!("Prober for {} failed: {}", self.endpoint, e);
                false
            }
        }
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
