//! # Host Monitor
//!
//! Binds an [`Endpoint`], an interval and a set of observers to one background
//! probe loop.
//!
//! The loop starts as soon as the monitor is created and runs until
//! [`HostMonitor::stop`] is called or the monitor is dropped. Both block until
//! the loop has finished, including a probe that is still in flight and any
//! notification it triggers. Once stopped, a monitor cannot be restarted.

use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle, ThreadId};
use std::time::Duration;

use hostmon_common::Endpoint;
use tracing::error;

use crate::error::MonitorError;
use crate::observer::{Observer, ObserverRegistry};
use crate::probe::{Prober, SystemProber};

mod runner;

use runner::{MonitorLoop, MonitorState};

/// Periodically checks one endpoint and tells observers when its availability flips.
///
/// Not `Clone`: the monitor is the single owner of its background thread.
pub struct HostMonitor {
    endpoint: Endpoint,
    interval: Duration,
    observers: Arc<ObserverRegistry>,
    state: Arc<MonitorState>,
    worker_id: ThreadId,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl HostMonitor {
    /// Starts monitoring `endpoint` with the native [`SystemProber`].
    pub fn start(endpoint: Endpoint, interval: Duration) -> Result<Self, MonitorError> {
        Self::start_with_prober(endpoint, interval, Arc::new(SystemProber::default()))
    }

    /// Starts monitoring `endpoint` with a caller supplied prober.
    ///
    /// Returns immediately; the first probe runs in the background.
    pub fn start_with_prober(
        endpoint: Endpoint,
        interval: Duration,
        prober: Arc<dyn Prober>,
    ) -> Result<Self, MonitorError> {
        if interval.is_zero() {
            return Err(MonitorError::ZeroInterval);
        }

        let observers: Arc<ObserverRegistry> = Arc::new(ObserverRegistry::new());
        let state: Arc<MonitorState> = Arc::new(MonitorState::default());

        let worker: JoinHandle<()> = MonitorLoop {
            endpoint: endpoint.clone(),
            interval,
            prober,
            observers: observers.clone(),
            state: state.clone(),
        }
        .spawn()?;

        Ok(Self {
            endpoint,
            interval,
            observers,
            state,
            worker_id: worker.thread().id(),
            worker: Mutex::new(Some(worker)),
        })
    }

    pub fn add_observer(&self, observer: Arc<dyn Observer>) {
        self.observers.add(observer);
    }

    /// Removes every registration of `observer`.
    ///
    /// Once this returns, the observer is not notified for any probe that
    /// starts afterwards.
    pub fn remove_observer<O>(&self, observer: &Arc<O>)
    where
        O: Observer + ?Sized,
    {
        self.observers.remove(observer);
    }

    /// Result of the most recently completed probe. `false` until one succeeds.
    pub fn is_available(&self) -> bool {
        self.state.is_available()
    }

    pub fn is_running(&self) -> bool {
        !self.state.is_shutdown_requested()
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Stops the background loop and waits for it to finish.
    ///
    /// Only the call that actually requested the stop returns `Ok`; any later
    /// or concurrent call returns [`MonitorError::AlreadyStopped`], but only
    /// once the loop has finished. Called from inside one of this monitor's
    /// observers, it requests the stop and returns without waiting; the owner
    /// still waits for the loop on its next `stop` or on drop.
    pub fn stop(&self) -> Result<(), MonitorError> {
        let requested: bool = self.state.request_shutdown();

        if thread::current().id() != self.worker_id {
            // Held across the join so a concurrent caller waits for it too.
            let mut worker = self.worker.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(handle) = worker.take() {
                if handle.join().is_err() {
                    error!("Monitor thread for {} panicked", self.endpoint);
                }
            }
        }

        if requested {
            Ok(())
        } else {
            Err(MonitorError::AlreadyStopped(self.endpoint.target()))
        }
    }
}

impl Drop for HostMonitor {
    fn drop(&mut self) {
        let _ = self.stop();
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
