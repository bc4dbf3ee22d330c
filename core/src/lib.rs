//! Edge-triggered availability monitoring for a single network endpoint.
//!
//! A [`HostMonitor`] probes its [`Endpoint`] on a fixed interval from a
//! background thread and calls every registered [`Observer`] when the
//! endpoint goes from unavailable to available or back.

pub mod error;
pub mod monitor;
pub mod network;
pub mod observer;
pub mod probe;

pub use error::MonitorError;
pub use hostmon_common::{Endpoint, EndpointError, IpVersion, ProbeConfig, Protocol};
pub use monitor::HostMonitor;
pub use observer::{Observer, ObserverRegistry, StateChange};
pub use probe::{Prober, SystemProber};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
