//! The **probe abstraction**: one reachability check against one [`Endpoint`].
//!
//! The monitor only ever talks to the [`Prober`] trait. Concrete strategies live
//! in [`crate::network`] and are selected per [`Protocol`](hostmon_common::Protocol) by
//! [`SystemProber`].
//!
//! Ordinary network failure (timeouts, refused connections, unresolved hosts,
//! missing raw-socket privileges) is reported as `false`, never as an error.

use std::sync::Arc;

use async_trait::async_trait;
use hostmon_common::{Endpoint, ProbeConfig};

use crate::network::icmp::IcmpProber;
use crate::network::tcp::TcpProber;

#[async_trait]
pub trait Prober: Send + Sync {
    /// Returns `true` if `endpoint` answered.
    async fn probe(&self, endpoint: &Endpoint) -> bool;
}

#[async_trait]
impl<P> Prober for Arc<P>
where
    P: Prober + ?Sized,
{
    async fn probe(&self, endpoint: &Endpoint) -> bool {
        self.as_ref().probe(endpoint).await
    }
}

/// Native prober for every [`Protocol`].
pub struct SystemProber {
    tcp: TcpProber,
    icmp: IcmpProber,
}

impl SystemProber {
    pub fn new(config: ProbeConfig) -> Self {
        Self {
            tcp: TcpProber::new(config),
            icmp: IcmpProber::new(config),
        }
    }
}

impl Default for SystemProber {
    fn default() -> Self {
        Self::new(ProbeConfig::default())
    }
}

#[async_trait]
impl Prober for SystemProber {
    async fn probe(&self, endpoint: &Endpoint) -> bool {
        let prober: &dyn Prober = if endpoint.protocol().is_icmp() {
            &self.icmp
        } else {
            &self.tcp
        };

        prober.probe(endpoint).await
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
