use std::time::Duration;

use async_trait::async_trait;
use hostmon_common::{Endpoint, ProbeConfig};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, error};

use crate::probe::Prober;

/// Checks a TCP endpoint by completing a handshake.
///
/// Every address the host resolves to is tried in turn; the whole attempt,
/// resolution included, is bounded by the configured timeout.
pub struct TcpProber {
    timeout: Duration,
}

impl TcpProber {
    pub fn new(config: ProbeConfig) -> Self {
        Self {
            timeout: config.timeout,
        }
    }
}

#[async_trait]
impl Prober for TcpProber {
    async fn probe(&self, endpoint: &Endpoint) -> bool {
        let Some(port) = endpoint.port() else {
            error!("TCP prober cannot check {endpoint}: no port");
            return false;
        };

        match timeout(self.timeout, TcpStream::connect((endpoint.host(), port))).await {
            Ok(Ok(_stream)) => true,
            Ok(Err(e)) => {
                debug!("TCP connect to {} failed: {}", endpoint.target(), e);
                false
            }
            Err(_elapsed) => {
                debug!("TCP connect to {} timed out after {:?}", endpoint.target(), self.timeout);
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
