use std::time::Duration;

use colored::*;
use hostmon_common::{Endpoint, ProbeConfig};
use hostmon_core::{Prober, SystemProber};
use tracing::{info, warn};

use super::TargetArgs;

/// Probes once and reports whether the endpoint answered.
pub async fn check(target: &TargetArgs, timeout: u64) -> anyhow::Result<bool> {
    let endpoint: Endpoint = target.to_endpoint()?;
    let prober = SystemProber::new(ProbeConfig::with_timeout(Duration::from_secs(timeout)));

    let available: bool = prober.probe(&endpoint).await;

    if available {
        info!("{} answered", endpoint.to_string().bold());
    } else {
        warn!("{} did not answer within {}s", endpoint.to_string().bold(), timeout);
    }

    Ok(available)
}
