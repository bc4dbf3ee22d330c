use std::sync::Arc;
use std::time::Duration;

use colored::*;
use hostmon_common::{Endpoint, ProbeConfig};
use hostmon_core::{HostMonitor, StateChange, SystemProber};
use tracing::{info, warn};

use super::TargetArgs;

pub async fn watch(target: &TargetArgs, interval: u64, timeout: u64) -> anyhow::Result<()> {
    let endpoint: Endpoint = target.to_endpoint()?;
    let prober = SystemProber::new(ProbeConfig::with_timeout(Duration::from_secs(timeout)));

    let monitor: HostMonitor =
        HostMonitor::start_with_prober(endpoint, Duration::from_secs(interval), Arc::new(prober))?;
    monitor.add_observer(Arc::new(report_change));

    info!("Watching {}, press Ctrl-C to stop", monitor.endpoint().to_string().bold());
    tokio::signal::ctrl_c().await?;

    // Joining the worker blocks; keep it off the async runtime.
    tokio::task::spawn_blocking(move || monitor.stop()).await??;
    Ok(())
}

fn report_change(change: &StateChange) {
    let target: ColoredString = change.endpoint.target().bold();

    if change.available {
        info!(available = true, "{} is {}", target, "UP".green().bold());
    } else {
        warn!(available = false, "{} is {}", target, "DOWN".red().bold());
    }
}
