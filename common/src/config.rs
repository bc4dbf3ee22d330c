use std::time::Duration;

pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(1);

/// Settings shared by the native probers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeConfig {
    /// Upper bound for a single probe (TCP connect or ICMP round-trip).
    ///
    /// The monitor itself never times a probe out; this is the only bound.
    pub timeout: Duration,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }
}

impl ProbeConfig {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }
}
