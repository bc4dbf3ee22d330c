use thiserror::Error;

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("monitor interval must be greater than zero")]
    ZeroInterval,

    #[error("failed to start monitor worker: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("monitor for {0} has already been stopped")]
    AlreadyStopped(String),
}
