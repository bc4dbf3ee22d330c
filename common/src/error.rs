use thiserror::Error;

use crate::network::endpoint::Protocol;

/// Errors raised while building an [`Endpoint`](crate::network::endpoint::Endpoint).
///
/// These are the only failures that abort a caller's workflow; everything that
/// goes wrong after construction degrades to "unavailable".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EndpointError {
    #[error("invalid port '{port}': {reason}")]
    InvalidPort { port: String, reason: &'static str },

    #[error("{protocol} endpoints do not take a port (got '{port}')")]
    UnexpectedPort { protocol: Protocol, port: String },

    #[error("unknown protocol '{0}'")]
    UnknownProtocol(String),
}
