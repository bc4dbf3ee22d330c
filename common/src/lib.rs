pub mod config;
pub mod error;
pub mod network;

pub use config::ProbeConfig;
pub use error::EndpointError;
pub use network::endpoint::{Endpoint, IpVersion, Protocol};
