//! # Monitoring Endpoint Model
//!
//! Describes *what* a monitor checks: a protocol, a host and, for TCP, a port.
//!
//! Endpoints are only built through the validating factories below, so an
//! [`Endpoint`] that exists is always well formed:
//! * ICMP endpoints (`IcmpV4`, `IcmpV6`) never carry a port.
//! * TCP endpoints always carry a port in `[1, 65535]`.
//!
//! Host names are accepted as-is. Whether they resolve is a question for the
//! prober at probe time, not for the constructor.

use std::fmt;
use std::str::FromStr;

use crate::error::EndpointError;

/// Protocol used to reach an [`Endpoint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    /// ICMP echo over IPv4.
    IcmpV4,
    /// ICMP echo over IPv6.
    IcmpV6,
    /// TCP connect.
    Tcp,
}

/// IP family used by the ICMP factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IpVersion {
    V4,
    V6,
}

impl Protocol {
    pub fn is_icmp(&self) -> bool {
        matches!(self, Protocol::IcmpV4 | Protocol::IcmpV6)
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::IcmpV4 => write!(f, "ICMPv4"),
            Protocol::IcmpV6 => write!(f, "ICMPv6"),
            Protocol::Tcp => write!(f, "TCP"),
        }
    }
}

impl FromStr for Protocol {
    type Err = EndpointError;

    /// Parses a protocol name.
    ///
    /// Supported names (case-insensitive):
    /// * **IPv4 ICMP**: "icmpv4", "icmp", "ping".
    /// * **IPv6 ICMP**: "icmpv6", "icmp6", "ping6".
    /// * **TCP**: "tcp".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "icmpv4" | "icmp" | "ping" => Ok(Protocol::IcmpV4),
            "icmpv6" | "icmp6" | "ping6" => Ok(Protocol::IcmpV6),
            "tcp" => Ok(Protocol::Tcp),
            _ => Err(EndpointError::UnknownProtocol(s.to_string())),
        }
    }
}

/// Immutable description of a monitoring target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    protocol: Protocol,
    host: String,
    port: Option<u16>,
}

impl Endpoint {
    /// Builds an ICMP endpoint for the given IP family. Never fails.
    pub fn make_icmp_endpoint(host: impl Into<String>, ip_version: IpVersion) -> Self {
        let protocol: Protocol = match ip_version {
            IpVersion::V4 => Protocol::IcmpV4,
            IpVersion::V6 => Protocol::IcmpV6,
        };

        Self {
            protocol,
            host: host.into(),
            port: None,
        }
    }

    pub fn make_icmpv4_endpoint(host: impl Into<String>) -> Self {
        Self::make_icmp_endpoint(host, IpVersion::V4)
    }

    pub fn make_icmpv6_endpoint(host: impl Into<String>) -> Self {
        Self::make_icmp_endpoint(host, IpVersion::V6)
    }

    /// Builds a TCP endpoint.
    ///
    /// `port` must be a plain base-10 number in `[1, 65535]`; signs, whitespace
    /// and anything else are rejected with [`EndpointError::InvalidPort`].
    pub fn make_tcp_endpoint(host: impl Into<String>, port: &str) -> Result<Self, EndpointError> {
        let port: u16 = parse_port(port)?;

        Ok(Self {
            protocol: Protocol::Tcp,
            host: host.into(),
            port: Some(port),
        })
    }

    /// Generic factory dispatching on `protocol`.
    ///
    /// Used where the protocol is only known at runtime (e.g. parsed from the
    /// command line). ICMP endpoints reject a port, TCP endpoints require one.
    pub fn from_parts(
        protocol: Protocol,
        host: impl Into<String>,
        port: Option<&str>,
    ) -> Result<Self, EndpointError> {
        match (protocol, port) {
            (Protocol::IcmpV4, None) => Ok(Self::make_icmp_endpoint(host, IpVersion::V4)),
            (Protocol::IcmpV6, None) => Ok(Self::make_icmp_endpoint(host, IpVersion::V6)),
            (Protocol::IcmpV4 | Protocol::IcmpV6, Some(port)) => Err(EndpointError::UnexpectedPort {
                protocol,
                port: port.to_string(),
            }),
            (Protocol::Tcp, Some(port)) => Self::make_tcp_endpoint(host, port),
            (Protocol::Tcp, None) => Err(EndpointError::InvalidPort {
                port: String::new(),
                reason: "a TCP endpoint requires a port",
            }),
        }
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Port of a TCP endpoint, `None` for ICMP.
    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// Canonical target string: `host` for ICMP, `host:port` for TCP.
    ///
    /// Meant for logging and identity; probers resolve from the parts instead.
    pub fn target(&self) -> String {
        match self.port {
            Some(port) => format!("{}:{}", self.host, port),
            None => self.host.clone(),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.protocol, self.target())
    }
}

/// Parses a TCP port string, accepting only ASCII digits.
fn parse_port(port: &str) -> Result<u16, EndpointError> {
    let invalid = |reason: &'static str| EndpointError::InvalidPort {
        port: port.to_string(),
        reason,
    };

    if port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid("not a valid number"));
    }

    // Digits only, so the only possible parse failure is overflow.
    let value: u32 = port.parse::<u32>().map_err(|_| invalid("not in [1, 65535]"))?;

    match u16::try_from(value) {
        Ok(0) | Err(_) => Err(invalid("not in [1, 65535]")),
        Ok(port) => Ok(port),
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
