//! ICMP echo probing over raw layer-4 sockets.
//!
//! Opening the channel needs `CAP_NET_RAW` (or root). Without it the probe
//! logs a warning once and reports the endpoint as unavailable.

use std::io;
use std::net::{IpAddr, ToSocketAddrs};
use std::sync::Once;
use std::time::{Duration, Instant};

use anyhow::Context;
use async_trait::async_trait;
use hostmon_common::{Endpoint, IpVersion, ProbeConfig, Protocol};
use pnet::packet::Packet;
use pnet::packet::icmp::{self, IcmpCode, IcmpPacket, IcmpTypes};
use pnet::packet::icmpv6::{self, Icmpv6Code, Icmpv6Packet, Icmpv6Types};
use pnet::packet::ip::IpNextHeaderProtocols;
use pnet::transport::{self, TransportChannelType, TransportProtocol};
use tracing::{debug, error, warn};

use crate::probe::Prober;

const TRANSPORT_BUFFER_SIZE: usize = 4096;
const ECHO_HDR_LEN: usize = 8;
const ECHO_PAYLOAD: &[u8; 8] = b"hostmon\0";
const ECHO_SEQUENCE: u16 = 1;
const CHANNEL_TYPE_ICMP_V4: TransportChannelType =
    TransportChannelType::Layer4(TransportProtocol::Ipv4(IpNextHeaderProtocols::Icmp));
const CHANNEL_TYPE_ICMP_V6: TransportChannelType =
    TransportChannelType::Layer4(TransportProtocol::Ipv6(IpNextHeaderProtocols::Icmpv6));

static PRIVILEGE_WARNING: Once = Once::new();

/// Sends a single echo request and waits for the matching reply.
pub struct IcmpProber {
    timeout: Duration,
}

impl IcmpProber {
    pub fn new(config: ProbeConfig) -> Self {
        Self {
            timeout: config.timeout,
        }
    }
}

#[async_trait]
impl Prober for IcmpProber {
    async fn probe(&self, endpoint: &Endpoint) -> bool {
        let ip_version: IpVersion = match endpoint.protocol() {
            Protocol::IcmpV4 => IpVersion::V4,
            Protocol::IcmpV6 => IpVersion::V6,
            Protocol::Tcp => {
                error!("ICMP prober cannot check {endpoint}");
                return false;
            }
        };

        let host: String = endpoint.host().to_string();
        let timeout: Duration = self.timeout;

        // Raw sockets block, keep them off the runtime thread.
        let outcome = tokio::task::spawn_blocking(move || echo(&host, ip_version, timeout)).await;

        match outcome {
            Ok(Ok(reachable)) => reachable,
            Ok(Err(e)) => {
                debug!("ICMP probe of {} failed: {:#}", endpoint.target(), e);
                false
            }
            Err(e) => {
                error!("ICMP probe task for {} aborted: {}", endpoint.target(), e);
                false
            }
        }
    }
}

macro_rules! await_echo_reply {
    ($rx:expr, $iter_func:path, $is_reply:expr, $addr:expr, $identifier:expr, $deadline:expr) => {{
        let mut iterator = $iter_func(&mut $rx);
        loop {
            let remaining: Duration = $deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break false;
            }
            match iterator.next_with_timeout(remaining)? {
                Some((packet, source))
                    if source == $addr
                        && $is_reply(&packet)
                        && echo_identifier(packet.packet()) == Some($identifier) =>
                {
                    break true;
                }
                Some(_) => continue,
                None => break false,
            }
        }
    }};
}

/// One echo round-trip. `Ok(false)` covers every ordinary failure.
fn echo(host: &str, ip_version: IpVersion, timeout: Duration) -> anyhow::Result<bool> {
    let Some(addr) = resolve(host, ip_version) else {
        debug!("{host} does not resolve to an {ip_version:?} address");
        return Ok(false);
    };

    let channel_type: TransportChannelType = match ip_version {
        IpVersion::V4 => CHANNEL_TYPE_ICMP_V4,
        IpVersion::V6 => CHANNEL_TYPE_ICMP_V6,
    };

    let (mut tx, mut rx) = match transport::transport_channel(TRANSPORT_BUFFER_SIZE, channel_type) {
        Ok(channel) => channel,
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
            warn_unprivileged();
            return Ok(false);
        }
        Err(e) => return Err(e).context("failed to open ICMP channel"),
    };

    let identifier: u16 = rand::random();
    let deadline: Instant = Instant::now() + timeout;

    let reachable: bool = match ip_version {
        IpVersion::V4 => {
            let request: Vec<u8> = create_echo_request_v4(identifier)?;
            let packet = IcmpPacket::new(&request).context("failed to wrap ICMP packet")?;
            tx.send_to(packet, addr).context("failed to send echo request")?;

            let is_reply = |p: &IcmpPacket<'_>| p.get_icmp_type() == IcmpTypes::EchoReply;
            await_echo_reply!(rx, transport::icmp_packet_iter, is_reply, addr, identifier, deadline)
        }
        IpVersion::V6 => {
            let request: Vec<u8> = create_echo_request_v6(identifier)?;
            let packet = Icmpv6Packet::new(&request).context("failed to wrap ICMPv6 packet")?;
            tx.send_to(packet, addr).context("failed to send echo request")?;

            let is_reply = |p: &Icmpv6Packet<'_>| p.get_icmpv6_type() == Icmpv6Types::EchoReply;
            await_echo_reply!(rx, transport::icmpv6_packet_iter, is_reply, addr, identifier, deadline)
        }
    };

    Ok(reachable)
}

fn resolve(host: &str, ip_version: IpVersion) -> Option<IpAddr> {
    let wanted = |ip: &IpAddr| match ip_version {
        IpVersion::V4 => ip.is_ipv4(),
        IpVersion::V6 => ip.is_ipv6(),
    };

    if let Ok(ip) = host.parse::<IpAddr>() {
        return wanted(&ip).then_some(ip);
    }

    (host, 0)
        .to_socket_addrs()
        .ok()?
        .map(|socket_addr| socket_addr.ip())
        .find(wanted)
}

fn create_echo_request_v4(identifier: u16) -> anyhow::Result<Vec<u8>> {
    let mut pkt = [0u8; ECHO_HDR_LEN + ECHO_PAYLOAD.len()];
    let mut echo = icmp::echo_request::MutableEchoRequestPacket::new(&mut pkt)
        .context("failed to create echo request packet")?;

    echo.set_icmp_type(IcmpTypes::EchoRequest);
    echo.set_icmp_code(IcmpCode(0));
    echo.set_identifier(identifier);
    echo.set_sequence_number(ECHO_SEQUENCE);
    echo.set_payload(ECHO_PAYLOAD);

    echo.set_checksum(0);
    let icmp_pkt = IcmpPacket::new(echo.packet()).context("failed to create ICMP packet")?;
    let csm: u16 = icmp::checksum(&icmp_pkt);
    echo.set_checksum(csm);
    Ok(Vec::from(pkt))
}

// The kernel fills in the ICMPv6 checksum on raw sockets, it needs the source
// address which is only known after routing.
fn create_echo_request_v6(identifier: u16) -> anyhow::Result<Vec<u8>> {
    let mut pkt = [0u8; ECHO_HDR_LEN + ECHO_PAYLOAD.len()];
    let mut echo = icmpv6::echo_request::MutableEchoRequestPacket::new(&mut pkt)
        .context("failed to create echo request packet")?;

    echo.set_icmpv6_type(Icmpv6Types::EchoRequest);
    echo.set_icmpv6_code(Icmpv6Code(0));
    echo.set_identifier(identifier);
    echo.set_sequence_number(ECHO_SEQUENCE);
    echo.set_payload(ECHO_PAYLOAD);
    Ok(Vec::from(pkt))
}

/// Identifier field of an ICMP/ICMPv6 echo message.
fn echo_identifier(icmp_bytes: &[u8]) -> Option<u16> {
    icmp_bytes
        .get(4..6)
        .map(|id| u16::from_be_bytes([id[0], id[1]]))
}

fn warn_unprivileged() {
    PRIVILEGE_WARNING.call_once(|| {
        if is_root::is_root() {
            warn!("Raw ICMP sockets are unavailable, ICMP endpoints will report as unavailable");
        } else {
            warn!("ICMP probing requires root or CAP_NET_RAW, ICMP endpoints will report as unavailable");
        }
    });
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
