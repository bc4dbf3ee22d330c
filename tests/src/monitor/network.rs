use std::net::TcpListener;
use std::thread;
use std::time::Duration;

use hostmon_core::{Endpoint, HostMonitor, ProbeConfig, Prober, SystemProber};

use crate::utils::{Recorder, wait_until};

/// A loopback port nobody listens on.
fn closed_port() -> u16 {
    let listener: TcpListener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

#[test]
fn closed_port_stays_unavailable_without_notifications() {
    let endpoint: Endpoint = Endpoint::make_tcp_endpoint("127.0.0.1", &closed_port().to_string()).unwrap();
    let monitor = HostMonitor::start(endpoint, Duration::from_secs(1)).unwrap();
    let recorder = Recorder::new();
    monitor.add_observer(recorder.clone());

    thread::sleep(Duration::from_secs(3));

    assert!(!monitor.is_available());
    assert!(recorder.seen().is_empty());
}

#[test]
fn listening_port_comes_and_goes() {
    let listener: TcpListener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port: String = listener.local_addr().unwrap().port().to_string();
    let endpoint: Endpoint = Endpoint::make_tcp_endpoint("127.0.0.1", &port).unwrap();

    let monitor = HostMonitor::start(endpoint, Duration::from_millis(50)).unwrap();
    let recorder = Recorder::new();
    monitor.add_observer(recorder.clone());

    wait_until("port reported up", || monitor.is_available());

    drop(listener);
    wait_until("port reported down", || !monitor.is_available());
    drop(monitor);

    // The first flip may have beaten the observer registration.
    let seen: Vec<bool> = recorder.seen();
    assert!(
        seen == vec![true, false] || seen == vec![false],
        "unexpected notifications: {seen:?}"
    );
}

#[tokio::test]
async fn system_prober_routes_tcp_endpoints() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port: String = listener.local_addr().unwrap().port().to_string();
    let prober = SystemProber::new(ProbeConfig::with_timeout(Duration::from_millis(500)));

    let open: Endpoint = Endpoint::make_tcp_endpoint("127.0.0.1", &port).unwrap();
    assert!(prober.probe(&open).await);

    drop(listener);
    assert!(!prober.probe(&open).await);
}

#[test]
#[ignore]
fn unresolvable_host_is_unavailable() {
    let endpoint: Endpoint = Endpoint::make_tcp_endpoint("asdkhads.local", "80").unwrap();
    let monitor = HostMonitor::start(endpoint, Duration::from_secs(1)).unwrap();

    thread::sleep(Duration::from_secs(2));

    assert!(!monitor.is_available());
}

#[test]
#[ignore]
fn icmp_loopback_is_available() {
    // Needs CAP_NET_RAW.
    let monitor = HostMonitor::start(Endpoint::make_icmpv4_endpoint("127.0.0.1"), Duration::from_secs(1)).unwrap();

    wait_until("echo reply", || monitor.is_available());
}
