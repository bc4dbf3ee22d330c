use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use hostmon_core::{Endpoint, Observer, Prober, StateChange};

pub const WAIT_LIMIT: Duration = Duration::from_secs(10);

pub fn fast_interval() -> Duration {
    Duration::from_millis(5)
}

pub fn endpoint() -> Endpoint {
    Endpoint::make_tcp_endpoint("monitored.invalid", "443").unwrap()
}

/// Polls `condition` until it holds, panicking after [`WAIT_LIMIT`].
pub fn wait_until(what: &str, condition: impl Fn() -> bool) {
    let started: Instant = Instant::now();
    while !condition() {
        assert!(started.elapsed() < WAIT_LIMIT, "timed out waiting for {what}");
        thread::sleep(Duration::from_millis(1));
    }
}

/// Replays a fixed sequence of results, then repeats `fallback` forever.
pub struct ScriptedProber {
    results: Mutex<VecDeque<bool>>,
    fallback: bool,
    calls: AtomicUsize,
}

impl ScriptedProber {
    pub fn new(results: &[bool], fallback: bool) -> Arc<Self> {
        Arc::new(Self {
            results: Mutex::new(results.iter().copied().collect()),
            fallback,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Prober for ScriptedProber {
    async fn probe(&self, _endpoint: &Endpoint) -> bool {
        let result: bool = self.results.lock().unwrap().pop_front().unwrap_or(self.fallback);
        self.calls.fetch_add(1, Ordering::SeqCst);
        result
    }
}

/// Flips its answer on every call, starting with `true`.
pub struct FlappingProber {
    next: AtomicBool,
    calls: AtomicUsize,
}

impl FlappingProber {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            next: AtomicBool::new(true),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Prober for FlappingProber {
    async fn probe(&self, _endpoint: &Endpoint) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.next.fetch_xor(true, Ordering::SeqCst)
    }
}

/// Blocks every probe until the test releases it.
///
/// The monitor's worker has a runtime of its own, so blocking inside the
/// probe only stalls that worker.
pub struct GatedProber {
    answer: bool,
    entered: Mutex<Sender<()>>,
    release: Mutex<Receiver<()>>,
}

pub struct Gate {
    pub entered: Receiver<()>,
    pub release: Sender<()>,
}

impl GatedProber {
    pub fn new(answer: bool) -> (Arc<Self>, Gate) {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();

        let prober = Arc::new(Self {
            answer,
            entered: Mutex::new(entered_tx),
            release: Mutex::new(release_rx),
        });
        let gate = Gate {
            entered: entered_rx,
            release: release_tx,
        };
        (prober, gate)
    }
}

#[async_trait]
impl Prober for GatedProber {
    async fn probe(&self, _endpoint: &Endpoint) -> bool {
        let _ = self.entered.lock().unwrap().send(());
        // A dropped gate releases every probe.
        let _ = self.release.lock().unwrap().recv();
        self.answer
    }
}

/// Holds back the first probe of `inner` until released.
///
/// Lets a test register observers before the loop's first cycle.
pub struct HeldProber<P> {
    inner: Arc<P>,
    hold: Mutex<Option<Receiver<()>>>,
}

impl<P> HeldProber<P>
where
    P: Prober + 'static,
{
    pub fn new(inner: Arc<P>) -> (Arc<Self>, Sender<()>) {
        let (release_tx, release_rx) = mpsc::channel();
        let prober = Arc::new(Self {
            inner,
            hold: Mutex::new(Some(release_rx)),
        });
        (prober, release_tx)
    }
}

#[async_trait]
impl<P> Prober for HeldProber<P>
where
    P: Prober + 'static,
{
    async fn probe(&self, endpoint: &Endpoint) -> bool {
        let hold: Option<Receiver<()>> = self.hold.lock().unwrap().take();
        if let Some(hold) = hold {
            let _ = hold.recv();
        }
        self.inner.probe(endpoint).await
    }
}

/// Records every availability it is told about.
#[derive(Default)]
pub struct Recorder {
    seen: Mutex<Vec<bool>>,
}

impl Recorder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn seen(&self) -> Vec<bool> {
        self.seen.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

impl Observer for Recorder {
    fn state_change(&self, change: &StateChange) {
        self.seen.lock().unwrap().push(change.available);
    }
}
