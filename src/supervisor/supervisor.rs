use super::parameter_source::ParameterUpdateSource;
use crate::payload_deployer::PayloadDeployer;
use crate::{event, info, log};
use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicU64, Ordering},
};
use tokio::{
    sync::Mutex,
    time::{Duration, MissedTickBehavior, interval},
};
use tokio_util::sync::CancellationToken;

/// Fixed-cadence background task of the deployer.
///
/// Every tick polls the registered parameter sources and forwards pending
/// changes to the deployer. Deployment state changes are reported as they
/// happen. Cancelling the token ends the loop and releases all
/// subscriptions; no tick runs after that.
pub struct Supervisor {
    deployer: Arc<PayloadDeployer>,
    /// Registered notification sources, drained on shutdown.
    sources: Mutex<Vec<Box<dyn ParameterUpdateSource>>>,
    c_tok: CancellationToken,
    ticks: AtomicU64,
    stopped: AtomicBool,
}

impl Supervisor {
    /// Interval between two ticks.
    pub const TICK_INTERVAL: Duration = Duration::from_millis(100);

    pub fn new(deployer: Arc<PayloadDeployer>, c_tok: CancellationToken) -> Self {
        Self {
            deployer,
            sources: Mutex::new(Vec::new()),
            c_tok,
            ticks: AtomicU64::new(0),
            stopped: AtomicBool::new(false),
        }
    }

    /// Registers another parameter source. Ignored once the supervisor stopped.
    pub async fn subscribe(&self, source: Box<dyn ParameterUpdateSource>) {
        let mut sources = self.sources.lock().await;
        if self.stopped.load(Ordering::Acquire) {
            return;
        }
        sources.push(source);
    }

    /// Number of ticks processed so far.
    pub fn ticks(&self) -> u64 { self.ticks.load(Ordering::Relaxed) }

    #[cfg(test)]
    pub fn is_stopped(&self) -> bool { self.stopped.load(Ordering::Acquire) }

    /// Requests the run loop to end.
    #[cfg(test)]
    pub fn stop(&self) { self.c_tok.cancel(); }

    /// Runs the tick loop until the cancellation token fires.
    pub async fn run(self: Arc<Self>) {
        info!("Supervisor started, ticking every {} ms.", Self::TICK_INTERVAL.as_millis());
        let mut ticker = interval(Self::TICK_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut state_rx = self.deployer.state_monitor();
        loop {
            tokio::select! {
                biased;
                () = self.c_tok.cancelled() => break,
                _ = ticker.tick() => self.tick().await,
                Ok(()) = state_rx.changed() => {
                    let state = *state_rx.borrow_and_update();
                    info!("Deployment state is now {state}.");
                }
            }
        }
        self.shutdown().await;
    }

    /// One scheduled unit of work: poll every source once and forward changes.
    pub async fn tick(&self) {
        let pending = {
            let mut sources = self.sources.lock().await;
            if self.stopped.load(Ordering::Acquire) {
                return;
            }
            sources
                .iter_mut()
                .filter_map(|s| if s.updated() { Some(s.copy()) } else { None })
                .collect::<Vec<_>>()
        };
        let n = self.ticks.fetch_add(1, Ordering::Relaxed) + 1;
        event!("Tick {n}, {} parameter update(s) pending.", pending.len());
        for params in pending {
            log!("Applying parameter update {params:?}.");
            self.deployer.apply_params(params).await;
        }
    }

    /// Releases all subscriptions. Safe to call more than once.
    pub async fn shutdown(&self) {
        let mut sources = self.sources.lock().await;
        if self.stopped.swap(true, Ordering::AcqRel) {
            return;
        }
        for source in sources.iter_mut() {
            source.unsubscribe();
        }
        let released = sources.len();
        sources.clear();
        info!("Supervisor stopped after {} tick(s), {released} subscription(s) released.", self.ticks());
    }
}
