use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, watch};
use tracing::trace;

use crate::SchedulerProbe;

const CYCLE_CHANNEL_CAPACITY: usize = 16;

/// Observable scheduler state at one instant.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ProbeState {
    pub transient_callbacks: usize,
    pub scheduled_frame: bool,
    pub first_frame_rasterized: bool,
}

/// Hand-driven scheduler suitable for unit tests and simulation.
///
/// Cycle boundaries are fanned out over a broadcast channel so that every
/// waiter suspended at the time of [`end_cycle`](Self::end_cycle) resumes.
/// The first-frame signal is a watch channel that latches at `true`.
pub struct InMemoryScheduler {
    state: RwLock<ProbeState>,
    cycle_tx: broadcast::Sender<u64>,
    first_frame_tx: watch::Sender<bool>,
    cycle: AtomicU64,
    cycles_awaited: AtomicU64,
    first_frame_waits: AtomicU64,
}

impl InMemoryScheduler {
    pub fn new() -> Arc<Self> {
        Self::with_state(ProbeState::default())
    }

    pub fn with_state(state: ProbeState) -> Arc<Self> {
        let (cycle_tx, _) = broadcast::channel(CYCLE_CHANNEL_CAPACITY);
        let (first_frame_tx, _) = watch::channel(state.first_frame_rasterized);
        Arc::new(Self {
            state: RwLock::new(state),
            cycle_tx,
            first_frame_tx,
            cycle: AtomicU64::new(0),
            cycles_awaited: AtomicU64::new(0),
            first_frame_waits: AtomicU64::new(0),
        })
    }

    pub fn snapshot(&self) -> ProbeState {
        self.state.read().clone()
    }

    pub fn set_transient_callbacks(&self, count: usize) {
        self.state.write().transient_callbacks = count;
    }

    pub fn set_scheduled_frame(&self, scheduled: bool) {
        self.state.write().scheduled_frame = scheduled;
    }

    /// Marks the first frame as rasterized and releases every waiter on the
    /// first-frame signal. Idempotent.
    pub fn rasterize_first_frame(&self) {
        self.state.write().first_frame_rasterized = true;
        self.first_frame_tx.send_replace(true);
    }

    /// Fires one cycle boundary and returns its sequence number.
    pub fn end_cycle(&self) -> u64 {
        let cycle = self.cycle.fetch_add(1, Ordering::SeqCst) + 1;
        // No receivers just means nobody is waiting on this boundary.
        let woken = self.cycle_tx.send(cycle).unwrap_or(0);
        trace!(cycle, woken, "cycle boundary");
        cycle
    }

    /// Number of cycle boundaries fired so far.
    pub fn cycle(&self) -> u64 {
        self.cycle.load(Ordering::SeqCst)
    }

    /// Number of times a caller suspended on [`SchedulerProbe::end_of_cycle`].
    pub fn cycles_awaited(&self) -> u64 {
        self.cycles_awaited.load(Ordering::SeqCst)
    }

    /// Number of times a caller awaited the first-frame signal.
    pub fn first_frame_waits(&self) -> u64 {
        self.first_frame_waits.load(Ordering::SeqCst)
    }

    /// Callers currently suspended on the next cycle boundary.
    pub fn cycle_waiters(&self) -> usize {
        self.cycle_tx.receiver_count()
    }
}

#[async_trait]
impl SchedulerProbe for InMemoryScheduler {
    fn transient_callback_count(&self) -> usize {
        self.state.read().transient_callbacks
    }

    fn has_scheduled_frame(&self) -> bool {
        self.state.read().scheduled_frame
    }

    fn first_frame_rasterized(&self) -> bool {
        self.state.read().first_frame_rasterized
    }

    async fn end_of_cycle(&self) {
        let mut rx = self.cycle_tx.subscribe();
        self.cycles_awaited.fetch_add(1, Ordering::SeqCst);
        match rx.recv().await {
            Ok(cycle) => trace!(cycle, "resumed at cycle boundary"),
            Err(RecvError::Lagged(skipped)) => trace!(skipped, "cycle receiver lagged"),
            // The sender lives as long as `self`.
            Err(RecvError::Closed) => {}
        }
    }

    async fn first_frame_rasterized_signal(&self) {
        let mut rx = self.first_frame_tx.subscribe();
        self.first_frame_waits.fetch_add(1, Ordering::SeqCst);
        if rx.wait_for(|rasterized| *rasterized).await.is_err() {
            trace!("first frame signal dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_pending, assert_ready, task};

    #[test]
    fn test_default_state() {
        let scheduler = InMemoryScheduler::new();
        assert_eq!(scheduler.snapshot(), ProbeState::default());
        assert_eq!(scheduler.transient_callback_count(), 0);
        assert!(!scheduler.has_scheduled_frame());
        assert!(!scheduler.first_frame_rasterized());
    }

    #[test]
    fn test_end_of_cycle_resumes_on_boundary() {
        let scheduler = InMemoryScheduler::new();
        let mut waiter = task::spawn(scheduler.end_of_cycle());

        assert_pending!(waiter.poll());
        assert_eq!(scheduler.cycle_waiters(), 1);
        assert_eq!(scheduler.cycles_awaited(), 1);

        assert_eq!(scheduler.end_cycle(), 1);
        assert!(waiter.is_woken());
        assert_ready!(waiter.poll());
    }

    #[test]
    fn test_boundary_before_subscription_is_not_observed() {
        let scheduler = InMemoryScheduler::new();
        scheduler.end_cycle();

        let mut waiter = task::spawn(scheduler.end_of_cycle());
        assert_pending!(waiter.poll());
        assert_eq!(scheduler.cycle(), 1);
    }

    #[test]
    fn test_first_frame_signal_latches() {
        let scheduler = InMemoryScheduler::new();
        let mut waiter = task::spawn(scheduler.first_frame_rasterized_signal());
        assert_pending!(waiter.poll());

        scheduler.rasterize_first_frame();
        assert!(waiter.is_woken());
        assert_ready!(waiter.poll());
        drop(waiter);

        let mut late = task::spawn(scheduler.first_frame_rasterized_signal());
        assert_ready!(late.poll());
        assert_eq!(scheduler.first_frame_waits(), 2);
    }

    #[test]
    fn test_with_state_seeds_first_frame_signal() {
        let scheduler = InMemoryScheduler::with_state(ProbeState {
            first_frame_rasterized: true,
            ..ProbeState::default()
        });
        let mut waiter = task::spawn(scheduler.first_frame_rasterized_signal());
        assert_ready!(waiter.poll());
    }
}
