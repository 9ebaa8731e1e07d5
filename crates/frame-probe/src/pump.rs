use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::InMemoryScheduler;

/// Script for a [`FramePump`] run.
#[derive(Clone, Debug)]
pub struct PumpPlan {
    /// Cycles during which a frame stays scheduled. Zero starts idle.
    pub pending_frames: u32,

    /// Initial transient callback count; one drains per cycle.
    pub transient_callbacks: usize,

    /// Cycle at which the first frame rasterizes. `None` never rasterizes.
    pub first_frame_after: Option<u32>,

    /// Delay between cycle boundaries.
    pub interval: Duration,

    /// Stop after this many cycles. `None` runs until stopped.
    pub max_cycles: Option<u64>,
}

impl Default for PumpPlan {
    fn default() -> Self {
        Self {
            pending_frames: 0,
            transient_callbacks: 0,
            first_frame_after: Some(1),
            interval: Duration::from_millis(16),
            max_cycles: None,
        }
    }
}

/// Background task that advances an [`InMemoryScheduler`] one cycle per tick.
///
/// The pump is cancelled when dropped.
pub struct FramePump {
    token: CancellationToken,
    handle: Option<JoinHandle<u64>>,
}

impl FramePump {
    /// Seeds the scheduler from `plan` and spawns the pump on the current runtime.
    pub fn start(scheduler: Arc<InMemoryScheduler>, plan: PumpPlan) -> Self {
        scheduler.set_scheduled_frame(plan.pending_frames > 0);
        scheduler.set_transient_callbacks(plan.transient_callbacks);
        if plan.first_frame_after == Some(0) {
            scheduler.rasterize_first_frame();
        }

        let token = CancellationToken::new();
        let handle = tokio::spawn(run_pump(scheduler, plan, token.clone()));
        Self {
            token,
            handle: Some(handle),
        }
    }

    pub fn stop(&self) {
        self.token.cancel();
    }

    /// Stops the pump and returns how many cycles it fired.
    pub async fn join(mut self) -> u64 {
        self.token.cancel();
        match self.handle.take() {
            Some(handle) => match handle.await {
                Ok(fired) => fired,
                Err(err) => {
                    warn!("frame pump task failed: {}", err);
                    0
                }
            },
            None => 0,
        }
    }
}

impl Drop for FramePump {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

async fn run_pump(
    scheduler: Arc<InMemoryScheduler>,
    plan: PumpPlan,
    token: CancellationToken,
) -> u64 {
    let mut remaining_frames = plan.pending_frames;
    let mut transient = plan.transient_callbacks;
    let mut fired = 0u64;

    debug!(?plan, "frame pump started");
    loop {
        if plan.max_cycles.is_some_and(|max| fired >= max) {
            break;
        }
        tokio::select! {
            _ = token.cancelled() => break,
            _ = sleep(plan.interval) => {}
        }

        if remaining_frames > 0 {
            remaining_frames -= 1;
            scheduler.set_scheduled_frame(remaining_frames > 0);
        }
        if transient > 0 {
            transient -= 1;
            scheduler.set_transient_callbacks(transient);
        }
        let cycle = scheduler.cycle() + 1;
        if plan
            .first_frame_after
            .is_some_and(|after| u64::from(after) <= cycle)
        {
            scheduler.rasterize_first_frame();
        }

        fired += 1;
        scheduler.end_cycle();
        trace!(cycle, remaining_frames, transient, "frame pump tick");
    }
    debug!(fired, "frame pump stopped");
    fired
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SchedulerProbe;

    async fn wait_for_cycle(scheduler: &InMemoryScheduler, cycle: u64) {
        while scheduler.cycle() < cycle {
            sleep(Duration::from_millis(1)).await;
        }
    }

    #[tokio::test]
    async fn test_pump_drains_plan() {
        let scheduler = InMemoryScheduler::new();
        let pump = FramePump::start(
            scheduler.clone(),
            PumpPlan {
                pending_frames: 2,
                transient_callbacks: 3,
                first_frame_after: Some(2),
                interval: Duration::from_millis(1),
                max_cycles: Some(4),
            },
        );
        assert!(scheduler.has_scheduled_frame());
        assert_eq!(scheduler.transient_callback_count(), 3);
        assert!(!scheduler.first_frame_rasterized());

        wait_for_cycle(&scheduler, 4).await;
        assert_eq!(pump.join().await, 4);
        assert!(!scheduler.has_scheduled_frame());
        assert_eq!(scheduler.transient_callback_count(), 0);
        assert!(scheduler.first_frame_rasterized());
    }

    #[tokio::test]
    async fn test_pump_runs_to_max_cycles() {
        let scheduler = InMemoryScheduler::new();
        let pump = FramePump::start(
            scheduler.clone(),
            PumpPlan {
                pending_frames: 1,
                interval: Duration::from_millis(1),
                max_cycles: Some(3),
                ..PumpPlan::default()
            },
        );
        wait_for_cycle(&scheduler, 3).await;
        assert_eq!(pump.join().await, 3);
        assert!(!scheduler.has_scheduled_frame());
        assert!(scheduler.first_frame_rasterized());
    }

    #[tokio::test]
    async fn test_join_after_aborted_task_reports_zero() {
        let scheduler = InMemoryScheduler::new();
        let pump = FramePump::start(
            scheduler.clone(),
            PumpPlan {
                interval: Duration::from_secs(60),
                ..PumpPlan::default()
            },
        );
        if let Some(handle) = &pump.handle {
            handle.abort();
        }
        assert_eq!(pump.join().await, 0);
        assert_eq!(scheduler.cycle(), 0);
    }

    #[tokio::test]
    async fn test_zero_first_frame_rasterizes_immediately() {
        let scheduler = InMemoryScheduler::new();
        let pump = FramePump::start(
            scheduler.clone(),
            PumpPlan {
                first_frame_after: Some(0),
                max_cycles: Some(0),
                ..PumpPlan::default()
            },
        );
        assert!(scheduler.first_frame_rasterized());
        assert_eq!(pump.join().await, 0);
    }
}
