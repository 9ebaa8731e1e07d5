use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use settle_driver::{DriverConfig, WaitForCondition, WaitHandler, WaitReport};
use settle_frame_probe::{FramePump, InMemoryScheduler, ProbeState, PumpPlan};
use settle_wait_conditions::{
    condition_from_json, CombinedCondition, FirstFrameRasterizedCondition,
    NoPendingFrameCondition, NoTransientCallbacksCondition, WaitCondition,
};
use tracing::info;

#[derive(Args, Clone, Debug)]
pub struct SimulateArgs {
    /// Condition JSON; defaults to all leaf conditions combined
    #[arg(long)]
    pub condition: Option<String>,

    /// Cycles during which a frame stays scheduled
    #[arg(long, default_value_t = 3)]
    pub pending_frames: u32,

    /// Initial transient callbacks; one drains per cycle
    #[arg(long, default_value_t = 2)]
    pub transient_callbacks: usize,

    /// Cycle at which the first frame rasterizes
    #[arg(long, default_value_t = 1)]
    pub first_frame_after: u32,

    /// Milliseconds between cycles (overrides simulation.cycle_ms)
    #[arg(long)]
    pub cycle_ms: Option<u64>,

    /// Command timeout in milliseconds (overrides default_timeout_ms)
    #[arg(long)]
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Serialize)]
struct SimulationOutcome {
    report: WaitReport,
    cycles: u64,
    final_state: ProbeState,
}

pub async fn cmd_simulate(args: SimulateArgs, config: &DriverConfig) -> Result<()> {
    let condition = match &args.condition {
        Some(raw) => condition_from_json(raw).context("Invalid --condition payload")?,
        None => default_condition(),
    };

    let mut command = WaitForCondition::new(condition);
    if let Some(timeout_ms) = args.timeout_ms {
        command = command.with_timeout(Duration::from_millis(timeout_ms));
    }

    let scheduler = InMemoryScheduler::new();
    let plan = PumpPlan {
        pending_frames: args.pending_frames,
        transient_callbacks: args.transient_callbacks,
        first_frame_after: Some(args.first_frame_after),
        interval: Duration::from_millis(args.cycle_ms.unwrap_or(config.simulation.cycle_ms)),
        max_cycles: None,
    };
    info!(?plan, condition = %command.condition, "Starting simulation");

    let pump = FramePump::start(scheduler.clone(), plan);
    let handler = WaitHandler::from_config(scheduler.clone(), config);
    let result = handler.handle(&command).await;
    let cycles = pump.join().await;

    let report = result?;
    info!(cycles, latency_ms = report.latency_ms, "Simulation settled");

    let outcome = SimulationOutcome {
        report,
        cycles,
        final_state: scheduler.snapshot(),
    };
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

fn default_condition() -> WaitCondition {
    CombinedCondition::new(vec![
        FirstFrameRasterizedCondition::new().into(),
        NoPendingFrameCondition::new().into(),
        NoTransientCallbacksCondition::new().into(),
    ])
    .into()
}
