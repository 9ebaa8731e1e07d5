//! Scheduler probes for settle-driver
//!
//! The target application exposes a handful of signals about its scheduling
//! and rendering state. Wait conditions never reach into the target directly;
//! they read these signals through [`SchedulerProbe`].
//!
//! This crate also ships [`InMemoryScheduler`], a probe whose state is driven
//! by hand (or by a [`FramePump`]) for tests and simulation.

mod pump;
mod scheduler;

pub use pump::*;
pub use scheduler::*;

use async_trait::async_trait;

/// Read-only view over the target's scheduler plus its two notifications.
///
/// Implementations must keep the boolean reads free of side effects; they are
/// called repeatedly from wait loops and may be called concurrently.
#[async_trait]
pub trait SchedulerProbe: Send + Sync {
    /// Number of transient (animation-style) callbacks currently scheduled.
    fn transient_callback_count(&self) -> usize;

    /// Whether a rendering pass is currently scheduled.
    fn has_scheduled_frame(&self) -> bool;

    /// Whether the first frame has completed rasterization.
    fn first_frame_rasterized(&self) -> bool;

    /// Suspends until the next scheduling cycle boundary.
    async fn end_of_cycle(&self);

    /// Suspends until the first frame is rasterized. Resolves immediately
    /// once that has already happened.
    async fn first_frame_rasterized_signal(&self);
}
