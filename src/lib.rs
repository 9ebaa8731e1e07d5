//! settle-driver library
//!
//! Command layer around the wait conditions: the `waitForCondition` envelope,
//! the target-side handler that enforces deadlines, and driver configuration.

pub mod command;
pub mod config;
pub mod errors;
pub mod handler;

// Re-export commonly used types for external use
pub use command::WaitForCondition;
pub use config::{DriverConfig, LoadedConfig};
pub use errors::DriverError;
pub use handler::{WaitHandler, WaitReport};
pub use settle_frame_probe::{InMemoryScheduler, SchedulerProbe};
pub use settle_wait_conditions::{
    CombinedCondition, FirstFrameRasterizedCondition, NoPendingFrameCondition,
    NoTransientCallbacksCondition, SerializationError, SerializedCondition, WaitCondition,
};
