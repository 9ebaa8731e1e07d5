//! Wait conditions for settle-driver
//!
//! A wait condition is a side-effect-free predicate over the target's
//! scheduling and rendering state. Conditions are built on the driver side,
//! sent over the wire as flat string maps, decoded in the target and awaited
//! there until they hold.
//!
//! - Leaf conditions: no transient callbacks, no pending frame, first frame rasterized
//! - [`CombinedCondition`]: ordered conjunction of conditions
//! - [`deserialize_condition`]: the single decoder for every condition kind

pub mod combined;
pub mod conditions;
pub mod decoder;
pub mod errors;
pub mod types;

pub use combined::*;
pub use conditions::*;
pub use decoder::*;
pub use errors::*;
pub use types::*;

pub use settle_frame_probe::SchedulerProbe;
