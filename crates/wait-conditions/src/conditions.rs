//! Condition types awaited inside the target
//!
//! Three leaf signals: transient callbacks, scheduled frame, first frame.
//! Plus the [`CombinedCondition`] composite.

use std::fmt;

use async_recursion::async_recursion;
use serde::{Deserialize, Serialize};
use settle_frame_probe::SchedulerProbe;
use tracing::debug;

use crate::combined::CombinedCondition;
use crate::decoder::deserialize_condition;
use crate::errors::SerializationError;
use crate::types::{SerializedCondition, CONDITION_NAME_KEY};

/// Any condition the target knows how to wait for.
///
/// Serializes through the flat wire map, so it can be embedded directly in a
/// JSON command envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SerializedCondition", into = "SerializedCondition")]
pub enum WaitCondition {
    /// No transient (animation) callbacks are scheduled
    NoTransientCallbacks(NoTransientCallbacksCondition),

    /// No frame render is scheduled
    NoPendingFrame(NoPendingFrameCondition),

    /// The first frame has been rasterized
    FirstFrameRasterized(FirstFrameRasterizedCondition),

    /// Every child condition holds
    Combined(CombinedCondition),
}

impl WaitCondition {
    /// Wire discriminator of this condition.
    pub fn condition_name(&self) -> &'static str {
        match self {
            WaitCondition::NoTransientCallbacks(_) => NoTransientCallbacksCondition::CONDITION_NAME,
            WaitCondition::NoPendingFrame(_) => NoPendingFrameCondition::CONDITION_NAME,
            WaitCondition::FirstFrameRasterized(_) => {
                FirstFrameRasterizedCondition::CONDITION_NAME
            }
            WaitCondition::Combined(_) => CombinedCondition::CONDITION_NAME,
        }
    }

    /// Checks the condition against the probe right now.
    pub fn is_satisfied(&self, probe: &dyn SchedulerProbe) -> bool {
        match self {
            WaitCondition::NoTransientCallbacks(condition) => condition.is_satisfied(probe),
            WaitCondition::NoPendingFrame(condition) => condition.is_satisfied(probe),
            WaitCondition::FirstFrameRasterized(condition) => condition.is_satisfied(probe),
            WaitCondition::Combined(condition) => condition.is_satisfied(probe),
        }
    }

    /// Resolves once the condition holds.
    #[async_recursion]
    pub async fn wait(&self, probe: &dyn SchedulerProbe) {
        match self {
            WaitCondition::NoTransientCallbacks(condition) => condition.wait(probe).await,
            WaitCondition::NoPendingFrame(condition) => condition.wait(probe).await,
            WaitCondition::FirstFrameRasterized(condition) => condition.wait(probe).await,
            WaitCondition::Combined(condition) => condition.wait(probe).await,
        }
    }

    pub fn serialize(&self) -> SerializedCondition {
        match self {
            WaitCondition::NoTransientCallbacks(condition) => condition.serialize(),
            WaitCondition::NoPendingFrame(condition) => condition.serialize(),
            WaitCondition::FirstFrameRasterized(condition) => condition.serialize(),
            WaitCondition::Combined(condition) => condition.serialize(),
        }
    }

    pub fn deserialize(json: &SerializedCondition) -> Result<Self, SerializationError> {
        deserialize_condition(json)
    }
}

impl fmt::Display for WaitCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaitCondition::Combined(combined) => {
                write!(f, "{}[", CombinedCondition::CONDITION_NAME)?;
                for (idx, condition) in combined.conditions().iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", condition)?;
                }
                f.write_str("]")
            }
            leaf => f.write_str(leaf.condition_name()),
        }
    }
}

impl TryFrom<SerializedCondition> for WaitCondition {
    type Error = SerializationError;

    fn try_from(json: SerializedCondition) -> Result<Self, Self::Error> {
        deserialize_condition(&json)
    }
}

impl From<WaitCondition> for SerializedCondition {
    fn from(condition: WaitCondition) -> Self {
        condition.serialize()
    }
}

impl From<NoTransientCallbacksCondition> for WaitCondition {
    fn from(condition: NoTransientCallbacksCondition) -> Self {
        WaitCondition::NoTransientCallbacks(condition)
    }
}

impl From<NoPendingFrameCondition> for WaitCondition {
    fn from(condition: NoPendingFrameCondition) -> Self {
        WaitCondition::NoPendingFrame(condition)
    }
}

impl From<FirstFrameRasterizedCondition> for WaitCondition {
    fn from(condition: FirstFrameRasterizedCondition) -> Self {
        WaitCondition::FirstFrameRasterized(condition)
    }
}

impl From<CombinedCondition> for WaitCondition {
    fn from(condition: CombinedCondition) -> Self {
        WaitCondition::Combined(condition)
    }
}

/// No transient callbacks are pending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct NoTransientCallbacksCondition;

impl NoTransientCallbacksCondition {
    pub const CONDITION_NAME: &'static str = "NoTransientCallbacksCondition";

    pub fn new() -> Self {
        Self
    }

    pub fn deserialize(json: &SerializedCondition) -> Result<Self, SerializationError> {
        expect_condition_name(json, Self::CONDITION_NAME)?;
        Ok(Self)
    }

    pub fn is_satisfied(&self, probe: &dyn SchedulerProbe) -> bool {
        probe.transient_callback_count() == 0
    }

    pub async fn wait(&self, probe: &dyn SchedulerProbe) {
        wait_each_cycle(probe, Self::CONDITION_NAME, |probe| self.is_satisfied(probe)).await
    }

    pub fn serialize(&self) -> SerializedCondition {
        leaf_payload(Self::CONDITION_NAME)
    }
}

/// No frame render is scheduled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct NoPendingFrameCondition;

impl NoPendingFrameCondition {
    pub const CONDITION_NAME: &'static str = "NoPendingFrameCondition";

    pub fn new() -> Self {
        Self
    }

    pub fn deserialize(json: &SerializedCondition) -> Result<Self, SerializationError> {
        expect_condition_name(json, Self::CONDITION_NAME)?;
        Ok(Self)
    }

    pub fn is_satisfied(&self, probe: &dyn SchedulerProbe) -> bool {
        !probe.has_scheduled_frame()
    }

    pub async fn wait(&self, probe: &dyn SchedulerProbe) {
        wait_each_cycle(probe, Self::CONDITION_NAME, |probe| self.is_satisfied(probe)).await
    }

    pub fn serialize(&self) -> SerializedCondition {
        leaf_payload(Self::CONDITION_NAME)
    }
}

/// The first frame has been rasterized.
///
/// Rasterization of the first frame is a single edge, so waiting uses the
/// probe's one-shot signal rather than polling every cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FirstFrameRasterizedCondition;

impl FirstFrameRasterizedCondition {
    pub const CONDITION_NAME: &'static str = "FirstFrameRasterizedCondition";

    pub fn new() -> Self {
        Self
    }

    pub fn deserialize(json: &SerializedCondition) -> Result<Self, SerializationError> {
        expect_condition_name(json, Self::CONDITION_NAME)?;
        Ok(Self)
    }

    pub fn is_satisfied(&self, probe: &dyn SchedulerProbe) -> bool {
        probe.first_frame_rasterized()
    }

    pub async fn wait(&self, probe: &dyn SchedulerProbe) {
        while !self.is_satisfied(probe) {
            debug!(
                condition = Self::CONDITION_NAME,
                "waiting for first frame signal"
            );
            probe.first_frame_rasterized_signal().await;
        }
    }

    pub fn serialize(&self) -> SerializedCondition {
        leaf_payload(Self::CONDITION_NAME)
    }
}

/// Suspends on cycle boundaries until `check` holds.
async fn wait_each_cycle(
    probe: &dyn SchedulerProbe,
    condition: &'static str,
    check: impl Fn(&dyn SchedulerProbe) -> bool,
) {
    let mut cycles = 0u64;
    while !check(probe) {
        debug!(condition, cycles, "condition not met, waiting for next cycle");
        probe.end_of_cycle().await;
        cycles += 1;
    }
    debug!(condition, cycles, "condition met");
}

fn leaf_payload(condition_name: &str) -> SerializedCondition {
    SerializedCondition::from([(CONDITION_NAME_KEY.to_string(), condition_name.to_string())])
}

/// Fails unless `json` carries `expected` as its discriminator.
pub(crate) fn expect_condition_name(
    json: &SerializedCondition,
    expected: &str,
) -> Result<(), SerializationError> {
    if json.get(CONDITION_NAME_KEY).map(String::as_str) != Some(expected) {
        return Err(SerializationError::new(format!(
            "Error occurred during deserializing the {} JSON string: {:?}",
            expected, json
        )));
    }
    Ok(())
}
