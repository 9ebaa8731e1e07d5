//! Conjunction of wait conditions

use settle_frame_probe::SchedulerProbe;
use tracing::debug;

use crate::conditions::{expect_condition_name, WaitCondition};
use crate::decoder::deserialize_condition;
use crate::errors::SerializationError;
use crate::types::{SerializedCondition, CONDITIONS_KEY, CONDITION_NAME_KEY};

/// Holds when every child condition holds at the same time.
///
/// Children keep their declared order through serialization. Order never
/// changes the truth value, only the order children are awaited in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CombinedCondition {
    conditions: Vec<WaitCondition>,
}

impl CombinedCondition {
    pub const CONDITION_NAME: &'static str = "CombinedCondition";

    pub fn new(conditions: Vec<WaitCondition>) -> Self {
        Self { conditions }
    }

    pub fn conditions(&self) -> &[WaitCondition] {
        &self.conditions
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Evaluates every child, without short-circuiting. An empty
    /// combination is vacuously satisfied.
    pub fn is_satisfied(&self, probe: &dyn SchedulerProbe) -> bool {
        self.conditions
            .iter()
            .fold(true, |all, condition| condition.is_satisfied(probe) & all)
    }

    /// Awaits every child in declared order, one after another, and repeats
    /// the whole pass until a combined check succeeds.
    ///
    /// Children already satisfied are still awaited on each pass, so an
    /// earlier child regressing while a later one is pending is caught by the
    /// next pass.
    pub async fn wait(&self, probe: &dyn SchedulerProbe) {
        let mut passes = 0u32;
        while !self.is_satisfied(probe) {
            for condition in &self.conditions {
                condition.wait(probe).await;
            }
            passes += 1;
            debug!(
                condition = Self::CONDITION_NAME,
                children = self.conditions.len(),
                passes,
                "combined wait pass finished"
            );
        }
    }

    pub fn serialize(&self) -> SerializedCondition {
        let children: Vec<SerializedCondition> =
            self.conditions.iter().map(WaitCondition::serialize).collect();
        let children = serde_json::to_string(&children).unwrap_or_else(|_| "[]".to_string());

        SerializedCondition::from([
            (
                CONDITION_NAME_KEY.to_string(),
                Self::CONDITION_NAME.to_string(),
            ),
            (CONDITIONS_KEY.to_string(), children),
        ])
    }

    /// Decodes a combined condition. A missing or `null` children field
    /// yields an empty combination.
    pub fn deserialize(json: &SerializedCondition) -> Result<Self, SerializationError> {
        expect_condition_name(json, Self::CONDITION_NAME)?;

        let Some(raw) = json.get(CONDITIONS_KEY) else {
            return Ok(Self::default());
        };
        let children: Option<Vec<SerializedCondition>> =
            serde_json::from_str(raw).map_err(|err| {
                SerializationError::new(format!(
                    "Invalid {} field in the {} JSON string {:?}: {}",
                    CONDITIONS_KEY,
                    Self::CONDITION_NAME,
                    json,
                    err
                ))
            })?;

        children
            .unwrap_or_default()
            .iter()
            .map(deserialize_condition)
            .collect::<Result<Vec<_>, _>>()
            .map(Self::new)
    }
}

impl FromIterator<WaitCondition> for CombinedCondition {
    fn from_iter<I: IntoIterator<Item = WaitCondition>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
