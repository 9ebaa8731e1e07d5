//! Decoder for serialized wait conditions
//!
//! Every condition kind is registered here and nowhere else.

use tracing::trace;

use crate::combined::CombinedCondition;
use crate::conditions::{
    FirstFrameRasterizedCondition, NoPendingFrameCondition, NoTransientCallbacksCondition,
    WaitCondition,
};
use crate::errors::SerializationError;
use crate::types::{SerializedCondition, CONDITION_NAME_KEY};

/// Discriminators the decoder accepts.
pub const KNOWN_CONDITIONS: [&str; 4] = [
    NoTransientCallbacksCondition::CONDITION_NAME,
    NoPendingFrameCondition::CONDITION_NAME,
    FirstFrameRasterizedCondition::CONDITION_NAME,
    CombinedCondition::CONDITION_NAME,
];

/// Decodes a serialized condition by its `conditionName` discriminator.
pub fn deserialize_condition(
    json: &SerializedCondition,
) -> Result<WaitCondition, SerializationError> {
    let condition_name = json.get(CONDITION_NAME_KEY).map(String::as_str);
    let condition = match condition_name {
        Some(NoTransientCallbacksCondition::CONDITION_NAME) => {
            NoTransientCallbacksCondition::deserialize(json)?.into()
        }
        Some(NoPendingFrameCondition::CONDITION_NAME) => {
            NoPendingFrameCondition::deserialize(json)?.into()
        }
        Some(FirstFrameRasterizedCondition::CONDITION_NAME) => {
            FirstFrameRasterizedCondition::deserialize(json)?.into()
        }
        Some(CombinedCondition::CONDITION_NAME) => CombinedCondition::deserialize(json)?.into(),
        other => {
            return Err(SerializationError::new(format!(
                "Unsupported wait condition {} in the JSON string {:?}",
                other.unwrap_or("null"),
                json
            )))
        }
    };
    trace!(%condition, "decoded wait condition");
    Ok(condition)
}

/// Decodes a condition from its JSON text.
pub fn condition_from_json(raw: &str) -> Result<WaitCondition, SerializationError> {
    let json: SerializedCondition = serde_json::from_str(raw)?;
    deserialize_condition(&json)
}

/// Encodes a condition as JSON text.
pub fn condition_to_json(condition: &WaitCondition) -> String {
    serde_json::to_string(&condition.serialize()).unwrap_or_else(|_| "{}".to_string())
}
