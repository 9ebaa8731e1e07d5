//! `waitForCondition` command envelope
//!
//! The condition payload is flattened into the command map next to the
//! `command` and optional `timeout` keys, so a command on the wire looks like
//! `{"command": "waitForCondition", "timeout": "500", "conditionName": ...}`.

use std::time::Duration;

use settle_wait_conditions::{
    deserialize_condition, FirstFrameRasterizedCondition, NoPendingFrameCondition,
    NoTransientCallbacksCondition, SerializedCondition, WaitCondition,
};

use crate::errors::DriverError;

pub const COMMAND_KEY: &str = "command";
pub const TIMEOUT_KEY: &str = "timeout";

pub const WAIT_FOR_CONDITION: &str = "waitForCondition";

/// Older single-condition commands, still accepted on decode.
pub const LEGACY_NO_TRANSIENT_CALLBACKS: &str = "waitUntilNoTransientCallbacks";
pub const LEGACY_NO_PENDING_FRAME: &str = "waitUntilNoPendingFrame";
pub const LEGACY_FIRST_FRAME_RASTERIZED: &str = "waitUntilFirstFrameRasterized";

/// Asks the target to wait until `condition` holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitForCondition {
    pub condition: WaitCondition,

    /// Per-command deadline. Falls back to the handler default when unset.
    pub timeout: Option<Duration>,
}

impl WaitForCondition {
    pub fn new(condition: impl Into<WaitCondition>) -> Self {
        Self {
            condition: condition.into(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn until_no_transient_callbacks() -> Self {
        Self::new(NoTransientCallbacksCondition::new())
    }

    pub fn until_no_pending_frame() -> Self {
        Self::new(NoPendingFrameCondition::new())
    }

    pub fn until_first_frame_rasterized() -> Self {
        Self::new(FirstFrameRasterizedCondition::new())
    }

    pub fn serialize(&self) -> SerializedCondition {
        let mut json = self.condition.serialize();
        json.insert(COMMAND_KEY.to_string(), WAIT_FOR_CONDITION.to_string());
        if let Some(timeout) = self.timeout {
            json.insert(TIMEOUT_KEY.to_string(), timeout.as_millis().to_string());
        }
        json
    }

    pub fn deserialize(json: &SerializedCondition) -> Result<Self, DriverError> {
        let condition = match json.get(COMMAND_KEY).map(String::as_str) {
            Some(WAIT_FOR_CONDITION) => deserialize_condition(json)?,
            Some(LEGACY_NO_TRANSIENT_CALLBACKS) => NoTransientCallbacksCondition::new().into(),
            Some(LEGACY_NO_PENDING_FRAME) => NoPendingFrameCondition::new().into(),
            Some(LEGACY_FIRST_FRAME_RASTERIZED) => FirstFrameRasterizedCondition::new().into(),
            other => {
                return Err(DriverError::InvalidCommand(format!(
                    "unsupported command {}",
                    other.unwrap_or("null")
                )))
            }
        };

        Ok(Self {
            condition,
            timeout: parse_timeout(json)?,
        })
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.serialize()).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn from_json(raw: &str) -> Result<Self, DriverError> {
        let json: SerializedCondition = serde_json::from_str(raw)?;
        Self::deserialize(&json)
    }
}

fn parse_timeout(json: &SerializedCondition) -> Result<Option<Duration>, DriverError> {
    let Some(raw) = json.get(TIMEOUT_KEY) else {
        return Ok(None);
    };
    raw.trim()
        .parse::<u64>()
        .map(|millis| Some(Duration::from_millis(millis)))
        .map_err(|err| DriverError::InvalidCommand(format!("invalid timeout {:?}: {}", raw, err)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use settle_wait_conditions::{CombinedCondition, CONDITIONS_KEY, CONDITION_NAME_KEY};

    #[test]
    fn test_serialize_flattens_condition() {
        let command = WaitForCondition::new(CombinedCondition::new(vec![
            NoPendingFrameCondition::new().into(),
        ]))
        .with_timeout(Duration::from_millis(750));
        let json = command.serialize();

        assert_eq!(json[COMMAND_KEY], WAIT_FOR_CONDITION);
        assert_eq!(json[TIMEOUT_KEY], "750");
        assert_eq!(json[CONDITION_NAME_KEY], "CombinedCondition");
        assert!(json.contains_key(CONDITIONS_KEY));
    }

    #[test]
    fn test_round_trip() {
        let command = WaitForCondition::until_first_frame_rasterized()
            .with_timeout(Duration::from_secs(2));
        let decoded = WaitForCondition::deserialize(&command.serialize()).unwrap();
        assert_eq!(decoded, command);

        let decoded = WaitForCondition::from_json(&command.to_json()).unwrap();
        assert_eq!(decoded, command);
    }

    #[test]
    fn test_timeout_is_optional() {
        let json = WaitForCondition::until_no_pending_frame().serialize();
        assert!(!json.contains_key(TIMEOUT_KEY));
        assert_eq!(WaitForCondition::deserialize(&json).unwrap().timeout, None);
    }

    #[test]
    fn test_legacy_commands_map_to_leaves() {
        let cases = [
            (
                LEGACY_NO_TRANSIENT_CALLBACKS,
                WaitForCondition::until_no_transient_callbacks(),
            ),
            (
                LEGACY_NO_PENDING_FRAME,
                WaitForCondition::until_no_pending_frame(),
            ),
            (
                LEGACY_FIRST_FRAME_RASTERIZED,
                WaitForCondition::until_first_frame_rasterized(),
            ),
        ];
        for (name, expected) in cases {
            let json = SerializedCondition::from([
                (COMMAND_KEY.to_string(), name.to_string()),
                (TIMEOUT_KEY.to_string(), "100".to_string()),
            ]);
            let decoded = WaitForCondition::deserialize(&json).unwrap();
            assert_eq!(decoded.condition, expected.condition);
            assert_eq!(decoded.timeout, Some(Duration::from_millis(100)));
        }
    }

    #[test]
    fn test_unknown_command_rejected() {
        let json = SerializedCondition::from([(COMMAND_KEY.to_string(), "tap".to_string())]);
        match WaitForCondition::deserialize(&json) {
            Err(DriverError::InvalidCommand(message)) => assert!(message.contains("tap")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_bad_timeout_rejected() {
        let mut json = WaitForCondition::until_no_pending_frame().serialize();
        json.insert(TIMEOUT_KEY.to_string(), "soon".to_string());
        assert!(matches!(
            WaitForCondition::deserialize(&json),
            Err(DriverError::InvalidCommand(_))
        ));
    }

    #[test]
    fn test_unknown_condition_surfaces_serialization_error() {
        let json = SerializedCondition::from([
            (COMMAND_KEY.to_string(), WAIT_FOR_CONDITION.to_string()),
            (CONDITION_NAME_KEY.to_string(), "Bogus".to_string()),
        ]);
        match WaitForCondition::deserialize(&json) {
            Err(DriverError::Serialization(err)) => {
                assert!(err.message().unwrap().contains("Bogus"))
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_non_string_payload_is_json_error() {
        assert!(matches!(
            WaitForCondition::from_json(r#"{"command":"waitForCondition","timeout":5}"#),
            Err(DriverError::Json(_))
        ));
    }
}
