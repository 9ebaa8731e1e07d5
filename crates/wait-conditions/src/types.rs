//! Wire-level types shared by every condition kind

use std::collections::BTreeMap;

/// Flat string map a condition serializes to.
///
/// Composite conditions embed their children as a JSON-encoded string value.
pub type SerializedCondition = BTreeMap<String, String>;

/// Discriminator key present in every serialized condition.
pub const CONDITION_NAME_KEY: &str = "conditionName";

/// Key holding the JSON-encoded children of a combined condition.
pub const CONDITIONS_KEY: &str = "conditions";
