use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use settle_driver::WaitForCondition;
use settle_wait_conditions::{
    deserialize_condition, CombinedCondition, SerializedCondition, WaitCondition,
    CONDITION_NAME_KEY, KNOWN_CONDITIONS,
};
use tracing::debug;

#[derive(Args, Clone, Debug)]
pub struct EncodeArgs {
    /// Condition tags; more than one builds a CombinedCondition
    #[arg(required = true, value_name = "TAG")]
    pub conditions: Vec<String>,

    /// Per-command timeout in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Pretty-print the command
    #[arg(long)]
    pub pretty: bool,
}

pub async fn cmd_encode(args: EncodeArgs) -> Result<()> {
    let mut conditions = args
        .conditions
        .iter()
        .map(|tag| condition_from_tag(tag))
        .collect::<Result<Vec<_>>>()?;

    let condition = if conditions.len() == 1 {
        conditions.remove(0)
    } else {
        CombinedCondition::new(conditions).into()
    };
    debug!(%condition, "encoding wait command");

    let mut command = WaitForCondition::new(condition);
    if let Some(timeout_ms) = args.timeout_ms {
        command = command.with_timeout(Duration::from_millis(timeout_ms));
    }

    let output = if args.pretty {
        serde_json::to_string_pretty(&command.serialize())?
    } else {
        command.to_json()
    };
    println!("{}", output);
    Ok(())
}

fn condition_from_tag(tag: &str) -> Result<WaitCondition> {
    let payload = SerializedCondition::from([(CONDITION_NAME_KEY.to_string(), tag.to_string())]);
    deserialize_condition(&payload).with_context(|| {
        format!(
            "Unknown condition tag {}; expected one of: {}",
            tag,
            KNOWN_CONDITIONS.join(", ")
        )
    })
}
