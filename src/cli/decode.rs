use anyhow::{Context, Result};
use clap::Args;
use settle_driver::command::COMMAND_KEY;
use settle_driver::WaitForCondition;
use settle_wait_conditions::{deserialize_condition, SerializedCondition, WaitCondition};

use super::runtime::read_input;

#[derive(Args, Clone, Debug)]
pub struct DecodeArgs {
    /// Command or bare condition JSON, or `-` to read stdin
    #[arg(default_value = "-")]
    pub input: String,
}

pub async fn cmd_decode(args: DecodeArgs) -> Result<()> {
    let raw = read_input(&args.input).await?;
    let payload: SerializedCondition = serde_json::from_str(raw.trim())
        .context("Payload must be a JSON object with string values")?;

    let (condition, timeout) = if payload.contains_key(COMMAND_KEY) {
        let command = WaitForCondition::deserialize(&payload)?;
        (command.condition, command.timeout)
    } else {
        (deserialize_condition(&payload)?, None)
    };

    if let Some(timeout) = timeout {
        println!("timeout: {}ms", timeout.as_millis());
    }
    print!("{}", render_tree(&condition));
    Ok(())
}

/// One line per condition, children indented under their parent.
pub fn render_tree(condition: &WaitCondition) -> String {
    let mut out = String::new();
    write_node(&mut out, condition, 0);
    out
}

fn write_node(out: &mut String, condition: &WaitCondition, depth: usize) {
    out.push_str(&"  ".repeat(depth));
    out.push_str(condition.condition_name());
    out.push('\n');
    if let WaitCondition::Combined(combined) = condition {
        for child in combined.conditions() {
            write_node(out, child, depth + 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use settle_wait_conditions::{
        CombinedCondition, FirstFrameRasterizedCondition, NoPendingFrameCondition,
    };

    #[test]
    fn test_render_tree_indents_children() {
        let condition = WaitCondition::from(CombinedCondition::new(vec![
            NoPendingFrameCondition::new().into(),
            CombinedCondition::new(vec![FirstFrameRasterizedCondition::new().into()]).into(),
        ]));
        assert_eq!(
            render_tree(&condition),
            "CombinedCondition\n  NoPendingFrameCondition\n  CombinedCondition\n    FirstFrameRasterizedCondition\n"
        );
    }
}
