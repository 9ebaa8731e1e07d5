//! Target-side handler for wait commands
//!
//! Decodes the command, awaits its condition against the probe and imposes
//! the deadline. Timing out drops the in-flight wait.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use settle_frame_probe::SchedulerProbe;
use settle_wait_conditions::SerializedCondition;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::command::WaitForCondition;
use crate::config::DriverConfig;
use crate::errors::DriverError;

/// Outcome of a satisfied wait command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaitReport {
    /// Rendered condition tree
    pub condition: String,

    pub started_at: DateTime<Utc>,

    pub latency_ms: u64,

    /// Deadline the wait ran under
    pub timeout_ms: u64,
}

pub struct WaitHandler {
    probe: Arc<dyn SchedulerProbe>,
    default_timeout: Duration,
}

impl WaitHandler {
    pub fn new(probe: Arc<dyn SchedulerProbe>, default_timeout: Duration) -> Self {
        Self {
            probe,
            default_timeout,
        }
    }

    pub fn from_config(probe: Arc<dyn SchedulerProbe>, config: &DriverConfig) -> Self {
        Self::new(probe, config.default_timeout())
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Waits for the command's condition under its deadline.
    pub async fn handle(&self, command: &WaitForCondition) -> Result<WaitReport, DriverError> {
        let started_at = Utc::now();
        let start_instant = Instant::now();
        let deadline = command.timeout.unwrap_or(self.default_timeout);
        let timeout_ms = deadline.as_millis() as u64;
        let condition = command.condition.to_string();

        info!(
            condition = %condition,
            timeout_ms,
            "Executing waitForCondition"
        );

        if timeout(deadline, command.condition.wait(&*self.probe))
            .await
            .is_err()
        {
            warn!(condition = %condition, timeout_ms, "Wait timed out");
            return Err(DriverError::Timeout {
                condition,
                timeout_ms,
            });
        }

        let latency_ms = start_instant.elapsed().as_millis() as u64;
        debug!(condition = %condition, latency_ms, "Wait condition met");

        Ok(WaitReport {
            condition,
            started_at,
            latency_ms,
            timeout_ms,
        })
    }

    /// Decodes a wire map into a command and handles it.
    pub async fn handle_payload(
        &self,
        payload: &SerializedCondition,
    ) -> Result<WaitReport, DriverError> {
        let command = WaitForCondition::deserialize(payload).map_err(|err| {
            warn!("Rejected wait command: {}", err);
            err
        })?;
        self.handle(&command).await
    }

    /// Decodes JSON text into a command and handles it.
    pub async fn handle_json(&self, raw: &str) -> Result<WaitReport, DriverError> {
        let payload: SerializedCondition = serde_json::from_str(raw)?;
        self.handle_payload(&payload).await
    }
}
