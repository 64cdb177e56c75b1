use crate::core::constants::APPROVED_EVENT;
use crate::error::Result;
use serde::Deserialize;
use std::time::Duration;

/// Runtime settings for deploy/approve flows.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EscrowConfig {
    /// Blocks to wait for after an approval is mined
    pub confirmations: u64,

    /// Contract event that marks an escrow as released
    pub approved_event: String,

    /// Upper bound on the confirmation wait. `None` waits indefinitely.
    pub confirmation_timeout_secs: Option<u64>,
}

impl Default for EscrowConfig {
    fn default() -> Self {
        Self {
            confirmations: 1,
            approved_event: APPROVED_EVENT.to_string(),
            confirmation_timeout_secs: None,
        }
    }
}

impl EscrowConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from JSON; missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_confirmations(mut self, confirmations: u64) -> Self {
        self.confirmations = confirmations;
        self
    }

    pub fn with_approved_event(mut self, name: impl Into<String>) -> Self {
        self.approved_event = name.into();
        self
    }

    pub fn with_confirmation_timeout(mut self, secs: u64) -> Self {
        self.confirmation_timeout_secs = Some(secs);
        self
    }

    pub fn confirmation_timeout(&self) -> Option<Duration> {
        self.confirmation_timeout_secs.map(Duration::from_secs)
    }
}
