use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::decimal::MONEY_SCALE;
use crate::errors::{LoanError, Result};

/// environment variable overriding the tracing filter
pub const LOG_ENV_VAR: &str = "LOAN_LEDGER_LOG";

/// how sharing a loan with a user who already holds it is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SharePolicy {
    /// duplicate shares succeed without changing the owner set
    #[default]
    AppendIfAbsent,
    /// duplicate shares fail with `AlreadyShared`
    Strict,
}

/// ledger configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// tracing `EnvFilter` directive
    pub log_filter: String,
    /// decimal places money is rounded to in rendered views
    pub display_decimal_places: u32,
    pub share_policy: SharePolicy,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            log_filter: "loan_ledger_rs=info".to_string(),
            display_decimal_places: 2,
            share_policy: SharePolicy::AppendIfAbsent,
        }
    }
}

impl LedgerConfig {
    /// configuration that rejects duplicate shares
    pub fn strict() -> Self {
        Self {
            share_policy: SharePolicy::Strict,
            ..Self::default()
        }
    }

    /// parse from json, missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// load from a json file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// apply `LOAN_LEDGER_LOG` when set
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(filter) = std::env::var(LOG_ENV_VAR) {
            if !filter.trim().is_empty() {
                self.log_filter = filter;
            }
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.display_decimal_places > MONEY_SCALE {
            return Err(LoanError::InvalidConfiguration {
                message: format!(
                    "display_decimal_places {} exceeds money scale {}",
                    self.display_decimal_places, MONEY_SCALE
                ),
            });
        }

        if self.log_filter.trim().is_empty() {
            return Err(LoanError::InvalidConfiguration {
                message: "log_filter must not be empty".to_string(),
            });
        }

        Ok(())
    }
}
