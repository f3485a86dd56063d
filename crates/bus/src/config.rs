// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Message box configuration

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How many synchronous delivery failures a publisher gets back
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureReport {
    /// Every failed delivery, in invocation order
    #[default]
    All,
    /// Only the first failure; the rest are still logged
    First,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoxConfig {
    /// Label attached to publish spans
    pub name: String,
    pub failure_report: FailureReport,
    /// Upper bound on how long `shutdown` waits for async deliveries
    #[serde(with = "humantime_serde")]
    pub drain_timeout: Duration,
}

impl Default for BoxConfig {
    fn default() -> Self {
        Self {
            name: "postbox".to_string(),
            failure_report: FailureReport::All,
            drain_timeout: Duration::from_secs(5),
        }
    }
}

impl BoxConfig {
    /// Parse from TOML; missing keys keep their defaults
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(input)?)
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
