// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the message box

use crate::dispatch::DispatchFailure;
use pb_core::PatternError;
use thiserror::Error;

/// Errors rejected at subscribe time
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubscribeError {
    #[error(transparent)]
    Pattern(#[from] PatternError),
}

/// Errors surfaced to a publisher
#[derive(Debug, Error)]
pub enum PublishError {
    #[error(
        "{} subscriber delivery failure(s); first: {}",
        .failures.len(),
        .failures.first().map(ToString::to_string).unwrap_or_default()
    )]
    Handlers { failures: Vec<DispatchFailure> },
    #[error("message box is shut down")]
    Closed,
    #[error("no tokio runtime available for async dispatch")]
    NoRuntime,
}

impl PublishError {
    /// Failed deliveries carried by this error, if any
    pub fn failures(&self) -> &[DispatchFailure] {
        match self {
            PublishError::Handlers { failures } => failures,
            PublishError::Closed | PublishError::NoRuntime => &[],
        }
    }
}

#[derive(Debug, Error)]
pub enum ShutdownError {
    #[error("timed out draining {pending} pending async deliveries")]
    DrainTimedOut { pending: usize },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid message box config: {0}")]
    Parse(#[from] toml::de::Error),
}
