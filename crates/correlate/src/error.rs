// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use pb_bus::SubscribeError;
use thiserror::Error;

/// Errors building a composite subscription
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompositionError {
    #[error("a composition needs at least two entries, found {found}")]
    TooFewEntries { found: usize },
    #[error(transparent)]
    Subscribe(#[from] SubscribeError),
    #[error("a time window needs a tokio runtime to host its timer")]
    NoRuntime,
}
