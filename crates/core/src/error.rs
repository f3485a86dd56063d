// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types shared across the bus crates

use crate::pattern::PatternField;
use thiserror::Error;

/// A subscription pattern that can never be registered
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("{field} pattern must not be empty")]
    Empty { field: PatternField },
}
