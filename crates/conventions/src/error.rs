// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use pb_bus::PublishError;
use pb_core::PatternField;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConventionsError {
    #[error("no {field} convention for {type_name}")]
    Missing {
        type_name: &'static str,
        field: PatternField,
    },
    #[error(transparent)]
    Publish(#[from] PublishError),
}
