// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! pb-conventions: address messages by their type
//!
//! A `Conventions` table derives the channel and topic of a value from its
//! type, so callers publish and subscribe with values instead of strings.

mod conventions;
mod conventions_box;
mod error;

pub use conventions::{Conventions, FallbackRule, Rule};
pub use conventions_box::{ConventionsBox, ConventionsExt};
pub use error::ConventionsError;
