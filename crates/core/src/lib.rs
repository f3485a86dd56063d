// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! pb-core: shared vocabulary for the postbox message bus
//!
//! This crate provides:
//! - `Envelope` - the immutable wrapper every publish travels in
//! - `Pattern` / `SubscriptionPattern` - channel/topic matching
//! - Clock and id abstractions so timestamps and handles are testable

pub mod clock;
pub mod envelope;
pub mod error;
pub mod id;
pub mod pattern;

pub use clock::{Clock, FakeClock, SystemClock};
pub use envelope::{Envelope, Payload};
pub use error::PatternError;
pub use id::{IdGen, SequentialIdGen, SubscriptionId, UuidIdGen};
pub use pattern::{Pattern, PatternField, SubscriptionPattern};
