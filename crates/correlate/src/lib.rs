// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! pb-correlate: composite subscriptions over a message box
//!
//! A composite fires one callback after each of a set of (channel, topic)
//! entries has been observed, optionally within a time window. Any unrelated
//! publish observed while the composite is partially matched resets it.
//!
//! ```ignore
//! let sub = bus
//!     .when("orders", "created")
//!     .and("payments", "settled")
//!     .in_time(Duration::from_secs(5))
//!     .subscribe(|env: &Envelope| println!("{:?}", env))?;
//! ```

mod builder;
mod engine;
mod error;
mod state;

pub use builder::{Composition, Correlate};
pub use engine::{CompositeStatus, CompositeSubscription};
pub use error::CompositionError;
pub use state::{CompositeEffect, CompositeEvent, CompositePhase, CompositeState, ResetReason};
