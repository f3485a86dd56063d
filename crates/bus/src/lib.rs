// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! pb-bus: in-process publish/subscribe
//!
//! This crate provides:
//! - `MessageBox` - subscribe by (channel, topic) pattern, publish sync or async
//! - `SubscriptionRegistry` - the read-mostly store behind every box
//! - Failure isolation for callbacks, with an `ErrorSink` for async failures
//! - Fluent routes and a `Stream` view over subscriptions

mod config;
mod dispatch;
mod error;
mod message_box;
mod registry;
mod route;
mod stream;
mod subscription;

pub use config::{BoxConfig, FailureReport};
pub use dispatch::{
    filter, handler, invoke, BoxError, DispatchFailure, ErrorSink, Filter, Handler,
    HandlerError, IntoHandlerResult, MemorySink, TracingSink,
};
pub use error::{ConfigError, PublishError, ShutdownError, SubscribeError};
pub use message_box::{BoxDeps, MessageBox};
pub use registry::{Delivery, SubscriptionEntry, SubscriptionRegistry};
pub use route::{ChannelRoute, Route};
pub use stream::{EnvelopeStream, Observable};
pub use subscription::Subscription;

pub use pb_core::{Envelope, SubscriptionId, SubscriptionPattern};
