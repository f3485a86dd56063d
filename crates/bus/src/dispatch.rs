// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Callback invocation and failure isolation
//!
//! Every subscriber runs behind `catch_unwind`, so one failing or panicking
//! callback never keeps the remaining subscribers of a publish from running.
//! Synchronous failures are returned to the publisher; asynchronous ones go to
//! an [`ErrorSink`].

use pb_core::{Envelope, SubscriptionId};
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Boxed error a subscriber may return
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Normalized subscriber callback
pub type Handler = Arc<dyn Fn(&Envelope) -> Result<(), HandlerError> + Send + Sync>;

/// Predicate deciding whether a matched envelope is delivered
pub type Filter = Arc<dyn Fn(&Envelope) -> bool + Send + Sync>;

/// Why a single subscriber invocation failed
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("subscriber failed: {0}")]
    Failed(BoxError),
    #[error("subscriber panicked: {0}")]
    Panicked(String),
}

impl HandlerError {
    pub fn failed(error: impl Into<BoxError>) -> Self {
        HandlerError::Failed(error.into())
    }
}

/// Return types accepted from subscriber callbacks: `()` or `Result<(), E>`
pub trait IntoHandlerResult {
    fn into_handler_result(self) -> Result<(), HandlerError>;
}

impl IntoHandlerResult for () {
    fn into_handler_result(self) -> Result<(), HandlerError> {
        Ok(())
    }
}

impl<E: Into<BoxError>> IntoHandlerResult for Result<(), E> {
    fn into_handler_result(self) -> Result<(), HandlerError> {
        self.map_err(HandlerError::failed)
    }
}

/// Wrap a user callback into a [`Handler`]
pub fn handler<F, R>(callback: F) -> Handler
where
    F: Fn(&Envelope) -> R + Send + Sync + 'static,
    R: IntoHandlerResult,
{
    Arc::new(move |envelope: &Envelope| callback(envelope).into_handler_result())
}

/// Wrap a user predicate into a [`Filter`]
pub fn filter<P>(predicate: P) -> Filter
where
    P: Fn(&Envelope) -> bool + Send + Sync + 'static,
{
    Arc::new(predicate)
}

/// Run a handler, turning a panic into [`HandlerError::Panicked`]
pub fn invoke(handler: &Handler, envelope: &Envelope) -> Result<(), HandlerError> {
    match panic::catch_unwind(AssertUnwindSafe(|| handler(envelope))) {
        Ok(result) => result,
        Err(payload) => Err(HandlerError::Panicked(panic_message(payload.as_ref()))),
    }
}

/// Evaluate a filter; a panicking filter counts as a failed delivery
pub(crate) fn accepts(filter: &Filter, envelope: &Envelope) -> Result<bool, HandlerError> {
    panic::catch_unwind(AssertUnwindSafe(|| filter(envelope)))
        .map_err(|payload| HandlerError::Panicked(panic_message(payload.as_ref())))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        return (*s).to_string();
    }
    if let Some(s) = payload.downcast_ref::<String>() {
        return s.clone();
    }
    "non-string panic payload".to_string()
}

/// One failed delivery of one publish
#[derive(Debug)]
pub struct DispatchFailure {
    pub subscription: SubscriptionId,
    pub channel: String,
    pub topic: String,
    pub sequence: u64,
    pub error: HandlerError,
}

impl DispatchFailure {
    pub fn new(subscription: SubscriptionId, envelope: &Envelope, error: HandlerError) -> Self {
        Self {
            subscription,
            channel: envelope.channel().to_string(),
            topic: envelope.topic().to_string(),
            sequence: envelope.sequence(),
            error,
        }
    }
}

impl fmt::Display for DispatchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} on {}/{}: {}",
            self.subscription, self.channel, self.topic, self.error
        )
    }
}

/// Out-of-band destination for failures nobody is waiting on
pub trait ErrorSink: Send + Sync {
    fn report(&self, failure: DispatchFailure);
}

/// Default sink: log each failure at error level
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl ErrorSink for TracingSink {
    fn report(&self, failure: DispatchFailure) {
        tracing::error!(
            subscription = %failure.subscription,
            channel = %failure.channel,
            topic = %failure.topic,
            sequence = failure.sequence,
            error = %failure.error,
            "async delivery failed"
        );
    }
}

/// Sink that keeps failures in memory for later inspection
#[derive(Debug, Default)]
pub struct MemorySink {
    failures: Mutex<Vec<DispatchFailure>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove and return everything reported so far
    pub fn take(&self) -> Vec<DispatchFailure> {
        let mut failures = self.failures.lock().unwrap_or_else(|e| e.into_inner());
        std::mem::take(&mut *failures)
    }
}

impl ErrorSink for MemorySink {
    fn report(&self, failure: DispatchFailure) {
        self.failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(failure);
    }
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
