// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The message box: subscribe, publish, publish_async
//!
//! A `MessageBox` is an explicitly constructed value; clones share the same
//! registry. Independent boxes never see each other's subscriptions.

use crate::config::{BoxConfig, FailureReport};
use crate::dispatch::{self, DispatchFailure, ErrorSink, Filter, Handler, IntoHandlerResult};
use crate::error::{PublishError, ShutdownError, SubscribeError};
use crate::registry::{Delivery, SubscriptionRegistry};
use crate::subscription::Subscription;
use crate::TracingSink;
use pb_core::{Clock, Envelope, IdGen, Payload, SubscriptionPattern, SystemClock, UuidIdGen};
use std::any::Any;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::Notify;

/// Collaborators a message box is built from
pub struct BoxDeps<C: Clock, I: IdGen> {
    pub clock: C,
    pub ids: I,
    /// Receives failures from async deliveries
    pub sink: Arc<dyn ErrorSink>,
    /// Runtime hosting async deliveries and composite timers; when unset the
    /// runtime current at call time is used
    pub runtime: Option<Handle>,
}

impl<C: Clock, I: IdGen> BoxDeps<C, I> {
    pub fn new(clock: C, ids: I) -> Self {
        Self {
            clock,
            ids,
            sink: Arc::new(TracingSink),
            runtime: None,
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn ErrorSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }
}

impl Default for BoxDeps<SystemClock, UuidIdGen> {
    fn default() -> Self {
        Self::new(SystemClock, UuidIdGen)
    }
}

struct Shared<C: Clock, I: IdGen> {
    config: BoxConfig,
    registry: Arc<SubscriptionRegistry<I>>,
    clock: C,
    sink: Arc<dyn ErrorSink>,
    runtime: Option<Handle>,
    sequence: AtomicU64,
    in_flight: AtomicUsize,
    idle: Notify,
    closed: AtomicBool,
}

impl<C: Clock, I: IdGen> Shared<C, I> {
    /// Offer the envelope to every matching subscription, in the calling thread
    fn dispatch(&self, envelope: &Envelope) -> Vec<DispatchFailure> {
        let matches = self
            .registry
            .find_matching(envelope.channel(), envelope.topic());
        let mut failures = Vec::new();

        for entry in matches {
            match entry.deliver(envelope) {
                Delivery::Delivered => {
                    tracing::trace!(id = %entry.id(), "delivered");
                }
                Delivery::Failed(error) => {
                    failures.push(DispatchFailure::new(entry.id().clone(), envelope, error));
                }
                Delivery::Filtered | Delivery::Inactive => {}
            }
        }

        failures
    }

    fn finish_async(&self) {
        if self.in_flight.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.idle.notify_waiters();
        }
    }
}

/// Decrements the in-flight count even if a sink panics
struct InFlight<C: Clock, I: IdGen>(Arc<Shared<C, I>>);

impl<C: Clock, I: IdGen> Drop for InFlight<C, I> {
    fn drop(&mut self) {
        self.0.finish_async();
    }
}

/// In-process publish/subscribe bus addressed by (channel, topic)
pub struct MessageBox<C: Clock = SystemClock, I: IdGen = UuidIdGen> {
    shared: Arc<Shared<C, I>>,
}

impl<C: Clock, I: IdGen> Clone for MessageBox<C, I> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl MessageBox {
    pub fn new() -> Self {
        Self::with_config(BoxConfig::default())
    }

    pub fn with_config(config: BoxConfig) -> Self {
        Self::with_deps(config, BoxDeps::default())
    }
}

impl Default for MessageBox {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock, I: IdGen> MessageBox<C, I> {
    pub fn with_deps(config: BoxConfig, deps: BoxDeps<C, I>) -> Self {
        Self {
            shared: Arc::new(Shared {
                config,
                registry: Arc::new(SubscriptionRegistry::new(deps.ids)),
                clock: deps.clock,
                sink: deps.sink,
                runtime: deps.runtime,
                sequence: AtomicU64::new(1),
                in_flight: AtomicUsize::new(0),
                idle: Notify::new(),
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Subscribe a callback to every envelope matching the patterns
    pub fn subscribe<F, R>(
        &self,
        channel: &str,
        topic: &str,
        callback: F,
    ) -> Result<Subscription, SubscribeError>
    where
        F: Fn(&Envelope) -> R + Send + Sync + 'static,
        R: IntoHandlerResult,
    {
        let pattern = SubscriptionPattern::new(channel, topic)?;
        Ok(self.subscribe_handler(pattern, None, dispatch::handler(callback)))
    }

    /// Like `subscribe`, delivering only envelopes the filter accepts
    pub fn subscribe_if<P, F, R>(
        &self,
        channel: &str,
        topic: &str,
        filter: P,
        callback: F,
    ) -> Result<Subscription, SubscribeError>
    where
        P: Fn(&Envelope) -> bool + Send + Sync + 'static,
        F: Fn(&Envelope) -> R + Send + Sync + 'static,
        R: IntoHandlerResult,
    {
        let pattern = SubscriptionPattern::new(channel, topic)?;
        Ok(self.subscribe_handler(
            pattern,
            Some(dispatch::filter(filter)),
            dispatch::handler(callback),
        ))
    }

    /// Subscribe to payloads of type `T`; other payloads are skipped
    pub fn subscribe_data<T, F, R>(
        &self,
        channel: &str,
        topic: &str,
        callback: F,
    ) -> Result<Subscription, SubscribeError>
    where
        T: Any + Send + Sync,
        F: Fn(&T) -> R + Send + Sync + 'static,
        R: IntoHandlerResult,
    {
        let pattern = SubscriptionPattern::new(channel, topic)?;
        let filter: Filter = Arc::new(|envelope: &Envelope| envelope.is::<T>());
        let handler: Handler = Arc::new(move |envelope: &Envelope| match envelope.data::<T>() {
            Some(value) => callback(value).into_handler_result(),
            None => Ok(()),
        });
        Ok(self.subscribe_handler(pattern, Some(filter), handler))
    }

    /// Register an already-normalized handler under a validated pattern
    pub fn subscribe_handler(
        &self,
        pattern: SubscriptionPattern,
        filter: Option<Filter>,
        handler: Handler,
    ) -> Subscription {
        self.shared.registry.add(pattern, filter, handler)
    }

    /// Deliver to every matching subscriber before returning
    ///
    /// All matched subscribers run even if some fail; the failures come back
    /// together as [`PublishError::Handlers`] (trimmed to the first one when
    /// configured with [`FailureReport::First`]).
    pub fn publish(
        &self,
        channel: &str,
        topic: &str,
        data: impl Any + Send + Sync,
    ) -> Result<(), PublishError> {
        self.publish_payload(channel, topic, Arc::new(data))
    }

    pub fn publish_payload(
        &self,
        channel: &str,
        topic: &str,
        data: Payload,
    ) -> Result<(), PublishError> {
        self.ensure_open()?;
        let envelope = self.envelope(channel, topic, data);

        let span = tracing::debug_span!(
            "bus.publish",
            bus = %self.shared.config.name,
            channel,
            topic,
            sequence = envelope.sequence()
        );
        let _guard = span.enter();

        let mut failures = self.shared.dispatch(&envelope);
        if failures.is_empty() {
            return Ok(());
        }

        for failure in &failures {
            tracing::warn!(
                id = %failure.subscription,
                error = %failure.error,
                "delivery failed"
            );
        }
        if self.shared.config.failure_report == FailureReport::First {
            failures.truncate(1);
        }

        Err(PublishError::Handlers { failures })
    }

    /// Hand delivery to the runtime's blocking pool and return immediately
    ///
    /// Failures are reported to the configured [`ErrorSink`].
    pub fn publish_async(
        &self,
        channel: &str,
        topic: &str,
        data: impl Any + Send + Sync,
    ) -> Result<(), PublishError> {
        self.publish_payload_async(channel, topic, Arc::new(data))
    }

    pub fn publish_payload_async(
        &self,
        channel: &str,
        topic: &str,
        data: Payload,
    ) -> Result<(), PublishError> {
        self.ensure_open()?;
        let runtime = self.runtime().ok_or(PublishError::NoRuntime)?;
        let envelope = self.envelope(channel, topic, data);

        self.shared.in_flight.fetch_add(1, Ordering::SeqCst);
        let guard = InFlight(Arc::clone(&self.shared));

        runtime.spawn_blocking(move || {
            let shared = &guard.0;
            let span = tracing::debug_span!(
                "bus.publish_async",
                bus = %shared.config.name,
                channel = envelope.channel(),
                topic = envelope.topic(),
                sequence = envelope.sequence()
            );
            let _enter = span.enter();

            for failure in shared.dispatch(&envelope) {
                shared.sink.report(failure);
            }
        });

        Ok(())
    }

    /// Wait until every async delivery started so far has finished
    pub async fn drain(&self) {
        loop {
            let idle = self.shared.idle.notified();
            if self.shared.in_flight.load(Ordering::SeqCst) == 0 {
                return;
            }
            idle.await;
        }
    }

    /// Refuse further publishes and drain pending async deliveries
    pub async fn shutdown(&self) -> Result<(), ShutdownError> {
        self.shared.closed.store(true, Ordering::SeqCst);

        let timeout = self.shared.config.drain_timeout;
        if tokio::time::timeout(timeout, self.drain()).await.is_err() {
            let pending = self.pending_async();
            tracing::warn!(bus = %self.shared.config.name, pending, "drain timed out");
            return Err(ShutdownError::DrainTimedOut { pending });
        }

        tracing::info!(bus = %self.shared.config.name, "message box shut down");
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::SeqCst)
    }

    pub fn subscriber_count(&self) -> usize {
        self.shared.registry.len()
    }

    /// Async deliveries handed off but not yet finished
    pub fn pending_async(&self) -> usize {
        self.shared.in_flight.load(Ordering::SeqCst)
    }

    pub fn config(&self) -> &BoxConfig {
        &self.shared.config
    }

    pub fn clock(&self) -> &C {
        &self.shared.clock
    }

    /// Runtime used for async work: the injected one, else the current one
    pub fn runtime(&self) -> Option<Handle> {
        self.shared
            .runtime
            .clone()
            .or_else(|| Handle::try_current().ok())
    }

    fn ensure_open(&self) -> Result<(), PublishError> {
        if self.is_closed() {
            return Err(PublishError::Closed);
        }
        Ok(())
    }

    fn envelope(&self, channel: &str, topic: &str, data: Payload) -> Envelope {
        let sequence = self.shared.sequence.fetch_add(1, Ordering::SeqCst);
        Envelope::from_payload(sequence, channel, topic, data, self.shared.clock.now())
    }
}

#[cfg(test)]
#[path = "message_box_tests.rs"]
mod tests;
