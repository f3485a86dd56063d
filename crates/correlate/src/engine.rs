// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Composite wiring
//!
//! Each composite registers one low-level subscription per entry plus one
//! catch-all watching for interruptions. All of them feed the same
//! [`CompositeState`] behind a per-composite lock, so entry, watcher and
//! timer callbacks never race. The downstream callback runs after the lock
//! is released and the low-level subscriptions are gone.

use crate::error::CompositionError;
use crate::state::{CompositeEffect, CompositeEvent, CompositePhase, CompositeState};
use pb_bus::{Filter, Handler, HandlerError, MessageBox, Subscription};
use pb_core::{Clock, Envelope, IdGen, SubscriptionPattern};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// One validated entry of a composition
pub(crate) struct Entry {
    pub(crate) pattern: SubscriptionPattern,
    pub(crate) filter: Option<Filter>,
}

/// Snapshot of a composite's progress
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompositeStatus {
    pub phase: CompositePhase,
    pub satisfied: usize,
    pub total: usize,
    /// Times progress was discarded by interruption or expiry
    pub resets: u32,
}

struct Inner {
    state: CompositeState,
    timer: Option<JoinHandle<()>>,
}

struct Composite<C: Clock> {
    this: Weak<Composite<C>>,
    label: String,
    entries: Vec<Entry>,
    /// For each entry, the entries sharing its exact pattern (itself included)
    groups: Vec<Vec<usize>>,
    callback: Handler,
    clock: C,
    runtime: Option<Handle>,
    inner: Mutex<Inner>,
    subscriptions: Mutex<Vec<Subscription>>,
}

/// Type-erased view of a composite, so handles are not generic
trait Control: Send + Sync {
    fn label(&self) -> &str;
    fn dispose(&self);
    fn status(&self) -> CompositeStatus;
}

/// Register a composite over `entries` on `bus`
pub(crate) fn register<C: Clock, I: IdGen>(
    bus: &MessageBox<C, I>,
    entries: Vec<Entry>,
    window: Option<Duration>,
    callback: Handler,
) -> Result<CompositeSubscription, CompositionError> {
    let runtime = bus.runtime();
    if window.is_some() && runtime.is_none() {
        return Err(CompositionError::NoRuntime);
    }

    let groups: Vec<Vec<usize>> = entries
        .iter()
        .map(|entry| {
            entries
                .iter()
                .enumerate()
                .filter(|(_, other)| other.pattern == entry.pattern)
                .map(|(j, _)| j)
                .collect()
        })
        .collect();
    let label = entries
        .iter()
        .map(|entry| entry.pattern.to_string())
        .collect::<Vec<_>>()
        .join(" & ");
    let total = entries.len();

    let composite = Arc::new_cyclic(|this| Composite {
        this: this.clone(),
        label,
        entries,
        groups,
        callback,
        clock: bus.clock().clone(),
        runtime,
        inner: Mutex::new(Inner {
            state: CompositeState::new(total, window),
            timer: None,
        }),
        subscriptions: Mutex::new(Vec::new()),
    });

    let mut subscriptions = Vec::with_capacity(total + 1);
    for (index, entry) in composite.entries.iter().enumerate() {
        let weak = Arc::downgrade(&composite);
        let handler: Handler = Arc::new(move |envelope: &Envelope| match weak.upgrade() {
            Some(composite) => composite.on_entry(index, envelope),
            None => Ok(()),
        });
        subscriptions.push(bus.subscribe_handler(
            entry.pattern.clone(),
            entry.filter.clone(),
            handler,
        ));
    }

    let weak = Arc::downgrade(&composite);
    let watcher: Handler = Arc::new(move |envelope: &Envelope| match weak.upgrade() {
        Some(composite) => composite.on_any(envelope),
        None => Ok(()),
    });
    subscriptions.push(bus.subscribe_handler(SubscriptionPattern::catch_all(), None, watcher));

    *composite.lock_subscriptions() = subscriptions;
    // A concurrent publish may have finished the composite during registration
    if composite.lock_inner().state.is_terminal() {
        composite.release();
    }

    tracing::debug!(composite = %composite.label, ?window, "composite subscribed");
    Ok(CompositeSubscription { control: composite })
}

impl<C: Clock> Composite<C> {
    fn on_entry(&self, index: usize, envelope: &Envelope) -> Result<(), HandlerError> {
        let Some(group) = self.groups.get(index) else {
            return Ok(());
        };
        // The receiving entry's own filter already accepted the envelope
        let candidates: Vec<usize> = group
            .iter()
            .copied()
            .filter(|&j| {
                j == index
                    || self
                        .entries
                        .get(j)
                        .and_then(|entry| entry.filter.as_ref())
                        .map_or(true, |filter| filter(envelope))
            })
            .collect();

        self.apply(CompositeEvent::Matched {
            candidates,
            envelope: envelope.clone(),
        })
    }

    fn on_any(&self, envelope: &Envelope) -> Result<(), HandlerError> {
        let member = self
            .entries
            .iter()
            .any(|entry| entry.pattern.matches(envelope.channel(), envelope.topic()));
        self.apply(CompositeEvent::Observed { member })
    }

    fn apply(&self, event: CompositeEvent) -> Result<(), HandlerError> {
        let deferred = {
            let mut inner = self.lock_inner();
            let before = inner.state.satisfied();
            let (next, effects) = inner.state.transition(event, &self.clock);
            inner.state = next;

            if inner.state.phase == CompositePhase::Partial && inner.state.satisfied() > before {
                tracing::debug!(
                    composite = %self.label,
                    satisfied = inner.state.satisfied(),
                    total = inner.state.total(),
                    "composite progress"
                );
            }

            let mut deferred = Vec::new();
            for effect in effects {
                match effect {
                    CompositeEffect::StartWindow { epoch, window } => {
                        let timer = self.start_timer(epoch, window);
                        if let Some(old) = std::mem::replace(&mut inner.timer, timer) {
                            old.abort();
                        }
                    }
                    CompositeEffect::CancelWindow => {
                        if let Some(timer) = inner.timer.take() {
                            timer.abort();
                        }
                    }
                    CompositeEffect::Reset { reason } => {
                        tracing::debug!(
                            composite = %self.label,
                            %reason,
                            resets = inner.state.resets,
                            "composite reset"
                        );
                    }
                    CompositeEffect::Release | CompositeEffect::Fire { .. } => {
                        deferred.push(effect);
                    }
                }
            }
            deferred
        };

        for effect in deferred {
            match effect {
                CompositeEffect::Release => self.release(),
                CompositeEffect::Fire { envelope } => {
                    tracing::debug!(
                        composite = %self.label,
                        channel = envelope.channel(),
                        topic = envelope.topic(),
                        "composite fired"
                    );
                    (self.callback)(&envelope)?;
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn start_timer(&self, epoch: u64, window: Duration) -> Option<JoinHandle<()>> {
        let runtime = self.runtime.as_ref()?;
        let weak = self.this.clone();
        Some(runtime.spawn(async move {
            tokio::time::sleep(window).await;
            if let Some(composite) = weak.upgrade() {
                if let Err(error) = composite.apply(CompositeEvent::WindowElapsed { epoch }) {
                    tracing::warn!(composite = %composite.label, %error, "window expiry failed");
                }
            }
        }))
    }

    /// Drop every low-level subscription; later calls find nothing to drop
    fn release(&self) {
        let subscriptions = std::mem::take(&mut *self.lock_subscriptions());
        if subscriptions.is_empty() {
            return;
        }
        for subscription in subscriptions {
            subscription.dispose();
        }
        tracing::debug!(composite = %self.label, "composite released");
    }

    fn lock_inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_subscriptions(&self) -> MutexGuard<'_, Vec<Subscription>> {
        self.subscriptions.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl<C: Clock> Control for Composite<C> {
    fn label(&self) -> &str {
        &self.label
    }

    fn dispose(&self) {
        if let Err(error) = self.apply(CompositeEvent::Dispose) {
            tracing::warn!(composite = %self.label, %error, "dispose failed");
        }
    }

    fn status(&self) -> CompositeStatus {
        let inner = self.lock_inner();
        CompositeStatus {
            phase: inner.state.phase,
            satisfied: inner.state.satisfied(),
            total: inner.state.total(),
            resets: inner.state.resets,
        }
    }
}

/// Handle for a composite subscription
///
/// Disposing it (explicitly or by dropping it) removes every underlying
/// subscription and makes the composite permanently inert. Disposing twice,
/// or after the composite fired, is a no-op.
#[must_use = "dropping a CompositeSubscription disposes it"]
pub struct CompositeSubscription {
    control: Arc<dyn Control>,
}

impl CompositeSubscription {
    pub fn dispose(&self) {
        self.control.dispose();
    }

    pub fn status(&self) -> CompositeStatus {
        self.control.status()
    }

    pub fn is_fired(&self) -> bool {
        self.status().phase == CompositePhase::Fired
    }

    pub fn is_disposed(&self) -> bool {
        self.status().phase == CompositePhase::Disposed
    }

    /// Entry patterns joined with `&`, e.g. `c1/t1 & c2/t2`
    pub fn label(&self) -> &str {
        self.control.label()
    }
}

impl Drop for CompositeSubscription {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl fmt::Debug for CompositeSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeSubscription")
            .field("label", &self.label())
            .field("status", &self.status())
            .finish()
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
