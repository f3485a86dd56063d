// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subscription registry
//!
//! Structural changes take the write lock; matching takes the read lock only
//! long enough to snapshot the matching entries, so concurrent publishes never
//! wait on each other and callbacks always run with no lock held.

use crate::dispatch::{self, Filter, Handler, HandlerError};
use crate::subscription::{Subscription, Unsubscribe};
use pb_core::{Envelope, IdGen, SubscriptionId, SubscriptionPattern};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, Weak};

/// A registered subscription as stored by the registry
pub struct SubscriptionEntry {
    id: SubscriptionId,
    pattern: SubscriptionPattern,
    filter: Option<Filter>,
    handler: Handler,
    active: AtomicBool,
}

/// Outcome of offering one envelope to one entry
#[derive(Debug)]
pub enum Delivery {
    /// Removed after the snapshot was taken
    Inactive,
    /// Rejected by the entry's filter
    Filtered,
    Delivered,
    Failed(HandlerError),
}

impl SubscriptionEntry {
    pub fn id(&self) -> &SubscriptionId {
        &self.id
    }

    pub fn pattern(&self) -> &SubscriptionPattern {
        &self.pattern
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Flip to inactive; true only for the call that did the flip
    fn deactivate(&self) -> bool {
        self.active.swap(false, Ordering::SeqCst)
    }

    /// Apply the filter and, if it passes, run the callback
    pub fn deliver(&self, envelope: &Envelope) -> Delivery {
        if !self.is_active() {
            return Delivery::Inactive;
        }

        if let Some(filter) = &self.filter {
            match dispatch::accepts(filter, envelope) {
                Ok(true) => {}
                Ok(false) => return Delivery::Filtered,
                Err(e) => return Delivery::Failed(e),
            }
        }

        match dispatch::invoke(&self.handler, envelope) {
            Ok(()) => Delivery::Delivered,
            Err(e) => Delivery::Failed(e),
        }
    }
}

impl fmt::Debug for SubscriptionEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionEntry")
            .field("id", &self.id)
            .field("pattern", &self.pattern)
            .field("filtered", &self.filter.is_some())
            .field("active", &self.is_active())
            .finish()
    }
}

/// Thread-safe store of active subscriptions
pub struct SubscriptionRegistry<I: IdGen> {
    entries: RwLock<HashMap<SubscriptionId, Arc<SubscriptionEntry>>>,
    ids: I,
}

impl<I: IdGen> SubscriptionRegistry<I> {
    pub fn new(ids: I) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ids,
        }
    }

    /// Register a subscription under a fresh id and hand back its handle
    pub fn add(
        self: &Arc<Self>,
        pattern: SubscriptionPattern,
        filter: Option<Filter>,
        handler: Handler,
    ) -> Subscription {
        let id = self.ids.next();
        let entry = Arc::new(SubscriptionEntry {
            id: id.clone(),
            pattern: pattern.clone(),
            filter,
            handler,
            active: AtomicBool::new(true),
        });

        {
            let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
            entries.insert(id.clone(), entry);
        }

        tracing::debug!(id = %id, pattern = %pattern, "subscribed");

        let registry: Weak<dyn Unsubscribe> = Arc::downgrade(self) as Weak<dyn Unsubscribe>;
        Subscription::new(id, pattern, registry)
    }

    /// Remove a subscription; returns false if it was already gone
    pub fn remove(&self, id: &SubscriptionId) -> bool {
        let removed = {
            let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
            entries.remove(id)
        };

        match removed {
            Some(entry) => entry.deactivate(),
            None => false,
        }
    }

    /// Snapshot of every active entry whose pattern matches the address
    pub fn find_matching(&self, channel: &str, topic: &str) -> Vec<Arc<SubscriptionEntry>> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries
            .values()
            .filter(|entry| entry.is_active() && entry.pattern.matches(channel, topic))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ids(&self) -> Vec<SubscriptionId> {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .cloned()
            .collect()
    }
}

impl<I: IdGen> Unsubscribe for SubscriptionRegistry<I> {
    fn unsubscribe(&self, id: &SubscriptionId) -> bool {
        self.remove(id)
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
