// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Disposable subscription handles

use pb_core::{SubscriptionId, SubscriptionPattern};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Weak;

/// Anything a handle can ask to forget a subscription
pub(crate) trait Unsubscribe: Send + Sync {
    /// Returns true if the subscription was still registered
    fn unsubscribe(&self, id: &SubscriptionId) -> bool;
}

/// Handle for one registered subscription
///
/// Disposing it (explicitly or by dropping it) removes the subscription from
/// its registry. Once `dispose` returns no new delivery to the callback
/// begins; a delivery already running is allowed to finish. Disposing twice
/// is a no-op.
#[must_use = "dropping a Subscription unsubscribes it"]
pub struct Subscription {
    id: SubscriptionId,
    pattern: SubscriptionPattern,
    registry: Weak<dyn Unsubscribe>,
    disposed: AtomicBool,
}

impl Subscription {
    pub(crate) fn new(
        id: SubscriptionId,
        pattern: SubscriptionPattern,
        registry: Weak<dyn Unsubscribe>,
    ) -> Self {
        Self {
            id,
            pattern,
            registry,
            disposed: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> &SubscriptionId {
        &self.id
    }

    pub fn pattern(&self) -> &SubscriptionPattern {
        &self.pattern
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return;
        }

        // Registry already gone means the bus was dropped; nothing to remove
        let Some(registry) = self.registry.upgrade() else {
            return;
        };

        if registry.unsubscribe(&self.id) {
            tracing::debug!(id = %self.id, pattern = %self.pattern, "unsubscribed");
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("pattern", &self.pattern)
            .field("disposed", &self.is_disposed())
            .finish()
    }
}
