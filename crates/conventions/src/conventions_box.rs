// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A message box addressed by conventions instead of strings

use crate::conventions::Conventions;
use crate::error::ConventionsError;
use pb_bus::{Filter, Handler, IntoHandlerResult, MessageBox, Subscription};
use pb_core::{Clock, Envelope, IdGen, SubscriptionPattern, SystemClock, UuidIdGen};
use std::any::{type_name, Any};
use std::sync::Arc;

/// Wraps a message box with a conventions table
///
/// The builder methods return a new box sharing the same bus.
#[derive(Clone)]
pub struct ConventionsBox<C: Clock = SystemClock, I: IdGen = UuidIdGen> {
    bus: MessageBox<C, I>,
    conventions: Arc<Conventions>,
}

impl<C: Clock, I: IdGen> ConventionsBox<C, I> {
    pub fn new(bus: MessageBox<C, I>, conventions: Conventions) -> Self {
        Self {
            bus,
            conventions: Arc::new(conventions),
        }
    }

    pub fn bus(&self) -> &MessageBox<C, I> {
        &self.bus
    }

    pub fn conventions(&self) -> &Conventions {
        &self.conventions
    }

    pub fn add_channel_convention<T, F>(&self, rule: F) -> Self
    where
        T: Any,
        F: Fn(&T) -> String + Send + Sync + 'static,
    {
        self.with_table(self.conventions.with_channel::<T, F>(rule))
    }

    pub fn add_topic_convention<T, F>(&self, rule: F) -> Self
    where
        T: Any,
        F: Fn(&T) -> String + Send + Sync + 'static,
    {
        self.with_table(self.conventions.with_topic::<T, F>(rule))
    }

    pub fn with_fallback_channel<F>(&self, rule: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.with_table(self.conventions.with_fallback_channel(rule))
    }

    pub fn with_fallback_topic<F>(&self, rule: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.with_table(self.conventions.with_fallback_topic(rule))
    }

    /// Publish under the address the conventions derive for `value`
    pub fn publish<T: Any + Send + Sync>(&self, value: T) -> Result<(), ConventionsError> {
        let (channel, topic) = self.conventions.address_of(&value)?;
        self.bus.publish(&channel, &topic, value)?;
        Ok(())
    }

    pub fn publish_async<T: Any + Send + Sync>(&self, value: T) -> Result<(), ConventionsError> {
        let (channel, topic) = self.conventions.address_of(&value)?;
        self.bus.publish_async(&channel, &topic, value)?;
        Ok(())
    }

    /// Receive values of `T` published under their conventional address
    pub fn subscribe<T, F, R>(&self, callback: F) -> Result<Subscription, ConventionsError>
    where
        T: Any + Send + Sync,
        F: Fn(&T) -> R + Send + Sync + 'static,
        R: IntoHandlerResult,
    {
        self.conventions.ensure_covers::<T>()?;

        let conventions = Arc::clone(&self.conventions);
        let filter: Filter = Arc::new(move |envelope: &Envelope| {
            envelope.data::<T>().is_some_and(|value| {
                conventions
                    .address_of(value)
                    .is_ok_and(|(channel, topic)| {
                        channel == envelope.channel() && topic == envelope.topic()
                    })
            })
        });
        let handler: Handler = Arc::new(move |envelope: &Envelope| match envelope.data::<T>() {
            Some(value) => callback(value).into_handler_result(),
            None => Ok(()),
        });

        let subscription = self.bus.subscribe_handler(
            SubscriptionPattern::catch_all(),
            Some(filter),
            handler,
        );
        tracing::debug!(
            id = %subscription.id(),
            value_type = type_name::<T>(),
            "convention subscription"
        );
        Ok(subscription)
    }

    fn with_table(&self, conventions: Conventions) -> Self {
        Self {
            bus: self.bus.clone(),
            conventions: Arc::new(conventions),
        }
    }
}

/// Attach conventions to a message box
pub trait ConventionsExt<C: Clock, I: IdGen> {
    /// Empty table; add rules with the `add_*` methods
    fn with_conventions(&self) -> ConventionsBox<C, I>;

    /// Channel = module path, topic = type name
    fn with_default_conventions(&self) -> ConventionsBox<C, I>;
}

impl<C: Clock, I: IdGen> ConventionsExt<C, I> for MessageBox<C, I> {
    fn with_conventions(&self) -> ConventionsBox<C, I> {
        ConventionsBox::new(self.clone(), Conventions::new())
    }

    fn with_default_conventions(&self) -> ConventionsBox<C, I> {
        ConventionsBox::new(self.clone(), Conventions::defaults())
    }
}

#[cfg(test)]
#[path = "conventions_box_tests.rs"]
mod tests;
