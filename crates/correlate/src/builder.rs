// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fluent composition builder: `bus.when(..).and(..).in_time(..).subscribe(..)`

use crate::engine::{self, CompositeSubscription, Entry};
use crate::error::CompositionError;
use pb_bus::{Filter, IntoHandlerResult, MessageBox, SubscribeError};
use pb_core::{Clock, Envelope, IdGen, SubscriptionPattern};
use std::time::Duration;

/// Starts compositions on a message box
pub trait Correlate<C: Clock, I: IdGen> {
    /// First entry of a composition
    fn when(&self, channel: &str, topic: &str) -> Composition<C, I>;

    /// First entry, satisfied only by envelopes the filter accepts
    fn when_if<P>(&self, channel: &str, topic: &str, filter: P) -> Composition<C, I>
    where
        P: Fn(&Envelope) -> bool + Send + Sync + 'static;
}

impl<C: Clock, I: IdGen> Correlate<C, I> for MessageBox<C, I> {
    fn when(&self, channel: &str, topic: &str) -> Composition<C, I> {
        Composition::start(self.clone()).push(channel, topic, None)
    }

    fn when_if<P>(&self, channel: &str, topic: &str, filter: P) -> Composition<C, I>
    where
        P: Fn(&Envelope) -> bool + Send + Sync + 'static,
    {
        Composition::start(self.clone()).push(channel, topic, Some(pb_bus::filter(filter)))
    }
}

#[derive(Clone)]
struct Draft {
    channel: String,
    topic: String,
    filter: Option<Filter>,
}

/// Immutable description of a composite subscription
///
/// Every method returns a new builder, so a partial composition can be
/// extended in several directions.
#[derive(Clone)]
pub struct Composition<C: Clock, I: IdGen> {
    bus: MessageBox<C, I>,
    entries: Vec<Draft>,
    window: Option<Duration>,
}

impl<C: Clock, I: IdGen> Composition<C, I> {
    fn start(bus: MessageBox<C, I>) -> Self {
        Self {
            bus,
            entries: Vec::new(),
            window: None,
        }
    }

    fn push(&self, channel: &str, topic: &str, filter: Option<Filter>) -> Self {
        let mut next = self.clone();
        next.entries.push(Draft {
            channel: channel.to_string(),
            topic: topic.to_string(),
            filter,
        });
        next
    }

    pub fn and(&self, channel: &str, topic: &str) -> Self {
        self.push(channel, topic, None)
    }

    pub fn and_if<P>(&self, channel: &str, topic: &str, filter: P) -> Self
    where
        P: Fn(&Envelope) -> bool + Send + Sync + 'static,
    {
        self.push(channel, topic, Some(pb_bus::filter(filter)))
    }

    /// Require every entry within `window` of the first match
    pub fn in_time(&self, window: Duration) -> Self {
        Self {
            window: Some(window),
            ..self.clone()
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn window(&self) -> Option<Duration> {
        self.window
    }

    /// Register the composite; `callback` receives the envelope that
    /// completed it
    pub fn subscribe<F, R>(&self, callback: F) -> Result<CompositeSubscription, CompositionError>
    where
        F: Fn(&Envelope) -> R + Send + Sync + 'static,
        R: IntoHandlerResult,
    {
        if self.entries.len() < 2 {
            return Err(CompositionError::TooFewEntries {
                found: self.entries.len(),
            });
        }

        let entries = self
            .entries
            .iter()
            .map(|draft| -> Result<Entry, CompositionError> {
                let pattern = SubscriptionPattern::new(&draft.channel, &draft.topic)
                    .map_err(SubscribeError::from)?;
                Ok(Entry {
                    pattern,
                    filter: draft.filter.clone(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        engine::register(&self.bus, entries, self.window, pb_bus::handler(callback))
    }
}

#[cfg(test)]
#[path = "builder_tests.rs"]
mod tests;
