// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Envelope: the immutable wrapper around every published value
//!
//! Cloning an envelope is cheap; the address and payload are reference
//! counted and shared read-only by every subscriber that receives it.

use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// Type-erased, shareable payload
pub type Payload = Arc<dyn Any + Send + Sync>;

#[derive(Clone)]
pub struct Envelope {
    sequence: u64,
    channel: Arc<str>,
    topic: Arc<str>,
    data: Payload,
    timestamp: Instant,
}

impl Envelope {
    pub fn new(
        sequence: u64,
        channel: impl Into<Arc<str>>,
        topic: impl Into<Arc<str>>,
        data: impl Any + Send + Sync,
        timestamp: Instant,
    ) -> Self {
        Self::from_payload(sequence, channel, topic, Arc::new(data), timestamp)
    }

    pub fn from_payload(
        sequence: u64,
        channel: impl Into<Arc<str>>,
        topic: impl Into<Arc<str>>,
        data: Payload,
        timestamp: Instant,
    ) -> Self {
        Self {
            sequence,
            channel: channel.into(),
            topic: topic.into(),
            data,
            timestamp,
        }
    }

    /// Per-bus publish counter; identical for every delivery of one publish
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn timestamp(&self) -> Instant {
        self.timestamp
    }

    pub fn payload(&self) -> &Payload {
        &self.data
    }

    /// Borrow the payload as `T`, if that is what was published
    pub fn data<T: Any>(&self) -> Option<&T> {
        self.data.downcast_ref::<T>()
    }

    pub fn is<T: Any>(&self) -> bool {
        self.data.is::<T>()
    }

    /// Payload as text when it was published as `&'static str` or `String`
    pub fn as_str(&self) -> Option<&str> {
        if let Some(s) = self.data::<&'static str>() {
            return Some(*s);
        }
        self.data::<String>().map(String::as_str)
    }
}

impl fmt::Debug for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Envelope")
            .field("sequence", &self.sequence)
            .field("channel", &self.channel)
            .field("topic", &self.topic)
            .field("timestamp", &self.timestamp)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "envelope_tests.rs"]
mod tests;
