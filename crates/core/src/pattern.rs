// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Channel/topic pattern matching
//!
//! A pattern is one of:
//!   - Wildcard: `*` matches any value
//!   - Prefix: `orders*` matches any value starting with `orders`
//!   - Literal: anything else, compared byte for byte (case-sensitive)
//!
//! There is no escaping; a `*` anywhere but the end is a literal character.

use crate::error::PatternError;
use std::fmt;

/// Pattern for one half of an address (channel or topic)
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Pattern(String);

impl Pattern {
    pub const WILDCARD: &'static str = "*";

    pub fn new(pattern: impl Into<String>) -> Self {
        Self(pattern.into())
    }

    pub fn wildcard() -> Self {
        Self(Self::WILDCARD.to_string())
    }

    /// Check if this pattern matches a published channel or topic
    pub fn matches(&self, value: &str) -> bool {
        if self.0 == Self::WILDCARD {
            return true;
        }

        // "*" alone was handled above, so the prefix here may be empty only
        // for patterns like "**", which keep their literal-prefix meaning.
        if let Some(prefix) = self.0.strip_suffix('*') {
            return value.starts_with(prefix);
        }

        self.0 == value
    }

    pub fn is_wildcard(&self) -> bool {
        self.0 == Self::WILDCARD
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which half of a subscription pattern a problem refers to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PatternField {
    Channel,
    Topic,
}

impl fmt::Display for PatternField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternField::Channel => f.write_str("channel"),
            PatternField::Topic => f.write_str("topic"),
        }
    }
}

/// A (channel, topic) pattern pair; both halves must match
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionPattern {
    channel: Pattern,
    topic: Pattern,
}

impl SubscriptionPattern {
    /// Build a pattern pair, rejecting empty halves up front
    pub fn new(channel: &str, topic: &str) -> Result<Self, PatternError> {
        if channel.is_empty() {
            return Err(PatternError::Empty {
                field: PatternField::Channel,
            });
        }
        if topic.is_empty() {
            return Err(PatternError::Empty {
                field: PatternField::Topic,
            });
        }

        Ok(Self {
            channel: Pattern::new(channel),
            topic: Pattern::new(topic),
        })
    }

    /// `("*", "*")`: every publish on the bus
    pub fn catch_all() -> Self {
        Self {
            channel: Pattern::wildcard(),
            topic: Pattern::wildcard(),
        }
    }

    pub fn matches(&self, channel: &str, topic: &str) -> bool {
        self.channel.matches(channel) && self.topic.matches(topic)
    }

    pub fn is_catch_all(&self) -> bool {
        self.channel.is_wildcard() && self.topic.is_wildcard()
    }

    pub fn channel(&self) -> &Pattern {
        &self.channel
    }

    pub fn topic(&self) -> &Pattern {
        &self.topic
    }
}

impl fmt::Display for SubscriptionPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.channel, self.topic)
    }
}

#[cfg(test)]
#[path = "pattern_tests.rs"]
mod tests;
