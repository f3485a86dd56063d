// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Type-to-address rules
//!
//! Lookup is by exact type first; a value whose type has no rule (or whose
//! rule declines it) falls back to the fallback rule, which only sees the
//! type name.

use crate::error::ConventionsError;
use pb_core::PatternField;
use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

/// Derives an address part from a value of one registered type
pub type Rule = Arc<dyn Fn(&dyn Any) -> Option<String> + Send + Sync>;

/// Derives an address part from a type name
pub type FallbackRule = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Immutable table of channel and topic conventions
#[derive(Clone, Default)]
pub struct Conventions {
    channel: HashMap<TypeId, Rule>,
    topic: HashMap<TypeId, Rule>,
    fallback_channel: Option<FallbackRule>,
    fallback_topic: Option<FallbackRule>,
}

impl Conventions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Channel = module path of the type, topic = the bare type name
    pub fn defaults() -> Self {
        Self::new()
            .with_fallback_channel(|name| split_type_name(name).0.to_string())
            .with_fallback_topic(|name| split_type_name(name).1.to_string())
    }

    pub fn with_channel<T, F>(&self, rule: F) -> Self
    where
        T: Any,
        F: Fn(&T) -> String + Send + Sync + 'static,
    {
        let mut next = self.clone();
        next.channel.insert(TypeId::of::<T>(), typed_rule(rule));
        next
    }

    pub fn with_topic<T, F>(&self, rule: F) -> Self
    where
        T: Any,
        F: Fn(&T) -> String + Send + Sync + 'static,
    {
        let mut next = self.clone();
        next.topic.insert(TypeId::of::<T>(), typed_rule(rule));
        next
    }

    pub fn with_fallback_channel<F>(&self, rule: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        Self {
            fallback_channel: Some(Arc::new(rule)),
            ..self.clone()
        }
    }

    pub fn with_fallback_topic<F>(&self, rule: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        Self {
            fallback_topic: Some(Arc::new(rule)),
            ..self.clone()
        }
    }

    pub fn channel_for<T: Any>(&self, value: &T) -> Result<String, ConventionsError> {
        derive(
            &self.channel,
            self.fallback_channel.as_ref(),
            value,
            PatternField::Channel,
        )
    }

    pub fn topic_for<T: Any>(&self, value: &T) -> Result<String, ConventionsError> {
        derive(
            &self.topic,
            self.fallback_topic.as_ref(),
            value,
            PatternField::Topic,
        )
    }

    /// `(channel, topic)` for a value
    pub fn address_of<T: Any>(&self, value: &T) -> Result<(String, String), ConventionsError> {
        Ok((self.channel_for(value)?, self.topic_for(value)?))
    }

    /// Check that values of `T` can be addressed at all
    pub fn ensure_covers<T: Any>(&self) -> Result<(), ConventionsError> {
        let id = TypeId::of::<T>();
        if !self.channel.contains_key(&id) && self.fallback_channel.is_none() {
            return Err(missing::<T>(PatternField::Channel));
        }
        if !self.topic.contains_key(&id) && self.fallback_topic.is_none() {
            return Err(missing::<T>(PatternField::Topic));
        }
        Ok(())
    }
}

fn typed_rule<T, F>(rule: F) -> Rule
where
    T: Any,
    F: Fn(&T) -> String + Send + Sync + 'static,
{
    Arc::new(move |value: &dyn Any| value.downcast_ref::<T>().map(|v| rule(v)))
}

fn derive<T: Any>(
    rules: &HashMap<TypeId, Rule>,
    fallback: Option<&FallbackRule>,
    value: &T,
    field: PatternField,
) -> Result<String, ConventionsError> {
    if let Some(derived) = rules
        .get(&TypeId::of::<T>())
        .and_then(|rule| rule(value as &dyn Any))
    {
        return Ok(derived);
    }
    match fallback {
        Some(rule) => Ok(rule(type_name::<T>())),
        None => Err(missing::<T>(field)),
    }
}

fn missing<T: Any>(field: PatternField) -> ConventionsError {
    ConventionsError::Missing {
        type_name: type_name::<T>(),
        field,
    }
}

/// Split `a::b::Name<x::Y>` into `("a::b", "Name")`; a path-less name is
/// used for both parts
fn split_type_name(name: &str) -> (&str, &str) {
    let bare = name.split('<').next().unwrap_or(name);
    bare.rsplit_once("::").unwrap_or((bare, bare))
}

#[cfg(test)]
#[path = "conventions_tests.rs"]
mod tests;
