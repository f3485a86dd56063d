// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fluent addressing: `bus.channel("orders").topic("created").publish(order)`

use crate::dispatch::IntoHandlerResult;
use crate::error::{PublishError, SubscribeError};
use crate::message_box::MessageBox;
use crate::subscription::Subscription;
use pb_core::{Clock, Envelope, IdGen, Pattern};
use std::any::Any;

/// A channel waiting for its topic
pub struct ChannelRoute<C: Clock, I: IdGen> {
    bus: MessageBox<C, I>,
    channel: String,
}

impl<C: Clock, I: IdGen> ChannelRoute<C, I> {
    pub fn topic(self, topic: impl Into<String>) -> Route<C, I> {
        Route {
            bus: self.bus,
            channel: self.channel,
            topic: topic.into(),
        }
    }
}

/// A fully addressed (channel, topic) pair bound to a bus
pub struct Route<C: Clock, I: IdGen> {
    bus: MessageBox<C, I>,
    channel: String,
    topic: String,
}

impl<C: Clock, I: IdGen> Route<C, I> {
    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn subscribe<F, R>(&self, callback: F) -> Result<Subscription, SubscribeError>
    where
        F: Fn(&Envelope) -> R + Send + Sync + 'static,
        R: IntoHandlerResult,
    {
        self.bus.subscribe(&self.channel, &self.topic, callback)
    }

    pub fn subscribe_if<P, F, R>(
        &self,
        filter: P,
        callback: F,
    ) -> Result<Subscription, SubscribeError>
    where
        P: Fn(&Envelope) -> bool + Send + Sync + 'static,
        F: Fn(&Envelope) -> R + Send + Sync + 'static,
        R: IntoHandlerResult,
    {
        self.bus
            .subscribe_if(&self.channel, &self.topic, filter, callback)
    }

    pub fn publish(&self, data: impl Any + Send + Sync) -> Result<(), PublishError> {
        self.bus.publish(&self.channel, &self.topic, data)
    }

    pub fn publish_async(&self, data: impl Any + Send + Sync) -> Result<(), PublishError> {
        self.bus.publish_async(&self.channel, &self.topic, data)
    }
}

impl<C: Clock, I: IdGen> MessageBox<C, I> {
    pub fn channel(&self, channel: impl Into<String>) -> ChannelRoute<C, I> {
        ChannelRoute {
            bus: self.clone(),
            channel: channel.into(),
        }
    }

    /// Route over `("*", "*")`
    pub fn any_channel_and_topic(&self) -> Route<C, I> {
        self.channel(Pattern::WILDCARD).topic(Pattern::WILDCARD)
    }
}
