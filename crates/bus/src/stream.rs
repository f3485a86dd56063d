// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stream view of a subscription
//!
//! `observe` returns a lazy description of a pattern; every call to
//! [`Observable::subscribe`] registers a fresh subscription and yields its
//! envelopes as a `tokio_stream::Stream`, in delivery order.

use crate::dispatch::Handler;
use crate::error::SubscribeError;
use crate::message_box::MessageBox;
use crate::subscription::Subscription;
use pb_core::{Clock, Envelope, IdGen, SubscriptionId, SubscriptionPattern};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio_stream::Stream;

/// Restartable source of envelopes for one pattern
pub struct Observable<C: Clock, I: IdGen> {
    bus: MessageBox<C, I>,
    pattern: SubscriptionPattern,
}

impl<C: Clock, I: IdGen> Observable<C, I> {
    pub fn pattern(&self) -> &SubscriptionPattern {
        &self.pattern
    }

    /// Start a new, independent stream of matching envelopes
    pub fn subscribe(&self) -> EnvelopeStream {
        let (tx, receiver) = mpsc::unbounded_channel();
        let handler: Handler = Arc::new(move |envelope: &Envelope| {
            // Receiver gone means the stream is being torn down
            let _ = tx.send(envelope.clone());
            Ok(())
        });

        let subscription = self
            .bus
            .subscribe_handler(self.pattern.clone(), None, handler);
        tracing::debug!(id = %subscription.id(), pattern = %self.pattern, "stream opened");

        EnvelopeStream {
            receiver,
            subscription,
        }
    }
}

/// Envelopes delivered to one subscription; dropping it unsubscribes
pub struct EnvelopeStream {
    receiver: mpsc::UnboundedReceiver<Envelope>,
    subscription: Subscription,
}

impl EnvelopeStream {
    pub fn subscription_id(&self) -> &SubscriptionId {
        self.subscription.id()
    }

    /// Stop receiving; envelopes already buffered are still yielded
    pub fn close(&mut self) {
        self.subscription.dispose();
        self.receiver.close();
    }

    /// Next buffered envelope without waiting
    pub fn try_next(&mut self) -> Option<Envelope> {
        self.receiver.try_recv().ok()
    }
}

impl Stream for EnvelopeStream {
    type Item = Envelope;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

impl<C: Clock, I: IdGen> MessageBox<C, I> {
    /// Describe a stream over a pattern; nothing is subscribed until
    /// [`Observable::subscribe`] is called
    pub fn observe(&self, channel: &str, topic: &str) -> Result<Observable<C, I>, SubscribeError> {
        Ok(Observable {
            bus: self.clone(),
            pattern: SubscriptionPattern::new(channel, topic)?,
        })
    }
}

#[cfg(test)]
#[path = "stream_tests.rs"]
mod tests;
