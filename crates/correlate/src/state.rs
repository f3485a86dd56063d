// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Composite state machine
//!
//! `transition` is pure: it takes the current state and one event and returns
//! the next state plus the effects the engine must carry out (timers,
//! releasing subscriptions, invoking the callback). Locking and timers live in
//! the engine.

use pb_core::{Clock, Envelope};
use std::fmt;
use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompositePhase {
    /// Nothing matched since registration or the last reset
    Idle,
    /// At least one entry matched
    Partial,
    /// Every entry matched and the callback was released (terminal)
    Fired,
    /// Disposed by its owner (terminal)
    Disposed,
}

/// Why partial progress was thrown away
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResetReason {
    /// A publish outside the composite's entries arrived first
    Interrupted,
    /// The window ran out before every entry matched
    Expired,
}

impl fmt::Display for ResetReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResetReason::Interrupted => write!(f, "interrupted"),
            ResetReason::Expired => write!(f, "expired"),
        }
    }
}

/// Inputs to the composite state machine
#[derive(Clone, Debug)]
pub enum CompositeEvent {
    /// A publish accepted by at least one entry.
    ///
    /// `candidates` lists, in declaration order, the entries that share the
    /// pattern of the entry that received it and whose filters accept it.
    Matched {
        candidates: Vec<usize>,
        envelope: Envelope,
    },
    /// Any publish on the bus; `member` is true when its address matches the
    /// pattern of one of the entries (filters are not consulted)
    Observed { member: bool },
    /// The window started under `epoch` ran out
    WindowElapsed { epoch: u64 },
    Dispose,
}

/// Work the engine performs after a transition
#[derive(Clone, Debug)]
pub enum CompositeEffect {
    StartWindow { epoch: u64, window: Duration },
    CancelWindow,
    Reset { reason: ResetReason },
    /// Drop every low-level subscription
    Release,
    /// Invoke the downstream callback
    Fire { envelope: Envelope },
}

/// Progress of one composite subscription
#[derive(Clone, Debug)]
pub struct CompositeState {
    pub phase: CompositePhase,
    /// Envelope that satisfied each entry, by declaration index
    pub matched: Vec<Option<Envelope>>,
    pub started_at: Option<Instant>,
    pub window: Option<Duration>,
    /// Bumped every time a window starts; stale timers carry an old epoch
    pub epoch: u64,
    pub resets: u32,
}

impl CompositeState {
    pub fn new(total: usize, window: Option<Duration>) -> Self {
        Self {
            phase: CompositePhase::Idle,
            matched: vec![None; total],
            started_at: None,
            window,
            epoch: 0,
            resets: 0,
        }
    }

    pub fn total(&self) -> usize {
        self.matched.len()
    }

    pub fn satisfied(&self) -> usize {
        self.matched.iter().filter(|m| m.is_some()).count()
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.phase, CompositePhase::Fired | CompositePhase::Disposed)
    }

    /// Pure transition function - returns new state and effects
    pub fn transition(
        &self,
        event: CompositeEvent,
        clock: &impl Clock,
    ) -> (CompositeState, Vec<CompositeEffect>) {
        match (self.phase, event) {
            // Terminal states ignore everything
            (CompositePhase::Fired | CompositePhase::Disposed, _) => (self.clone(), vec![]),

            (_, CompositeEvent::Dispose) => {
                let state = CompositeState {
                    phase: CompositePhase::Disposed,
                    ..self.clone()
                };
                let mut effects = self.cancel_window();
                effects.push(CompositeEffect::Release);
                (state, effects)
            }

            (_, CompositeEvent::Matched {
                candidates,
                envelope,
            }) => self.on_matched(&candidates, envelope, clock),

            // Partial → Idle: a non-member publish interrupts
            (CompositePhase::Partial, CompositeEvent::Observed { member: false }) => {
                self.reset(ResetReason::Interrupted)
            }

            // Partial → Idle: only the timer of the current attempt counts
            (CompositePhase::Partial, CompositeEvent::WindowElapsed { epoch })
                if epoch == self.epoch =>
            {
                self.reset(ResetReason::Expired)
            }

            (_, CompositeEvent::Observed { .. } | CompositeEvent::WindowElapsed { .. }) => {
                (self.clone(), vec![])
            }
        }
    }

    fn on_matched(
        &self,
        candidates: &[usize],
        envelope: Envelope,
        clock: &impl Clock,
    ) -> (CompositeState, Vec<CompositeEffect>) {
        let now = clock.now();

        // The window may have run out before its timer was delivered
        let (mut next, mut effects) = if self.window_ran_out(clock) {
            self.reset(ResetReason::Expired)
        } else {
            (self.clone(), vec![])
        };

        // One publish satisfies at most one entry among identical patterns
        let consumed = candidates.iter().any(|&i| {
            next.matched
                .get(i)
                .and_then(Option::as_ref)
                .is_some_and(|e| e.sequence() == envelope.sequence())
        });
        let slot = candidates
            .iter()
            .copied()
            .find(|&i| matches!(next.matched.get(i), Some(None)));
        let Some(index) = slot.filter(|_| !consumed) else {
            return (next, effects);
        };

        // Idle → Partial
        if next.phase == CompositePhase::Idle {
            next.phase = CompositePhase::Partial;
            next.started_at = Some(now);
            if let Some(window) = next.window {
                next.epoch += 1;
                effects.push(CompositeEffect::StartWindow {
                    epoch: next.epoch,
                    window,
                });
            }
        }

        if let Some(entry) = next.matched.get_mut(index) {
            *entry = Some(envelope.clone());
        }

        // Partial → Fired
        if next.matched.iter().all(Option::is_some) {
            next.phase = CompositePhase::Fired;
            effects.extend(next.cancel_window());
            effects.push(CompositeEffect::Release);
            effects.push(CompositeEffect::Fire { envelope });
        }

        (next, effects)
    }

    fn window_ran_out(&self, clock: &impl Clock) -> bool {
        match (self.phase, self.window, self.started_at) {
            (CompositePhase::Partial, Some(window), Some(started)) => {
                clock.since(started) > window
            }
            _ => false,
        }
    }

    fn reset(&self, reason: ResetReason) -> (CompositeState, Vec<CompositeEffect>) {
        let state = CompositeState {
            phase: CompositePhase::Idle,
            matched: vec![None; self.total()],
            started_at: None,
            resets: self.resets + 1,
            ..self.clone()
        };
        let mut effects = self.cancel_window();
        effects.push(CompositeEffect::Reset { reason });
        (state, effects)
    }

    fn cancel_window(&self) -> Vec<CompositeEffect> {
        if self.window.is_some() {
            vec![CompositeEffect::CancelWindow]
        } else {
            vec![]
        }
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
