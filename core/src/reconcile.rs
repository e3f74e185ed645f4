// SPDX-FileCopyrightText: 2025-2026 The chime developers
//
// SPDX-License-Identifier: Apache-2.0

//! Per-alarm lifecycle tracking for cross-device reconciliation.
//!
//! Each `(event, kind)` pair moves through
//! `Scheduled -> Firing -> Dismissed | Snoozed`. A paired device can
//! never cause an alarm to start firing here; it can only end one.
//! Whoever ends it, the transition is applied at most once, and it is
//! relayed to the peer only when it originated locally, so the two
//! devices never bounce the same notification back and forth.

use std::collections::HashMap;

use crate::alarm::AlarmId;

/// Where a dismiss or snooze action originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOrigin {
    /// The user acted on this device.
    Local,

    /// A paired device reported the action over the peer link.
    Peer,
}

/// Lifecycle state of one reminder alarm instance.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ReminderState {
    /// Waiting for its trigger time. Also the implicit state of any
    /// alarm the flow has never seen.
    #[default]
    Scheduled,

    /// Currently demanding user attention.
    Firing,

    /// Ended for good. Terminal for this alarm instance.
    Dismissed,

    /// Ended by snoozing; a re-fire has been handed to the scheduler.
    Snoozed,
}

/// What applying an action to the flow decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    /// Whether local state changed. False means the action was a
    /// duplicate or arrived after a terminal state, and nothing more
    /// should happen.
    pub applied: bool,

    /// Whether the action must be relayed to paired devices. Never true
    /// for peer-originated actions: echoing back what was just received
    /// would ping-pong between the two devices indefinitely.
    pub notify_peer: bool,
}

impl Outcome {
    const IGNORED: Outcome = Outcome {
        applied: false,
        notify_peer: false,
    };

    const fn applied(origin: ActionOrigin) -> Outcome {
        Outcome {
            applied: true,
            notify_peer: matches!(origin, ActionOrigin::Local),
        }
    }
}

/// Tracks reminder lifecycles and decides which transitions take effect
/// and which must be relayed to the peer.
#[derive(Debug, Default)]
pub struct ReminderFlow {
    states: HashMap<AlarmId, ReminderState>,
}

impl ReminderFlow {
    /// Creates an empty flow.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current state of an alarm. Unknown alarms are `Scheduled`.
    #[must_use]
    pub fn state(&self, id: AlarmId) -> ReminderState {
        self.states.get(&id).copied().unwrap_or_default()
    }

    /// Records a local alarm fire. Only the local platform scheduler
    /// enters `Firing`; there is no peer-originated variant of this.
    ///
    /// Returns false for a duplicate fire or a fire that raced with a
    /// dismissal, in which case the alarm must not surface again.
    pub fn fired(&mut self, id: AlarmId) -> bool {
        match self.state(id) {
            // A snoozed alarm re-enters Scheduled when its re-fire is
            // scheduled; seeing the fire directly is the same re-entry.
            ReminderState::Scheduled | ReminderState::Snoozed => {
                self.states.insert(id, ReminderState::Firing);
                true
            }
            ReminderState::Firing => {
                tracing::debug!(alarm = %id, "duplicate fire ignored");
                false
            }
            ReminderState::Dismissed => {
                tracing::debug!(alarm = %id, "fire after dismissal ignored");
                false
            }
        }
    }

    /// Applies a dismissal, however it originated. Dismissing an alarm
    /// that is already over is a no-op, not an error: peers retransmit.
    pub fn dismiss(&mut self, id: AlarmId, origin: ActionOrigin) -> Outcome {
        match self.state(id) {
            ReminderState::Scheduled | ReminderState::Firing => {
                self.states.insert(id, ReminderState::Dismissed);
                Outcome::applied(origin)
            }
            ReminderState::Dismissed | ReminderState::Snoozed => Outcome::IGNORED,
        }
    }

    /// Applies a snooze, however it originated. Snoozing an alarm that
    /// is already over is a no-op.
    pub fn snooze(&mut self, id: AlarmId, origin: ActionOrigin) -> Outcome {
        match self.state(id) {
            ReminderState::Scheduled | ReminderState::Firing => {
                self.states.insert(id, ReminderState::Snoozed);
                Outcome::applied(origin)
            }
            ReminderState::Dismissed | ReminderState::Snoozed => Outcome::IGNORED,
        }
    }
}
