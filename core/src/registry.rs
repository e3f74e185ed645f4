// SPDX-FileCopyrightText: 2025-2026 The chime developers
//
// SPDX-License-Identifier: Apache-2.0

//! In-memory store of the alarms currently demanding user attention.

use std::sync::{Mutex, PoisonError};

use crate::alarm::{PendingAlarm, ReminderKind};
use crate::types::EventId;

/// Callback invoked with the full, insertion-ordered snapshot after every
/// change to the pending set.
pub type AlarmObserver = Box<dyn Fn(&[PendingAlarm]) + Send>;

/// Single source of truth for the alarms currently firing on this device.
///
/// The registry deduplicates by [`AlarmId`](crate::AlarmId) and fans out
/// every change to at most one active observer (the foregrounded reminder
/// surface). It is volatile: on restart the platform scheduler re-fires
/// into an empty registry.
///
/// Every operation runs under one exclusive critical section, so an
/// observer registered mid-mutation sees either the pre- or post-mutation
/// snapshot, never a torn one. Observers are invoked synchronously inside
/// that critical section and must not call back into the registry; a
/// re-entrant call deadlocks. This is a documented contract, not enforced
/// at runtime.
pub struct AlarmRegistry {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    alarms: Vec<PendingAlarm>,
    observer: Option<AlarmObserver>,
}

impl Inner {
    fn notify(&self) {
        if let Some(observer) = &self.observer {
            observer(&self.alarms);
        }
    }
}

impl AlarmRegistry {
    /// Creates an empty registry with no observer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // An observer that panicked mid-notification poisons the lock;
        // the set itself is still consistent, so keep serving it.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Inserts an alarm unless one with the same identity is already
    /// pending, and notifies the observer on insert.
    ///
    /// Duplicate delivery is expected under retry, so a duplicate is a
    /// silent no-op. Returns whether the alarm was inserted.
    pub fn add(&self, alarm: PendingAlarm) -> bool {
        let mut inner = self.lock();
        if inner.alarms.iter().any(|a| a.id() == alarm.id()) {
            tracing::debug!(alarm = %alarm.id(), "duplicate alarm ignored");
            return false;
        }

        tracing::debug!(alarm = %alarm.id(), title = %alarm.event_title, "alarm pending");
        inner.alarms.push(alarm);
        inner.notify();
        true
    }

    /// Removes the alarm with the given identity, notifying the observer
    /// if something was removed. Returns whether removal occurred.
    pub fn remove(&self, event_id: EventId, kind: ReminderKind) -> bool {
        let mut inner = self.lock();
        let before = inner.alarms.len();
        inner
            .alarms
            .retain(|a| !(a.event_id == event_id && a.kind == kind));

        if inner.alarms.len() == before {
            return false;
        }

        tracing::debug!(event_id, kind = %kind, "alarm removed");
        inner.notify();
        true
    }

    /// Removes every pending alarm for the given event, whatever its
    /// kind. Used when a peer dismisses by event id, which carries no
    /// kind on the wire. Notifies at most once.
    pub fn remove_event(&self, event_id: EventId) -> bool {
        let mut inner = self.lock();
        let before = inner.alarms.len();
        inner.alarms.retain(|a| a.event_id != event_id);

        if inner.alarms.len() == before {
            return false;
        }

        tracing::debug!(event_id, "all alarms for event removed");
        inner.notify();
        true
    }

    /// Returns an insertion-ordered copy of all pending alarms.
    #[must_use]
    pub fn snapshot(&self) -> Vec<PendingAlarm> {
        self.lock().alarms.clone()
    }

    /// Whether any alarm is pending.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.lock().alarms.is_empty()
    }

    /// Empties the pending set and notifies the observer with an empty
    /// snapshot, even if the set was already empty.
    pub fn clear_all(&self) {
        let mut inner = self.lock();
        tracing::debug!(count = inner.alarms.len(), "clearing all pending alarms");
        inner.alarms.clear();
        inner.notify();
    }

    /// Registers the observer, replacing any prior one, and immediately
    /// replays the current snapshot to it so a newly-foregrounded surface
    /// never starts stale.
    pub fn register_observer(&self, observer: AlarmObserver) {
        let mut inner = self.lock();
        observer(&inner.alarms);
        inner.observer = Some(observer);
    }

    /// Clears the observer slot. Idempotent.
    pub fn unregister_observer(&self) {
        self.lock().observer = None;
    }
}

impl Default for AlarmRegistry {
    fn default() -> Self {
        Self::new()
    }
}
