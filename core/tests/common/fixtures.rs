// SPDX-FileCopyrightText: 2025-2026 The chime developers
//
// SPDX-License-Identifier: Apache-2.0

//! Test data factories for integration tests.

use std::sync::{Arc, Mutex};

use chime_core::{AlarmObserver, EpochMillis, EventId, PendingAlarm, ReminderKind};

/// Creates a pending alarm with derived title and times.
#[must_use]
pub fn alarm(event_id: EventId, kind: ReminderKind, triggered_at: EpochMillis) -> PendingAlarm {
    PendingAlarm {
        event_id,
        event_title: format!("event {event_id}"),
        event_start_time: triggered_at + 600_000,
        kind,
        triggered_at,
    }
}

/// Creates an initial-kind pending alarm.
#[must_use]
pub fn initial(event_id: EventId) -> PendingAlarm {
    alarm(event_id, ReminderKind::Initial, 1_700_000_000_000)
}

/// Creates a snoozed-kind pending alarm.
#[must_use]
pub fn snoozed(event_id: EventId) -> PendingAlarm {
    alarm(event_id, ReminderKind::Snoozed, 1_700_000_600_000)
}

/// Observer that keeps every snapshot it was notified with.
#[derive(Clone, Default)]
pub struct CountingObserver {
    snapshots: Arc<Mutex<Vec<Vec<PendingAlarm>>>>,
}

impl CountingObserver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Boxed callback to hand to `AlarmRegistry::register_observer`.
    #[must_use]
    pub fn callback(&self) -> AlarmObserver {
        let snapshots = Arc::clone(&self.snapshots);
        Box::new(move |snapshot: &[PendingAlarm]| {
            snapshots.lock().unwrap().push(snapshot.to_vec());
        })
    }

    /// Number of notifications received, including the registration replay.
    #[must_use]
    pub fn notifications(&self) -> usize {
        self.snapshots.lock().unwrap().len()
    }

    /// The most recent snapshot received.
    #[must_use]
    pub fn latest(&self) -> Vec<PendingAlarm> {
        self.snapshots.lock().unwrap().last().cloned().unwrap_or_default()
    }
}
