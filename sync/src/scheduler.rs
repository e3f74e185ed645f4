// SPDX-FileCopyrightText: 2025-2026 The chime developers
//
// SPDX-License-Identifier: Apache-2.0

//! The device-local collaborators the sync layer drives.

use async_trait::async_trait;

use chime_core::EventId;

use crate::protocol::EventSnapshot;

/// Errors surfaced by the local scheduler or calendar collaborators.
///
/// A closed set so the sync layer never has to inspect error text to
/// decide what happened.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    /// The platform rejected the requested change.
    #[error("rejected by scheduler: {0}")]
    Rejected(String),

    /// The backing store or platform service is unavailable.
    #[error("scheduler backend unavailable: {0}")]
    Unavailable(String),
}

/// The device's own alarm-handling path, driven by inbound peer
/// messages.
///
/// Implementations mutate platform alarm/notification state. All
/// operations must be idempotent: peers retransmit, so dismissing an
/// already-dismissed or never-scheduled event is a no-op, not an error.
#[async_trait]
pub trait ReminderScheduler: Send + Sync {
    /// Schedules (or reschedules) the reminder alarm for an event.
    async fn schedule(&self, event: EventSnapshot) -> Result<(), SchedulerError>;

    /// Withdraws any scheduled reminder for an event.
    async fn cancel(&self, event_id: EventId) -> Result<(), SchedulerError>;

    /// Dismisses the reminder for an event, taking down any notification.
    async fn dismiss(&self, event_id: EventId) -> Result<(), SchedulerError>;

    /// Snoozes the reminder for an event by the given interval.
    async fn snooze(&self, event_id: EventId, minutes: u32) -> Result<(), SchedulerError>;

    /// Replaces all peer-held reminder state with an authoritative
    /// snapshot.
    async fn replace_all(&self, events: Vec<EventSnapshot>) -> Result<(), SchedulerError>;
}

/// Supplies the full current reminder set for batch pushes.
///
/// Backed by calendar data retrieval, which lives outside the sync
/// layer; only this one query crosses the boundary.
#[async_trait]
pub trait CalendarSource: Send + Sync {
    /// Upcoming events with reminders, in calendar order.
    async fn upcoming_reminders(&self) -> Result<Vec<EventSnapshot>, SchedulerError>;
}
