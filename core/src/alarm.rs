// SPDX-FileCopyrightText: 2025-2026 The chime developers
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::str::FromStr;

use crate::types::{EpochMillis, EventId};

/// Distinguishes the initial alarm for an event reminder from a snoozed
/// re-fire of the same event.
///
/// The kind is part of alarm identity: the initial alarm and its snoozed
/// re-fire may demand attention at the same time and are dismissed
/// independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderKind {
    /// The first alarm scheduled for an event reminder.
    Initial,

    /// A re-fire scheduled by snoozing.
    Snoozed,
}

impl ReminderKind {
    /// All kinds, in a fixed order.
    pub const ALL: [ReminderKind; 2] = [ReminderKind::Initial, ReminderKind::Snoozed];

    /// The lowercase string form used in logs and payloads.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ReminderKind::Initial => "initial",
            ReminderKind::Snoozed => "snoozed",
        }
    }
}

impl fmt::Display for ReminderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a [`ReminderKind`] from a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidReminderKind(String);

impl fmt::Display for InvalidReminderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown reminder kind: {:?}", self.0)
    }
}

impl std::error::Error for InvalidReminderKind {}

impl FromStr for ReminderKind {
    type Err = InvalidReminderKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "initial" => Ok(ReminderKind::Initial),
            "snoozed" => Ok(ReminderKind::Snoozed),
            other => Err(InvalidReminderKind(other.to_string())),
        }
    }
}

/// Identity of a pending alarm: the source event plus the reminder kind.
///
/// Two alarms are the same alarm iff their ids are equal. Trigger times
/// are deliberately excluded so a re-fired alarm keeps its identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AlarmId {
    /// The source calendar event.
    pub event_id: EventId,

    /// Which reminder variant of the event this is.
    pub kind: ReminderKind,
}

impl fmt::Display for AlarmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.event_id, self.kind)
    }
}

/// An alarm currently demanding user attention on this device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAlarm {
    /// The source calendar event.
    pub event_id: EventId,

    /// Display title of the event.
    pub event_title: String,

    /// When the event itself starts.
    pub event_start_time: EpochMillis,

    /// Which reminder variant of the event fired.
    pub kind: ReminderKind,

    /// When this alarm instance fired locally.
    pub triggered_at: EpochMillis,
}

impl PendingAlarm {
    /// The identity of this alarm.
    #[must_use]
    pub const fn id(&self) -> AlarmId {
        AlarmId {
            event_id: self.event_id,
            kind: self.kind,
        }
    }
}
