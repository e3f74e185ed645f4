// SPDX-FileCopyrightText: 2025-2026 The chime developers
//
// SPDX-License-Identifier: Apache-2.0

//! Wire encoding of sync messages exchanged over the peer link.
//!
//! Every message is a path string plus an opaque payload. Encoding is
//! pure and total; decoding rejects malformed input without ever
//! panicking, since a buggy peer must not be able to take down the
//! receiving process.

use chime_core::{EpochMillis, EventId};

/// Wire paths forming the protocol's command set.
pub mod paths {
    /// Push one reminder to the peer (JSON payload).
    pub const SCHEDULE_REMINDER: &str = "/schedule_reminder";

    /// Withdraw a reminder from the peer (decimal event id).
    pub const CANCEL_REMINDER: &str = "/cancel_reminder";

    /// Tell the peer to take down its notification (decimal event id).
    pub const DISMISS_REMINDER: &str = "/dismiss_reminder";

    /// Ask the peer for a full snapshot (empty payload).
    pub const SYNC_ALL_REMINDERS: &str = "/sync_all_reminders";

    /// Full-replace calendar snapshot, written as a durable data item.
    pub const CALENDAR_EVENTS: &str = "/calendar_events";

    /// The peer's user dismissed a reminder there (decimal event id).
    pub const REMINDER_DISMISSED: &str = "/reminder_dismissed";

    /// The peer's user snoozed a reminder there (`snooze:<id>:<minutes>`).
    pub const REMINDER_SNOOZED: &str = "/reminder_snoozed";
}

/// Literal prefix of a snooze payload.
const SNOOZE_PREFIX: &str = "snooze:";

/// One calendar event entry, as pushed to peers.
///
/// Carries the reminder trigger time alongside the event start so the
/// receiving device can schedule its own alarm without calendar access.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSnapshot {
    /// The source calendar event.
    pub id: EventId,

    /// Display title of the event.
    pub title: String,

    /// When the event starts.
    pub start_time: EpochMillis,

    /// When the reminder alarm should fire.
    pub reminder_time: EpochMillis,
}

/// A decoded sync message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncMessage {
    /// Schedule one reminder on the receiving device.
    ScheduleReminder(EventSnapshot),

    /// Withdraw the reminder for an event.
    CancelReminder {
        /// The source calendar event.
        event_id: EventId,
    },

    /// Take down the notification for an event.
    DismissNotification {
        /// The source calendar event.
        event_id: EventId,
    },

    /// Request a full snapshot from the receiver.
    SyncAllRequest,

    /// Full-replace snapshot of upcoming reminders. Never a delta: the
    /// receiver replaces all prior batch state, and discards batches
    /// whose snapshot timestamp is not newer than the last applied one.
    CalendarEventsBatch {
        /// The snapshot contents, in calendar order.
        events: Vec<EventSnapshot>,

        /// When the snapshot was taken on the sender.
        snapshot_timestamp: EpochMillis,
    },

    /// The sender's user dismissed a reminder there.
    ReminderDismissed {
        /// The source calendar event.
        event_id: EventId,
    },

    /// The sender's user snoozed a reminder there.
    ReminderSnoozed {
        /// The source calendar event.
        event_id: EventId,

        /// Requested snooze interval.
        minutes: u32,
    },
}

impl SyncMessage {
    /// The wire path this message travels on.
    #[must_use]
    pub const fn path(&self) -> &'static str {
        match self {
            SyncMessage::ScheduleReminder(_) => paths::SCHEDULE_REMINDER,
            SyncMessage::CancelReminder { .. } => paths::CANCEL_REMINDER,
            SyncMessage::DismissNotification { .. } => paths::DISMISS_REMINDER,
            SyncMessage::SyncAllRequest => paths::SYNC_ALL_REMINDERS,
            SyncMessage::CalendarEventsBatch { .. } => paths::CALENDAR_EVENTS,
            SyncMessage::ReminderDismissed { .. } => paths::REMINDER_DISMISSED,
            SyncMessage::ReminderSnoozed { .. } => paths::REMINDER_SNOOZED,
        }
    }
}

/// Decode failure. Dropped-and-logged at the coordinator boundary.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The path is not part of the protocol's command set.
    #[error("unrecognized wire path: {0:?}")]
    UnknownPath(String),

    /// A plain-string payload was not valid UTF-8.
    #[error("payload is not valid UTF-8")]
    InvalidUtf8,

    /// An event id field did not parse as a decimal integer.
    #[error("invalid event id: {0:?}")]
    InvalidEventId(String),

    /// A snooze minutes field did not parse as a decimal integer.
    #[error("invalid snooze minutes: {0:?}")]
    InvalidMinutes(String),

    /// A snooze payload did not start with the `snooze:` prefix.
    #[error("snooze payload missing the \"snooze:\" prefix")]
    MissingPrefix,

    /// A snooze payload had no `:` between event id and minutes.
    #[error("snooze payload missing the id:minutes delimiter")]
    MissingDelimiter,

    /// A JSON payload was missing fields or not JSON at all.
    #[error("malformed JSON payload: {0}")]
    Json(#[from] serde_json::Error),
}

// The schedule payload spells the id out as `eventId`, unlike batch
// entries which use the bare `id`. Both shapes are fixed by the wire.
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScheduleReminderWire {
    event_id: EventId,
    title: String,
    start_time: EpochMillis,
    reminder_time: EpochMillis,
}

#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct CalendarEventsWire {
    events: Vec<EventSnapshot>,
    snapshot_timestamp: EpochMillis,
}

/// Encodes a message into its wire path and payload.
#[must_use]
pub fn encode(message: &SyncMessage) -> (&'static str, Vec<u8>) {
    let payload = match message {
        SyncMessage::ScheduleReminder(event) => {
            let wire = ScheduleReminderWire {
                event_id: event.id,
                title: event.title.clone(),
                start_time: event.start_time,
                reminder_time: event.reminder_time,
            };
            // serializing a plain struct of scalars and strings cannot fail
            serde_json::to_vec(&wire).unwrap_or_default()
        }
        SyncMessage::CancelReminder { event_id }
        | SyncMessage::DismissNotification { event_id }
        | SyncMessage::ReminderDismissed { event_id } => event_id.to_string().into_bytes(),
        SyncMessage::SyncAllRequest => Vec::new(),
        SyncMessage::CalendarEventsBatch {
            events,
            snapshot_timestamp,
        } => {
            let wire = CalendarEventsWire {
                events: events.clone(),
                snapshot_timestamp: *snapshot_timestamp,
            };
            serde_json::to_vec(&wire).unwrap_or_default()
        }
        SyncMessage::ReminderSnoozed { event_id, minutes } => {
            format!("{SNOOZE_PREFIX}{event_id}:{minutes}").into_bytes()
        }
    };

    (message.path(), payload)
}

/// Decodes an inbound path and payload into a message.
///
/// # Errors
///
/// Returns a [`ProtocolError`] when the path is unrecognized or the
/// payload does not match the shape the path requires.
pub fn decode(path: &str, payload: &[u8]) -> Result<SyncMessage, ProtocolError> {
    match path {
        paths::SCHEDULE_REMINDER => {
            let wire: ScheduleReminderWire = serde_json::from_slice(payload)?;
            Ok(SyncMessage::ScheduleReminder(EventSnapshot {
                id: wire.event_id,
                title: wire.title,
                start_time: wire.start_time,
                reminder_time: wire.reminder_time,
            }))
        }
        paths::CANCEL_REMINDER => Ok(SyncMessage::CancelReminder {
            event_id: decode_event_id(payload)?,
        }),
        paths::DISMISS_REMINDER => Ok(SyncMessage::DismissNotification {
            event_id: decode_event_id(payload)?,
        }),
        paths::SYNC_ALL_REMINDERS => Ok(SyncMessage::SyncAllRequest),
        paths::CALENDAR_EVENTS => {
            let wire: CalendarEventsWire = serde_json::from_slice(payload)?;
            Ok(SyncMessage::CalendarEventsBatch {
                events: wire.events,
                snapshot_timestamp: wire.snapshot_timestamp,
            })
        }
        paths::REMINDER_DISMISSED => Ok(SyncMessage::ReminderDismissed {
            event_id: decode_event_id(payload)?,
        }),
        paths::REMINDER_SNOOZED => decode_snooze(payload),
        other => Err(ProtocolError::UnknownPath(other.to_string())),
    }
}

fn decode_event_id(payload: &[u8]) -> Result<EventId, ProtocolError> {
    let text = std::str::from_utf8(payload).map_err(|_| ProtocolError::InvalidUtf8)?;
    text.trim()
        .parse()
        .map_err(|_| ProtocolError::InvalidEventId(text.to_string()))
}

fn decode_snooze(payload: &[u8]) -> Result<SyncMessage, ProtocolError> {
    let text = std::str::from_utf8(payload).map_err(|_| ProtocolError::InvalidUtf8)?;
    let rest = text
        .strip_prefix(SNOOZE_PREFIX)
        .ok_or(ProtocolError::MissingPrefix)?;

    let (id, minutes) = rest.split_once(':').ok_or(ProtocolError::MissingDelimiter)?;
    Ok(SyncMessage::ReminderSnoozed {
        event_id: id
            .parse()
            .map_err(|_| ProtocolError::InvalidEventId(id.to_string()))?,
        minutes: minutes
            .parse()
            .map_err(|_| ProtocolError::InvalidMinutes(minutes.to_string()))?,
    })
}
