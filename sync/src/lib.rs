// SPDX-FileCopyrightText: 2025-2026 The chime developers
//
// SPDX-License-Identifier: Apache-2.0

//! Peer synchronization for chime reminder alarms.
//!
//! Keeps reminder state consistent across two independently-clocked,
//! intermittently-connected devices: a primary that owns the calendar
//! and a companion that mirrors it. Delivery is best-effort and
//! identity-keyed, so duplicated or reordered peer messages are safe;
//! full snapshots repair whatever a disconnected peer missed.

mod coordinator;
mod error;
mod link;
mod loopback;
mod protocol;
mod scheduler;

pub use crate::coordinator::{DeviceRole, SyncCoordinator};
pub use crate::error::SyncError;
pub use crate::link::{LinkError, Peer, PeerId, PeerLink};
pub use crate::loopback::{LinkEvent, LoopbackEndpoint, LoopbackLink, drive, pair};
pub use crate::protocol::{EventSnapshot, ProtocolError, SyncMessage, decode, encode, paths};
pub use crate::scheduler::{CalendarSource, ReminderScheduler, SchedulerError};
