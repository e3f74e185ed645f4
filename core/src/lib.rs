// SPDX-FileCopyrightText: 2025-2026 The chime developers
//
// SPDX-License-Identifier: Apache-2.0

//! Chime core: the reminder-alarm data model, the pending-alarm registry,
//! and the lifecycle flow that keeps paired devices reconciled.

mod alarm;
mod config;
mod reconcile;
mod registry;
mod types;

pub use crate::alarm::{AlarmId, InvalidReminderKind, PendingAlarm, ReminderKind};
pub use crate::config::{APP_NAME, Config};
pub use crate::reconcile::{ActionOrigin, Outcome, ReminderFlow, ReminderState};
pub use crate::registry::{AlarmObserver, AlarmRegistry};
pub use crate::types::{EpochMillis, EventId};
