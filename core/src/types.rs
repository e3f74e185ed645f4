// SPDX-FileCopyrightText: 2025-2026 The chime developers
//
// SPDX-License-Identifier: Apache-2.0

/// Identifier of a source calendar event, stable across paired devices.
pub type EventId = i64;

/// Absolute timestamp in milliseconds since the Unix epoch.
///
/// Timestamps cross the device boundary in this form, so the core keeps
/// them raw instead of converting into a local time zone.
pub type EpochMillis = i64;
