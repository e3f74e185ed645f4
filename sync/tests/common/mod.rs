// SPDX-FileCopyrightText: 2025-2026 The chime developers
//
// SPDX-License-Identifier: Apache-2.0

//! Common test utilities: recording collaborator doubles and fixtures.

mod mocks;

#[allow(unused_imports)]
pub use mocks::{
    FixedSource, RecordingLink, ScriptedScheduler, SchedulerCall, Sent, snapshot, wait_until,
};
