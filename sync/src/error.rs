// SPDX-FileCopyrightText: 2025-2026 The chime developers
//
// SPDX-License-Identifier: Apache-2.0

use crate::link::LinkError;
use crate::protocol::ProtocolError;
use crate::scheduler::SchedulerError;

/// Failures inside the sync layer.
///
/// Nothing here propagates past the coordinator: every failure is
/// terminal at the boundary where it is detected, logged, and swallowed.
/// The worst a user observes is a peer that did not update, repaired by
/// the next full resync.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The peer link failed a presence query, send, or put.
    #[error("peer link: {0}")]
    Link(#[from] LinkError),

    /// An inbound payload could not be decoded.
    #[error("protocol: {0}")]
    Protocol(#[from] ProtocolError),

    /// A local scheduler or calendar collaborator failed.
    #[error("scheduler: {0}")]
    Scheduler(#[from] SchedulerError),
}
