// SPDX-FileCopyrightText: 2025-2026 The chime developers
//
// SPDX-License-Identifier: Apache-2.0

//! The transport boundary between paired devices.

use std::fmt;

use async_trait::async_trait;

/// Identifier of a paired peer device.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PeerId(String);

impl PeerId {
    /// Wraps a transport-assigned peer identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PeerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Descriptor of a connected peer device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Peer {
    /// Transport-assigned identifier.
    pub id: PeerId,

    /// Human-readable device name.
    pub display_name: String,
}

impl Peer {
    /// Creates a peer descriptor.
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: PeerId::new(id),
            display_name: display_name.into(),
        }
    }
}

/// Peer link transport errors.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    /// The addressed peer is not connected.
    #[error("peer {0} is not connected")]
    PeerUnreachable(PeerId),

    /// The transport rejected the send or put.
    #[error("rejected by transport: {0}")]
    Rejected(String),

    /// The transport itself is unavailable.
    #[error("transport unavailable: {0}")]
    Unavailable(String),
}

/// Message-and-data-item delivery service between paired devices.
///
/// Two delivery classes: [`send_message`](PeerLink::send_message) is
/// best-effort and low-latency, delivered only if the peer is connected
/// right now; [`put_data_item`](PeerLink::put_data_item) is durable,
/// replicated to peers whenever connectivity resumes. Presence is
/// observable through [`connected_peers`](PeerLink::connected_peers),
/// but a peer may disconnect between a presence check and a send; that
/// race is part of the best-effort contract.
#[async_trait]
pub trait PeerLink: Send + Sync {
    /// Peers currently reachable over the link.
    async fn connected_peers(&self) -> Result<Vec<Peer>, LinkError>;

    /// Sends a transient message to one connected peer.
    async fn send_message(&self, peer: &PeerId, path: &str, payload: &[u8])
    -> Result<(), LinkError>;

    /// Writes a durable data item, eventually visible to all peers. The
    /// latest write per path wins.
    async fn put_data_item(&self, path: &str, payload: &[u8]) -> Result<(), LinkError>;
}
