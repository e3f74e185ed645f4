// SPDX-FileCopyrightText: 2025-2026 The chime developers
//
// SPDX-License-Identifier: Apache-2.0

//! In-process peer link joining two endpoints.
//!
//! Models the transport contract closely enough to exercise the whole
//! sync layer without a device on the other end: transient messages are
//! dropped while disconnected, data items are held and flushed to the
//! other side on reconnect. Used by the integration tests and the CLI
//! simulator.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::coordinator::SyncCoordinator;
use crate::link::{LinkError, Peer, PeerId, PeerLink};

/// Event delivered to one endpoint of a loopback pair.
#[derive(Debug)]
pub enum LinkEvent {
    /// The other endpoint became reachable.
    PeerConnected(Peer),

    /// The other endpoint went away.
    PeerDisconnected(Peer),

    /// A message or data item arrived.
    Message {
        /// The sending endpoint.
        from: PeerId,
        /// Wire path.
        path: String,
        /// Opaque payload.
        payload: Vec<u8>,
    },
}

/// One endpoint of a loopback pair.
pub struct LoopbackEndpoint {
    /// The link half, to hand to a coordinator.
    pub link: Arc<LoopbackLink>,

    /// Inbound events for this endpoint; feed them to
    /// [`drive`] or consume them directly in tests.
    pub events: mpsc::UnboundedReceiver<LinkEvent>,
}

/// Creates two linked endpoints, initially disconnected.
#[must_use]
pub fn pair(a: Peer, b: Peer) -> (LoopbackEndpoint, LoopbackEndpoint) {
    let (tx_a, rx_a) = mpsc::unbounded_channel();
    let (tx_b, rx_b) = mpsc::unbounded_channel();

    let shared = Arc::new(Shared {
        peers: [a, b],
        connected: AtomicBool::new(false),
        items: Mutex::new(HashMap::new()),
        txs: [tx_a, tx_b],
    });

    let endpoint = |side: usize, events| LoopbackEndpoint {
        link: Arc::new(LoopbackLink {
            side,
            shared: Arc::clone(&shared),
        }),
        events,
    };
    (endpoint(0, rx_a), endpoint(1, rx_b))
}

/// Feeds an endpoint's events into a coordinator on a detached task.
pub fn drive(
    mut events: mpsc::UnboundedReceiver<LinkEvent>,
    coordinator: SyncCoordinator,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                LinkEvent::PeerConnected(peer) => coordinator.handle_peer_connected(&peer).await,
                LinkEvent::PeerDisconnected(peer) => coordinator.handle_peer_disconnected(&peer),
                LinkEvent::Message {
                    from,
                    path,
                    payload,
                } => coordinator.handle_message(&from, &path, &payload).await,
            }
        }
    })
}

struct Shared {
    peers: [Peer; 2],
    connected: AtomicBool,
    // durable store: path -> (writing side, payload)
    items: Mutex<HashMap<String, (usize, Vec<u8>)>>,
    txs: [mpsc::UnboundedSender<LinkEvent>; 2],
}

/// One side's view of the in-process link.
pub struct LoopbackLink {
    side: usize,
    shared: Arc<Shared>,
}

impl LoopbackLink {
    fn other(&self) -> usize {
        1 - self.side
    }

    /// The peer descriptor of the other endpoint.
    #[must_use]
    pub fn remote(&self) -> &Peer {
        &self.shared.peers[self.other()]
    }

    fn local(&self) -> &Peer {
        &self.shared.peers[self.side]
    }

    /// Connects or disconnects the pair, emitting presence events to
    /// both endpoints. Connecting flushes held data items to the side
    /// that did not write them.
    pub fn set_connected(&self, connected: bool) {
        let was = self.shared.connected.swap(connected, Ordering::SeqCst);
        if was == connected {
            return;
        }

        for side in 0..2 {
            let other = self.shared.peers[1 - side].clone();
            let event = if connected {
                LinkEvent::PeerConnected(other)
            } else {
                LinkEvent::PeerDisconnected(other)
            };
            let _ = self.shared.txs[side].send(event);
        }

        if connected {
            let items = self
                .shared
                .items
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            for (path, (writer, payload)) in items.iter() {
                let reader = 1 - *writer;
                let _ = self.shared.txs[reader].send(LinkEvent::Message {
                    from: self.shared.peers[*writer].id.clone(),
                    path: path.clone(),
                    payload: payload.clone(),
                });
            }
        }
    }
}

#[async_trait]
impl PeerLink for LoopbackLink {
    async fn connected_peers(&self) -> Result<Vec<Peer>, LinkError> {
        if self.shared.connected.load(Ordering::SeqCst) {
            Ok(vec![self.remote().clone()])
        } else {
            Ok(Vec::new())
        }
    }

    async fn send_message(
        &self,
        peer: &PeerId,
        path: &str,
        payload: &[u8],
    ) -> Result<(), LinkError> {
        if !self.shared.connected.load(Ordering::SeqCst) || *peer != self.remote().id {
            return Err(LinkError::PeerUnreachable(peer.clone()));
        }

        self.shared.txs[self.other()]
            .send(LinkEvent::Message {
                from: self.local().id.clone(),
                path: path.to_string(),
                payload: payload.to_vec(),
            })
            .map_err(|_| LinkError::Rejected("endpoint dropped".into()))
    }

    async fn put_data_item(&self, path: &str, payload: &[u8]) -> Result<(), LinkError> {
        self.shared
            .items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.to_string(), (self.side, payload.to_vec()));

        // delivered now if connected, or flushed on the next connect
        if self.shared.connected.load(Ordering::SeqCst) {
            let _ = self.shared.txs[self.other()].send(LinkEvent::Message {
                from: self.local().id.clone(),
                path: path.to_string(),
                payload: payload.to_vec(),
            });
        }
        Ok(())
    }
}
