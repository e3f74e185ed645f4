// SPDX-FileCopyrightText: 2025-2026 The chime developers
//
// SPDX-License-Identifier: Apache-2.0

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use chime_core::EventId;
use chime_sync::{
    CalendarSource, EventSnapshot, LinkError, Peer, PeerId, PeerLink, ReminderScheduler,
    SchedulerError,
};

/// Creates an event snapshot with derived title and times.
#[must_use]
pub fn snapshot(id: EventId) -> EventSnapshot {
    EventSnapshot {
        id,
        title: format!("event {id}"),
        start_time: 1_700_000_000_000 + id,
        reminder_time: 1_699_999_400_000 + id,
    }
}

/// Polls a condition until it holds or a second passes.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached within one second");
}

/// One recorded outbound transmission.
#[derive(Debug, Clone)]
pub struct Sent {
    /// Target peer for messages, `None` for data items.
    pub peer: Option<PeerId>,
    pub path: String,
    pub payload: Vec<u8>,
    /// Whether this went through the durable data-item layer.
    pub durable: bool,
}

/// Peer link double that records every send and put.
pub struct RecordingLink {
    peers: Mutex<Vec<Peer>>,
    sent: mpsc::UnboundedSender<Sent>,
}

impl RecordingLink {
    /// Returns the link and the stream of recorded transmissions.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Sent>) {
        let (sent, received) = mpsc::unbounded_channel();
        (
            Self {
                peers: Mutex::new(Vec::new()),
                sent,
            },
            received,
        )
    }

    /// Replaces the set of currently connected peers.
    pub fn set_peers(&self, peers: Vec<Peer>) {
        *self.peers.lock().unwrap() = peers;
    }
}

#[async_trait]
impl PeerLink for RecordingLink {
    async fn connected_peers(&self) -> Result<Vec<Peer>, LinkError> {
        Ok(self.peers.lock().unwrap().clone())
    }

    async fn send_message(
        &self,
        peer: &PeerId,
        path: &str,
        payload: &[u8],
    ) -> Result<(), LinkError> {
        let _ = self.sent.send(Sent {
            peer: Some(peer.clone()),
            path: path.to_string(),
            payload: payload.to_vec(),
            durable: false,
        });
        Ok(())
    }

    async fn put_data_item(&self, path: &str, payload: &[u8]) -> Result<(), LinkError> {
        let _ = self.sent.send(Sent {
            peer: None,
            path: path.to_string(),
            payload: payload.to_vec(),
            durable: true,
        });
        Ok(())
    }
}

/// One recorded call into the local scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerCall {
    Schedule(EventSnapshot),
    Cancel(EventId),
    Dismiss(EventId),
    Snooze(EventId, u32),
    ReplaceAll(Vec<EventSnapshot>),
}

/// Scheduler double that records every call and always succeeds.
#[derive(Default)]
pub struct ScriptedScheduler {
    calls: Mutex<Vec<SchedulerCall>>,
}

impl ScriptedScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far, in call order.
    #[must_use]
    pub fn calls(&self) -> Vec<SchedulerCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: SchedulerCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ReminderScheduler for ScriptedScheduler {
    async fn schedule(&self, event: EventSnapshot) -> Result<(), SchedulerError> {
        self.record(SchedulerCall::Schedule(event));
        Ok(())
    }

    async fn cancel(&self, event_id: EventId) -> Result<(), SchedulerError> {
        self.record(SchedulerCall::Cancel(event_id));
        Ok(())
    }

    async fn dismiss(&self, event_id: EventId) -> Result<(), SchedulerError> {
        self.record(SchedulerCall::Dismiss(event_id));
        Ok(())
    }

    async fn snooze(&self, event_id: EventId, minutes: u32) -> Result<(), SchedulerError> {
        self.record(SchedulerCall::Snooze(event_id, minutes));
        Ok(())
    }

    async fn replace_all(&self, events: Vec<EventSnapshot>) -> Result<(), SchedulerError> {
        self.record(SchedulerCall::ReplaceAll(events));
        Ok(())
    }
}

/// Calendar source double returning a fixed set of events.
#[derive(Default)]
pub struct FixedSource {
    events: Vec<EventSnapshot>,
}

impl FixedSource {
    #[must_use]
    pub fn new(events: Vec<EventSnapshot>) -> Self {
        Self { events }
    }

    /// A source with nothing upcoming.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CalendarSource for FixedSource {
    async fn upcoming_reminders(&self) -> Result<Vec<EventSnapshot>, SchedulerError> {
        Ok(self.events.clone())
    }
}
