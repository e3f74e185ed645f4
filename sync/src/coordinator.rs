// SPDX-FileCopyrightText: 2025-2026 The chime developers
//
// SPDX-License-Identifier: Apache-2.0

//! Bridges local alarm state to the peer link, in both directions.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tracing::{debug, info, warn};

use chime_core::{
    ActionOrigin, AlarmId, AlarmRegistry, EpochMillis, EventId, PendingAlarm, ReminderFlow,
    ReminderKind,
};

use crate::error::SyncError;
use crate::link::{Peer, PeerId, PeerLink};
use crate::protocol::{self, EventSnapshot, SyncMessage};
use crate::scheduler::{CalendarSource, ReminderScheduler};

/// Which side of the pairing this device is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceRole {
    /// Owns the calendar: schedules reminders and pushes state.
    Primary,

    /// Mirrors the primary's reminders.
    Companion,
}

/// Orchestrates outbound pushes and inbound peer messages.
///
/// Outbound operations are fire-and-forget: they return immediately and
/// perform their I/O on a detached task. Delivery is best-effort with no
/// retry; a missed push is repaired by the full resync that follows the
/// next peer connection. No failure in this layer ever reaches a caller
/// or crashes the process.
///
/// Cloning is cheap and clones share all state.
#[derive(Clone)]
pub struct SyncCoordinator {
    inner: Arc<Inner>,
}

struct Inner {
    role: DeviceRole,
    link: Arc<dyn PeerLink>,
    scheduler: Arc<dyn ReminderScheduler>,
    source: Arc<dyn CalendarSource>,
    registry: Arc<AlarmRegistry>,
    flow: Mutex<ReminderFlow>,
    last_batch_applied: tokio::sync::Mutex<EpochMillis>,
}

impl SyncCoordinator {
    /// Creates a coordinator for one side of the pairing.
    #[must_use]
    pub fn new(
        role: DeviceRole,
        link: Arc<dyn PeerLink>,
        scheduler: Arc<dyn ReminderScheduler>,
        source: Arc<dyn CalendarSource>,
        registry: Arc<AlarmRegistry>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                role,
                link,
                scheduler,
                source,
                registry,
                flow: Mutex::new(ReminderFlow::new()),
                last_batch_applied: tokio::sync::Mutex::new(EpochMillis::MIN),
            }),
        }
    }

    /// Which side of the pairing this coordinator drives.
    #[must_use]
    pub fn role(&self) -> DeviceRole {
        self.inner.role
    }

    /// The registry of alarms currently firing on this device.
    #[must_use]
    pub fn registry(&self) -> &Arc<AlarmRegistry> {
        &self.inner.registry
    }

    fn flow(&self) -> MutexGuard<'_, ReminderFlow> {
        self.inner.flow.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ---- outbound ----------------------------------------------------

    /// Pushes one reminder to all connected peers. Fire-and-forget.
    pub fn push_reminder(&self, event: EventSnapshot) {
        self.spawn_send(SyncMessage::ScheduleReminder(event));
    }

    /// Withdraws a reminder from all connected peers. Fire-and-forget.
    pub fn cancel_reminder(&self, event_id: EventId) {
        self.spawn_send(SyncMessage::CancelReminder { event_id });
    }

    /// Tells peers a reminder was dismissed here. Fire-and-forget.
    pub fn notify_dismissed(&self, event_id: EventId) {
        self.spawn_send(self.dismissal_message(event_id));
    }

    /// Asks all connected peers for a full snapshot. Fire-and-forget.
    pub fn request_full_sync(&self) {
        self.spawn_send(SyncMessage::SyncAllRequest);
    }

    /// Writes the full reminder set as a durable data item with a fresh
    /// snapshot timestamp. Fire-and-forget.
    ///
    /// Batches go through the durable layer rather than the message
    /// channel: a peer mid-reconnect would miss a transient message, but
    /// the data item reaches it once connectivity resumes.
    pub fn push_batch(&self, events: Vec<EventSnapshot>) {
        let this = self.clone();
        tokio::spawn(async move {
            if let Err(e) = this.put_batch(events).await {
                warn!(error = %e, "calendar batch push failed");
            }
        });
    }

    fn dismissal_message(&self, event_id: EventId) -> SyncMessage {
        match self.inner.role {
            // the companion only needs its notification taken down
            DeviceRole::Primary => SyncMessage::DismissNotification { event_id },
            // the primary owns the alarm and needs to know the user acted
            DeviceRole::Companion => SyncMessage::ReminderDismissed { event_id },
        }
    }

    fn spawn_send(&self, message: SyncMessage) {
        let this = self.clone();
        tokio::spawn(async move {
            let path = message.path();
            if let Err(e) = this.send_to_connected(message).await {
                warn!(path, error = %e, "peer push failed");
            }
        });
    }

    /// Sends a message to every currently connected peer. Skipped
    /// entirely when no peer is present: peer absence is a normal,
    /// frequent state, and staleness is repaired by resync on reconnect,
    /// not by a retry queue.
    async fn send_to_connected(&self, message: SyncMessage) -> Result<(), SyncError> {
        let peers = self.inner.link.connected_peers().await?;
        if peers.is_empty() {
            debug!(path = message.path(), "no peer connected, push skipped");
            return Ok(());
        }

        let (path, payload) = protocol::encode(&message);
        for peer in &peers {
            match self.inner.link.send_message(&peer.id, path, &payload).await {
                Ok(()) => debug!(peer = %peer.id, path, "sent"),
                Err(e) => warn!(peer = %peer.id, path, error = %e, "send failed"),
            }
        }
        Ok(())
    }

    async fn put_batch(&self, events: Vec<EventSnapshot>) -> Result<(), SyncError> {
        let snapshot_timestamp = Utc::now().timestamp_millis();
        let count = events.len();
        let (path, payload) = protocol::encode(&SyncMessage::CalendarEventsBatch {
            events,
            snapshot_timestamp,
        });
        self.inner.link.put_data_item(path, &payload).await?;
        debug!(count, snapshot_timestamp, "calendar batch written");
        Ok(())
    }

    // ---- local actions -----------------------------------------------

    /// Records an alarm fired by the local platform scheduler.
    ///
    /// Only a local fire can surface an alarm; peer messages never do.
    /// Returns whether the alarm surfaced (false for a duplicate fire or
    /// one that raced with a dismissal).
    pub fn reminder_fired(&self, alarm: PendingAlarm) -> bool {
        if !self.flow().fired(alarm.id()) {
            return false;
        }
        self.inner.registry.add(alarm)
    }

    /// Applies a user dismissal taken on this device and relays it to
    /// peers.
    pub fn dismissed_locally(&self, event_id: EventId, kind: ReminderKind) {
        let outcome = self
            .flow()
            .dismiss(AlarmId { event_id, kind }, ActionOrigin::Local);
        self.inner.registry.remove(event_id, kind);
        if outcome.notify_peer {
            self.notify_dismissed(event_id);
        }
    }

    /// Applies a user snooze taken on this device and relays it to
    /// peers.
    pub fn snoozed_locally(&self, event_id: EventId, kind: ReminderKind, minutes: u32) {
        let outcome = self
            .flow()
            .snooze(AlarmId { event_id, kind }, ActionOrigin::Local);
        self.inner.registry.remove(event_id, kind);
        if outcome.notify_peer {
            let message = match self.inner.role {
                // the re-fire will be pushed anew; the companion only
                // needs its current notification cleared
                DeviceRole::Primary => SyncMessage::DismissNotification { event_id },
                DeviceRole::Companion => SyncMessage::ReminderSnoozed { event_id, minutes },
            };
            self.spawn_send(message);
        }
    }

    // ---- inbound -----------------------------------------------------

    /// Inbound message entry point, invoked by the peer link.
    ///
    /// Malformed input and collaborator failures are logged and
    /// swallowed here; an adversarial or buggy peer cannot crash this
    /// process.
    pub async fn handle_message(&self, from: &PeerId, path: &str, payload: &[u8]) {
        let message = match protocol::decode(path, payload) {
            Ok(message) => message,
            Err(e) => {
                warn!(peer = %from, path, error = %e, "dropping malformed peer message");
                return;
            }
        };

        if let Err(e) = self.apply_inbound(from, message).await {
            warn!(peer = %from, path, error = %e, "peer message not applied");
        }
    }

    /// Peer-connect event from the link.
    ///
    /// A reconnecting peer may have missed any number of transient
    /// messages; only a full-state exchange restores consistency, so the
    /// primary pushes its snapshot and the companion asks for one.
    pub async fn handle_peer_connected(&self, peer: &Peer) {
        info!(peer = %peer.id, name = %peer.display_name, "peer connected");
        match self.inner.role {
            DeviceRole::Primary => match self.inner.source.upcoming_reminders().await {
                Ok(events) => {
                    if let Err(e) = self.put_batch(events).await {
                        warn!(peer = %peer.id, error = %e, "full-state push failed");
                    }
                }
                Err(e) => warn!(peer = %peer.id, error = %e, "calendar snapshot failed"),
            },
            DeviceRole::Companion => {
                if let Err(e) = self.send_to_connected(SyncMessage::SyncAllRequest).await {
                    warn!(peer = %peer.id, error = %e, "sync request failed");
                }
            }
        }
    }

    /// Peer-disconnect event from the link. Peer absence is a normal
    /// state, not a failure: nothing is mutated, and staleness is
    /// repaired on reconnect.
    pub fn handle_peer_disconnected(&self, peer: &Peer) {
        info!(peer = %peer.id, "peer disconnected");
    }

    async fn apply_inbound(&self, from: &PeerId, message: SyncMessage) -> Result<(), SyncError> {
        match message {
            SyncMessage::ScheduleReminder(event) => {
                debug!(peer = %from, event_id = event.id, "peer pushed reminder");
                self.inner.scheduler.schedule(event).await?;
            }
            SyncMessage::CancelReminder { event_id } => {
                debug!(peer = %from, event_id, "peer withdrew reminder");
                self.inner.registry.remove_event(event_id);
                self.inner.scheduler.cancel(event_id).await?;
            }
            SyncMessage::DismissNotification { event_id }
            | SyncMessage::ReminderDismissed { event_id } => {
                self.dismiss_from_peer(event_id).await?;
            }
            SyncMessage::SyncAllRequest => {
                if self.inner.role == DeviceRole::Primary {
                    debug!(peer = %from, "full sync requested");
                    let events = self.inner.source.upcoming_reminders().await?;
                    self.put_batch(events).await?;
                } else {
                    debug!(peer = %from, "ignoring sync request on companion");
                }
            }
            SyncMessage::CalendarEventsBatch {
                events,
                snapshot_timestamp,
            } => {
                self.apply_batch(events, snapshot_timestamp).await?;
            }
            SyncMessage::ReminderSnoozed { event_id, minutes } => {
                self.snooze_from_peer(event_id, minutes).await?;
            }
        }
        Ok(())
    }

    /// Applies a dismissal reported by a peer. Never echoed back: the
    /// peer already knows, and an echo would bounce between the devices
    /// indefinitely.
    async fn dismiss_from_peer(&self, event_id: EventId) -> Result<(), SyncError> {
        // the wire carries no kind, so end every variant of the event
        let mut applied = false;
        {
            let mut flow = self.flow();
            for kind in ReminderKind::ALL {
                applied |= flow
                    .dismiss(AlarmId { event_id, kind }, ActionOrigin::Peer)
                    .applied;
            }
        }

        if !applied {
            debug!(event_id, "peer dismissal already applied");
            return Ok(());
        }

        self.inner.registry.remove_event(event_id);
        self.inner.scheduler.dismiss(event_id).await?;
        Ok(())
    }

    /// Applies a snooze reported by a peer. Never echoed back.
    async fn snooze_from_peer(&self, event_id: EventId, minutes: u32) -> Result<(), SyncError> {
        let mut applied = false;
        {
            let mut flow = self.flow();
            for kind in ReminderKind::ALL {
                applied |= flow
                    .snooze(AlarmId { event_id, kind }, ActionOrigin::Peer)
                    .applied;
            }
        }

        if !applied {
            debug!(event_id, "peer snooze already applied");
            return Ok(());
        }

        self.inner.registry.remove_event(event_id);
        self.inner.scheduler.snooze(event_id, minutes).await?;
        Ok(())
    }

    /// Applies a full-replace calendar batch, discarding stale
    /// snapshots. Batch application is serialized so replacements stay
    /// in snapshot order even when deliveries race.
    async fn apply_batch(
        &self,
        events: Vec<EventSnapshot>,
        snapshot_timestamp: EpochMillis,
    ) -> Result<(), SyncError> {
        let mut last = self.inner.last_batch_applied.lock().await;
        if snapshot_timestamp <= *last {
            warn!(
                snapshot_timestamp,
                last_applied = *last,
                "stale calendar batch discarded"
            );
            return Ok(());
        }

        let count = events.len();
        self.inner.scheduler.replace_all(events).await?;
        *last = snapshot_timestamp;
        debug!(count, snapshot_timestamp, "calendar batch applied");
        Ok(())
    }
}
