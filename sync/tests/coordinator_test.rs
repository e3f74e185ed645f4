// SPDX-FileCopyrightText: 2025-2026 The chime developers
//
// SPDX-License-Identifier: Apache-2.0

//! Coordinator behavior against recording collaborator doubles.

mod common;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::timeout;

use chime_core::{AlarmRegistry, PendingAlarm, ReminderKind};
use chime_sync::{
    DeviceRole, Peer, PeerLink, ReminderScheduler, SyncCoordinator, SyncMessage, encode, paths,
};
use common::{FixedSource, RecordingLink, SchedulerCall, ScriptedScheduler, Sent, snapshot};

struct Harness {
    coordinator: SyncCoordinator,
    link: Arc<RecordingLink>,
    scheduler: Arc<ScriptedScheduler>,
    sent: mpsc::UnboundedReceiver<Sent>,
}

fn harness(role: DeviceRole, source: FixedSource) -> Harness {
    let (link, sent) = RecordingLink::new();
    let link = Arc::new(link);
    let scheduler = Arc::new(ScriptedScheduler::new());
    let coordinator = SyncCoordinator::new(
        role,
        Arc::clone(&link) as Arc<dyn PeerLink>,
        Arc::clone(&scheduler) as Arc<dyn ReminderScheduler>,
        Arc::new(source),
        Arc::new(AlarmRegistry::new()),
    );
    Harness {
        coordinator,
        link,
        scheduler,
        sent,
    }
}

fn watch() -> Peer {
    Peer::new("watch-1", "Watch")
}

fn firing(event_id: i64, kind: ReminderKind) -> PendingAlarm {
    PendingAlarm {
        event_id,
        event_title: format!("event {event_id}"),
        event_start_time: 1_700_000_000_000,
        kind,
        triggered_at: 1_699_999_400_000,
    }
}

async fn expect_sent(sent: &mut mpsc::UnboundedReceiver<Sent>) -> Sent {
    timeout(Duration::from_secs(1), sent.recv())
        .await
        .expect("no transmission within one second")
        .expect("sender closed")
}

async fn expect_quiet(sent: &mut mpsc::UnboundedReceiver<Sent>) {
    assert!(
        timeout(Duration::from_millis(100), sent.recv())
            .await
            .is_err(),
        "unexpected transmission"
    );
}

#[tokio::test]
async fn push_reaches_every_connected_peer() {
    let mut h = harness(DeviceRole::Primary, FixedSource::empty());
    h.link
        .set_peers(vec![watch(), Peer::new("watch-2", "Spare watch")]);

    h.coordinator.push_reminder(snapshot(5));

    let first = expect_sent(&mut h.sent).await;
    let second = expect_sent(&mut h.sent).await;
    assert_eq!(first.path, paths::SCHEDULE_REMINDER);
    assert_eq!(second.path, paths::SCHEDULE_REMINDER);
    assert_ne!(first.peer, second.peer);
}

#[tokio::test]
async fn push_with_no_peer_is_skipped_not_queued() {
    let mut h = harness(DeviceRole::Primary, FixedSource::empty());

    h.coordinator.push_reminder(snapshot(1));
    expect_quiet(&mut h.sent).await;

    // a later push with a peer present carries only its own reminder
    h.link.set_peers(vec![watch()]);
    h.coordinator.push_reminder(snapshot(2));

    let sent = expect_sent(&mut h.sent).await;
    let json: serde_json::Value = serde_json::from_slice(&sent.payload).unwrap();
    assert_eq!(json["eventId"], 2);
    expect_quiet(&mut h.sent).await;
}

#[tokio::test]
async fn batch_goes_through_durable_layer_without_presence_gate() {
    let mut h = harness(DeviceRole::Primary, FixedSource::empty());

    h.coordinator.push_batch(vec![snapshot(1), snapshot(2)]);

    let sent = expect_sent(&mut h.sent).await;
    assert!(sent.durable);
    assert_eq!(sent.path, paths::CALENDAR_EVENTS);
    let json: serde_json::Value = serde_json::from_slice(&sent.payload).unwrap();
    assert_eq!(json["events"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn local_dismiss_is_relayed_with_role_path() {
    let mut h = harness(DeviceRole::Primary, FixedSource::empty());
    h.link.set_peers(vec![watch()]);

    assert!(h.coordinator.reminder_fired(firing(7, ReminderKind::Initial)));
    h.coordinator.dismissed_locally(7, ReminderKind::Initial);

    let sent = expect_sent(&mut h.sent).await;
    assert_eq!(sent.path, paths::DISMISS_REMINDER);
    assert_eq!(sent.payload, b"7");
    assert!(!h.coordinator.registry().has_pending());
}

#[tokio::test]
async fn companion_dismiss_reports_back_to_primary() {
    let mut h = harness(DeviceRole::Companion, FixedSource::empty());
    h.link.set_peers(vec![Peer::new("phone-1", "Phone")]);

    assert!(h.coordinator.reminder_fired(firing(9, ReminderKind::Initial)));
    h.coordinator.dismissed_locally(9, ReminderKind::Initial);

    let sent = expect_sent(&mut h.sent).await;
    assert_eq!(sent.path, paths::REMINDER_DISMISSED);
    assert_eq!(sent.payload, b"9");
}

#[tokio::test]
async fn companion_snooze_reports_minutes() {
    let mut h = harness(DeviceRole::Companion, FixedSource::empty());
    h.link.set_peers(vec![Peer::new("phone-1", "Phone")]);

    h.coordinator.reminder_fired(firing(4, ReminderKind::Initial));
    h.coordinator.snoozed_locally(4, ReminderKind::Initial, 15);

    let sent = expect_sent(&mut h.sent).await;
    assert_eq!(sent.path, paths::REMINDER_SNOOZED);
    assert_eq!(sent.payload, b"snooze:4:15");
}

#[tokio::test]
async fn inbound_dismiss_is_applied_but_never_echoed() {
    let mut h = harness(DeviceRole::Primary, FixedSource::empty());
    h.link.set_peers(vec![watch()]);
    let from = watch().id;

    h.coordinator.reminder_fired(firing(7, ReminderKind::Initial));
    let (path, payload) = encode(&SyncMessage::ReminderDismissed { event_id: 7 });
    h.coordinator.handle_message(&from, path, &payload).await;

    assert_eq!(h.scheduler.calls(), vec![SchedulerCall::Dismiss(7)]);
    assert!(!h.coordinator.registry().has_pending());
    expect_quiet(&mut h.sent).await;
}

#[tokio::test]
async fn retransmitted_dismiss_is_forwarded_once() {
    let mut h = harness(DeviceRole::Primary, FixedSource::empty());
    let from = watch().id;

    let (path, payload) = encode(&SyncMessage::ReminderDismissed { event_id: 3 });
    h.coordinator.handle_message(&from, path, &payload).await;
    h.coordinator.handle_message(&from, path, &payload).await;

    assert_eq!(h.scheduler.calls(), vec![SchedulerCall::Dismiss(3)]);
    expect_quiet(&mut h.sent).await;
}

#[tokio::test]
async fn fire_racing_a_peer_dismissal_never_surfaces() {
    let mut h = harness(DeviceRole::Primary, FixedSource::empty());
    let from = watch().id;

    let (path, payload) = encode(&SyncMessage::DismissNotification { event_id: 12 });
    h.coordinator.handle_message(&from, path, &payload).await;

    assert!(!h.coordinator.reminder_fired(firing(12, ReminderKind::Initial)));
    assert!(!h.coordinator.registry().has_pending());
    expect_quiet(&mut h.sent).await;
}

#[tokio::test]
async fn inbound_snooze_is_parsed_and_forwarded() {
    let h = harness(DeviceRole::Primary, FixedSource::empty());
    let from = watch().id;

    h.coordinator
        .handle_message(&from, paths::REMINDER_SNOOZED, b"snooze:8:15")
        .await;

    assert_eq!(h.scheduler.calls(), vec![SchedulerCall::Snooze(8, 15)]);
}

#[tokio::test]
async fn malformed_inbound_is_dropped_quietly() {
    let mut h = harness(DeviceRole::Primary, FixedSource::empty());
    let from = watch().id;

    h.coordinator
        .handle_message(&from, paths::REMINDER_SNOOZED, b"8:15")
        .await;
    h.coordinator
        .handle_message(&from, paths::DISMISS_REMINDER, b"not-a-number")
        .await;
    h.coordinator.handle_message(&from, "/unknown", b"").await;

    assert!(h.scheduler.calls().is_empty());
    expect_quiet(&mut h.sent).await;
}

#[tokio::test]
async fn stale_batch_is_discarded() {
    let h = harness(DeviceRole::Companion, FixedSource::empty());
    let from = Peer::new("phone-1", "Phone").id;

    let fresh = encode(&SyncMessage::CalendarEventsBatch {
        events: vec![snapshot(1)],
        snapshot_timestamp: 100,
    });
    let stale = encode(&SyncMessage::CalendarEventsBatch {
        events: vec![snapshot(2)],
        snapshot_timestamp: 90,
    });
    let newer = encode(&SyncMessage::CalendarEventsBatch {
        events: vec![snapshot(3)],
        snapshot_timestamp: 101,
    });

    h.coordinator.handle_message(&from, fresh.0, &fresh.1).await;
    h.coordinator.handle_message(&from, stale.0, &stale.1).await;
    h.coordinator.handle_message(&from, newer.0, &newer.1).await;

    assert_eq!(
        h.scheduler.calls(),
        vec![
            SchedulerCall::ReplaceAll(vec![snapshot(1)]),
            SchedulerCall::ReplaceAll(vec![snapshot(3)]),
        ]
    );
}

#[tokio::test]
async fn primary_answers_sync_request_with_full_batch() {
    let mut h = harness(
        DeviceRole::Primary,
        FixedSource::new(vec![snapshot(1), snapshot(2)]),
    );
    let from = watch().id;

    h.coordinator
        .handle_message(&from, paths::SYNC_ALL_REMINDERS, b"")
        .await;

    let sent = expect_sent(&mut h.sent).await;
    assert!(sent.durable);
    assert_eq!(sent.path, paths::CALENDAR_EVENTS);
}

#[tokio::test]
async fn companion_ignores_sync_request() {
    let mut h = harness(DeviceRole::Companion, FixedSource::empty());
    let from = Peer::new("phone-1", "Phone").id;

    h.coordinator
        .handle_message(&from, paths::SYNC_ALL_REMINDERS, b"")
        .await;

    expect_quiet(&mut h.sent).await;
}

#[tokio::test]
async fn primary_pushes_full_state_on_peer_connect() {
    let mut h = harness(DeviceRole::Primary, FixedSource::new(vec![snapshot(6)]));
    h.link.set_peers(vec![watch()]);

    h.coordinator.handle_peer_connected(&watch()).await;

    let sent = expect_sent(&mut h.sent).await;
    assert!(sent.durable);
    let json: serde_json::Value = serde_json::from_slice(&sent.payload).unwrap();
    assert_eq!(json["events"][0]["id"], 6);
}

#[tokio::test]
async fn companion_requests_full_sync_on_peer_connect() {
    let mut h = harness(DeviceRole::Companion, FixedSource::empty());
    let phone = Peer::new("phone-1", "Phone");
    h.link.set_peers(vec![phone.clone()]);

    h.coordinator.handle_peer_connected(&phone).await;

    let sent = expect_sent(&mut h.sent).await;
    assert_eq!(sent.path, paths::SYNC_ALL_REMINDERS);
    assert!(sent.payload.is_empty());
}

#[tokio::test]
async fn peer_disconnect_mutates_nothing() {
    let mut h = harness(DeviceRole::Primary, FixedSource::empty());
    h.coordinator.reminder_fired(firing(2, ReminderKind::Initial));

    h.coordinator.handle_peer_disconnected(&watch());

    assert!(h.coordinator.registry().has_pending());
    assert!(h.scheduler.calls().is_empty());
    expect_quiet(&mut h.sent).await;
}

#[tokio::test]
async fn inbound_cancel_clears_registry_and_scheduler() {
    let h = harness(DeviceRole::Companion, FixedSource::empty());
    let from = Peer::new("phone-1", "Phone").id;

    h.coordinator.reminder_fired(firing(5, ReminderKind::Initial));
    let (path, payload) = encode(&SyncMessage::CancelReminder { event_id: 5 });
    h.coordinator.handle_message(&from, path, &payload).await;

    assert_eq!(h.scheduler.calls(), vec![SchedulerCall::Cancel(5)]);
    assert!(!h.coordinator.registry().has_pending());
}
