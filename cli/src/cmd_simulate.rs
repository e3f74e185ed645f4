// SPDX-FileCopyrightText: 2025-2026 The chime developers
//
// SPDX-License-Identifier: Apache-2.0

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use clap::{ArgMatches, Command};
use colored::Colorize;

use chime_core::{AlarmRegistry, Config as CoreConfig, EventId, PendingAlarm, ReminderKind};
use chime_sync::{
    CalendarSource, DeviceRole, EventSnapshot, LoopbackEndpoint, LoopbackLink, Peer, PeerLink,
    ReminderScheduler, SchedulerError, SyncCoordinator, drive, pair,
};

#[derive(Debug, Default, Clone, Copy)]
pub struct CmdSimulate;

impl CmdSimulate {
    pub const NAME: &str = "simulate";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .about("Run a scripted two-device session over an in-process link")
    }

    pub fn from(_matches: &ArgMatches) -> Self {
        Self
    }

    /// Walk one reminder through fire, snooze on the watch, re-fire and
    /// dismiss on the watch, printing what each device observes.
    pub async fn run(self, config: &CoreConfig) -> Result<(), Box<dyn Error>> {
        let now = Utc::now().timestamp_millis();
        let window_ms = i64::from(config.batch_window_days) * 86_400_000;
        let calendar: Vec<EventSnapshot> = demo_events(now)
            .into_iter()
            .filter(|e| e.start_time <= now + window_ms)
            .collect();

        let watch_name = config.device_name.clone().unwrap_or_else(|| "Watch".into());
        let (phone_end, watch_end) =
            pair(Peer::new("phone-1", "Phone"), Peer::new("watch-1", watch_name));

        let phone = Device::new("phone", DeviceRole::Primary, phone_end, calendar.clone());
        let watch = Device::new("watch", DeviceRole::Companion, watch_end, Vec::new());

        banner("pairing devices");
        watch.link.set_connected(true);
        step().await;

        banner("reminder fires on both devices");
        phone
            .coordinator
            .reminder_fired(alarm(&calendar[0], ReminderKind::Initial, now));
        phone.coordinator.push_reminder(calendar[0].clone());
        watch
            .coordinator
            .reminder_fired(alarm(&calendar[0], ReminderKind::Initial, now));
        step().await;

        banner("user snoozes on the watch");
        watch
            .coordinator
            .snoozed_locally(calendar[0].id, ReminderKind::Initial, config.snooze_minutes);
        step().await;

        banner("snoozed re-fire on both devices");
        let refire_at = now + i64::from(config.snooze_minutes) * 60_000;
        phone
            .coordinator
            .reminder_fired(alarm(&calendar[0], ReminderKind::Snoozed, refire_at));
        watch
            .coordinator
            .reminder_fired(alarm(&calendar[0], ReminderKind::Snoozed, refire_at));
        step().await;

        banner("user dismisses on the watch");
        watch
            .coordinator
            .dismissed_locally(calendar[0].id, ReminderKind::Snoozed);
        step().await;

        banner("final state");
        for device in [&phone, &watch] {
            println!(
                "  [{}] {} alarm(s) still pending",
                device.label,
                device.coordinator.registry().snapshot().len()
            );
        }
        Ok(())
    }
}

fn banner(text: &str) {
    println!("{}", text.bold());
}

async fn step() {
    // let the detached pushes and the link pumps settle
    tokio::time::sleep(Duration::from_millis(100)).await;
}

fn demo_events(now: i64) -> Vec<EventSnapshot> {
    vec![
        EventSnapshot {
            id: 1,
            title: "Standup".into(),
            start_time: now + 600_000,
            reminder_time: now + 300_000,
        },
        EventSnapshot {
            id: 2,
            title: "Dentist".into(),
            start_time: now + 3_600_000,
            reminder_time: now + 3_000_000,
        },
    ]
}

fn alarm(event: &EventSnapshot, kind: ReminderKind, triggered_at: i64) -> PendingAlarm {
    PendingAlarm {
        event_id: event.id,
        event_title: event.title.clone(),
        event_start_time: event.start_time,
        kind,
        triggered_at,
    }
}

struct Device {
    label: &'static str,
    coordinator: SyncCoordinator,
    link: Arc<LoopbackLink>,
}

impl Device {
    fn new(
        label: &'static str,
        role: DeviceRole,
        endpoint: LoopbackEndpoint,
        calendar: Vec<EventSnapshot>,
    ) -> Self {
        let LoopbackEndpoint { link, events } = endpoint;
        let coordinator = SyncCoordinator::new(
            role,
            Arc::clone(&link) as Arc<dyn PeerLink>,
            Arc::new(EchoScheduler { label }),
            Arc::new(DemoCalendar { events: calendar }),
            Arc::new(AlarmRegistry::new()),
        );
        let _pump = drive(events, coordinator.clone());

        coordinator
            .registry()
            .register_observer(Box::new(move |snapshot: &[PendingAlarm]| {
                let titles: Vec<String> = snapshot
                    .iter()
                    .map(|a| format!("{} ({})", a.event_title, a.kind))
                    .collect();
                println!("  [{label}] pending: [{}]", titles.join(", "));
            }));

        Self {
            label,
            coordinator,
            link,
        }
    }
}

/// Scheduler that narrates what the platform would do.
struct EchoScheduler {
    label: &'static str,
}

#[async_trait]
impl ReminderScheduler for EchoScheduler {
    async fn schedule(&self, event: EventSnapshot) -> Result<(), SchedulerError> {
        println!(
            "  [{}] scheduler: schedule reminder for {:?} (event {})",
            self.label, event.title, event.id
        );
        Ok(())
    }

    async fn cancel(&self, event_id: EventId) -> Result<(), SchedulerError> {
        println!("  [{}] scheduler: cancel event {event_id}", self.label);
        Ok(())
    }

    async fn dismiss(&self, event_id: EventId) -> Result<(), SchedulerError> {
        println!("  [{}] scheduler: dismiss event {event_id}", self.label);
        Ok(())
    }

    async fn snooze(&self, event_id: EventId, minutes: u32) -> Result<(), SchedulerError> {
        println!(
            "  [{}] scheduler: snooze event {event_id} for {minutes} minutes",
            self.label
        );
        Ok(())
    }

    async fn replace_all(&self, events: Vec<EventSnapshot>) -> Result<(), SchedulerError> {
        println!(
            "  [{}] scheduler: replace all with {} event(s)",
            self.label,
            events.len()
        );
        Ok(())
    }
}

struct DemoCalendar {
    events: Vec<EventSnapshot>,
}

#[async_trait]
impl CalendarSource for DemoCalendar {
    async fn upcoming_reminders(&self) -> Result<Vec<EventSnapshot>, SchedulerError> {
        Ok(self.events.clone())
    }
}
