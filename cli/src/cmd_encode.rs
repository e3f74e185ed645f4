// SPDX-FileCopyrightText: 2025-2026 The chime developers
//
// SPDX-License-Identifier: Apache-2.0

use std::error::Error;

use clap::{ArgMatches, Command, arg, value_parser};

use chime_sync::{EventSnapshot, SyncMessage, encode};

#[derive(Debug, Clone)]
pub struct CmdEncode {
    pub message: SyncMessage,
}

impl CmdEncode {
    pub const NAME: &str = "encode";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .about("Encode a sync message and print its wire path and payload")
            .arg_required_else_help(true)
            .subcommand_required(true)
            .subcommand(
                Command::new("schedule")
                    .about("Push one reminder")
                    .arg(arg!(<EVENT_ID> "Event id").value_parser(value_parser!(i64)))
                    .arg(arg!(<TITLE> "Event title"))
                    .arg(
                        arg!(<START_TIME> "Event start, epoch milliseconds")
                            .value_parser(value_parser!(i64)),
                    )
                    .arg(
                        arg!(<REMINDER_TIME> "Reminder trigger, epoch milliseconds")
                            .value_parser(value_parser!(i64)),
                    ),
            )
            .subcommand(
                Command::new("cancel")
                    .about("Withdraw a reminder")
                    .arg(arg!(<EVENT_ID> "Event id").value_parser(value_parser!(i64))),
            )
            .subcommand(
                Command::new("dismiss")
                    .about("Take down the peer's notification")
                    .arg(arg!(<EVENT_ID> "Event id").value_parser(value_parser!(i64))),
            )
            .subcommand(
                Command::new("snooze")
                    .about("Report a snooze to the primary")
                    .arg(arg!(<EVENT_ID> "Event id").value_parser(value_parser!(i64)))
                    .arg(arg!(<MINUTES> "Snooze interval").value_parser(value_parser!(u32))),
            )
            .subcommand(Command::new("sync-all").about("Request a full snapshot"))
    }

    pub fn from(matches: &ArgMatches) -> Result<Self, Box<dyn Error>> {
        let event_id = |sub: &ArgMatches| sub.get_one::<i64>("EVENT_ID").copied().unwrap_or_default();

        let message = match matches.subcommand() {
            Some(("schedule", sub)) => SyncMessage::ScheduleReminder(EventSnapshot {
                id: event_id(sub),
                title: sub.get_one::<String>("TITLE").cloned().unwrap_or_default(),
                start_time: sub.get_one::<i64>("START_TIME").copied().unwrap_or_default(),
                reminder_time: sub
                    .get_one::<i64>("REMINDER_TIME")
                    .copied()
                    .unwrap_or_default(),
            }),
            Some(("cancel", sub)) => SyncMessage::CancelReminder {
                event_id: event_id(sub),
            },
            Some(("dismiss", sub)) => SyncMessage::DismissNotification {
                event_id: event_id(sub),
            },
            Some(("snooze", sub)) => SyncMessage::ReminderSnoozed {
                event_id: event_id(sub),
                minutes: sub.get_one::<u32>("MINUTES").copied().unwrap_or_default(),
            },
            Some(("sync-all", _)) => SyncMessage::SyncAllRequest,
            _ => return Err("No message specified".into()),
        };

        Ok(Self { message })
    }

    pub fn run(self) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "encoding message...");
        let (path, payload) = encode(&self.message);
        println!("{path}");
        if !payload.is_empty() {
            // every payload the protocol produces is valid UTF-8
            println!("{}", String::from_utf8_lossy(&payload));
        }
        Ok(())
    }
}
