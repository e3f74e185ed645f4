// SPDX-FileCopyrightText: 2025-2026 The chime developers
//
// SPDX-License-Identifier: Apache-2.0

use std::error::Error;

use clap::{ArgMatches, Command, arg};

#[derive(Debug, Clone)]
pub struct CmdDecode {
    pub path: String,
    pub payload: String,
}

impl CmdDecode {
    pub const NAME: &str = "decode";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .about("Decode a wire payload and print the parsed message")
            .arg(arg!(<PATH> "Wire path, e.g. /reminder_snoozed"))
            .arg(arg!([PAYLOAD] "Payload as a literal string").default_value(""))
    }

    pub fn from(matches: &ArgMatches) -> Self {
        Self {
            path: matches
                .get_one::<String>("PATH")
                .cloned()
                .unwrap_or_default(),
            payload: matches
                .get_one::<String>("PAYLOAD")
                .cloned()
                .unwrap_or_default(),
        }
    }

    pub fn run(self) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "decoding payload...");
        let message = chime_sync::decode(&self.path, self.payload.as_bytes())?;
        println!("{message:#?}");
        Ok(())
    }
}
