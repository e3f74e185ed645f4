// SPDX-FileCopyrightText: 2025-2026 The chime developers
//
// SPDX-License-Identifier: Apache-2.0

use std::error::Error;

/// The name of the chime application.
pub const APP_NAME: &str = "chime";

/// Configuration for the chime core.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    /// Minutes a snoozed reminder waits before re-firing.
    #[serde(default = "default_snooze_minutes")]
    pub snooze_minutes: u32,

    /// How many days ahead of now calendar events are included in a full
    /// sync batch pushed to paired devices.
    #[serde(default = "default_batch_window_days")]
    pub batch_window_days: u32,

    /// Display name announced to paired devices.
    #[serde(default)]
    pub device_name: Option<String>,
}

const fn default_snooze_minutes() -> u32 {
    10
}

const fn default_batch_window_days() -> u32 {
    7
}

impl Default for Config {
    fn default() -> Self {
        Self {
            snooze_minutes: default_snooze_minutes(),
            batch_window_days: default_batch_window_days(),
            device_name: None,
        }
    }
}

impl Config {
    /// Normalize the configuration.
    pub fn normalize(&mut self) -> Result<(), Box<dyn Error>> {
        if self.snooze_minutes == 0 {
            return Err("snooze_minutes must be at least 1".into());
        }

        if self.batch_window_days == 0 {
            return Err("batch_window_days must be at least 1".into());
        }

        if let Some(name) = &self.device_name {
            let trimmed = name.trim();
            if trimmed.is_empty() {
                self.device_name = None;
            } else if trimmed.len() != name.len() {
                self.device_name = Some(trimmed.to_string());
            }
        }

        Ok(())
    }
}
