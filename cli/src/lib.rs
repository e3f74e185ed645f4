// SPDX-FileCopyrightText: 2025-2026 The chime developers
//
// SPDX-License-Identifier: Apache-2.0

//! Command-line interface for chime.

mod cli;
mod cmd_decode;
mod cmd_encode;
mod cmd_simulate;
mod config;

pub use crate::cli::{Cli, run};
