// SPDX-FileCopyrightText: 2025-2026 The chime developers
//
// SPDX-License-Identifier: Apache-2.0

use std::{error::Error, path::PathBuf};

use chime_core::APP_NAME;
use clap::{ArgMatches, Command, ValueHint, arg, builder::styling, crate_version, value_parser};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use crate::cmd_decode::CmdDecode;
use crate::cmd_encode::CmdEncode;
use crate::cmd_simulate::CmdSimulate;
use crate::config::parse_config;

/// Run the chime command-line interface.
pub async fn run() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    match Cli::parse() {
        Ok(cli) => {
            if let Err(e) = cli.run().await {
                println!("{} {}", "Error:".red(), e);
            }
        }
        Err(e) => println!("{} {}", "Error:".red(), e),
    }
    Ok(())
}

/// Command-line interface
#[derive(Debug)]
pub struct Cli {
    /// Path to the configuration file
    pub config: Option<PathBuf>,

    /// The command to execute
    pub command: Commands,
}

/// The commands of the command-line interface.
#[derive(Debug)]
pub enum Commands {
    /// Decode a wire payload
    Decode(CmdDecode),

    /// Encode a sync message
    Encode(CmdEncode),

    /// Run a scripted two-device session
    Simulate(CmdSimulate),
}

impl Cli {
    /// Create the command-line interface
    pub fn command() -> Command {
        const STYLES: styling::Styles = styling::Styles::styled()
            .header(styling::AnsiColor::Green.on_default().bold())
            .usage(styling::AnsiColor::Green.on_default().bold())
            .literal(styling::AnsiColor::Blue.on_default().bold())
            .placeholder(styling::AnsiColor::Cyan.on_default());

        Command::new(APP_NAME)
            .about("Keep reminder alarms in step across paired devices.")
            .version(crate_version!())
            .styles(STYLES)
            .subcommand_required(true)
            .arg_required_else_help(true)
            .arg(
                arg!(-c --config [CONFIG] "Path to the configuration file")
                    .long_help(
                        "\
Path to the configuration file. Defaults to $XDG_CONFIG_HOME/chime/config.toml on Linux and MacOS, \
%LOCALAPPDATA%/chime/config.toml on Windows.",
                    )
                    .value_parser(value_parser!(PathBuf))
                    .value_hint(ValueHint::FilePath),
            )
            .subcommand(CmdDecode::command())
            .subcommand(CmdEncode::command())
            .subcommand(CmdSimulate::command())
    }

    /// Parse the command-line arguments
    pub fn parse() -> Result<Self, Box<dyn Error>> {
        let matches = Self::command().get_matches();
        Self::from(&matches)
    }

    fn from(matches: &ArgMatches) -> Result<Self, Box<dyn Error>> {
        let command = match matches.subcommand() {
            Some((CmdDecode::NAME, sub)) => Commands::Decode(CmdDecode::from(sub)),
            Some((CmdEncode::NAME, sub)) => Commands::Encode(CmdEncode::from(sub)?),
            Some((CmdSimulate::NAME, sub)) => Commands::Simulate(CmdSimulate::from(sub)),
            _ => return Err("No command specified".into()),
        };

        Ok(Self {
            config: matches.get_one::<PathBuf>("config").cloned(),
            command,
        })
    }

    /// Execute the selected command.
    pub async fn run(self) -> Result<(), Box<dyn Error>> {
        let config = parse_config(self.config).await?;
        match self.command {
            Commands::Decode(cmd) => cmd.run(),
            Commands::Encode(cmd) => cmd.run(),
            Commands::Simulate(cmd) => cmd.run(&config).await,
        }
    }
}
