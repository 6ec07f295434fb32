// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Command-line interface definitions.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;
use crate::transport::HttpClient;

/// Command-line arguments.
#[derive(Parser)]
#[command(name = "ember-upload")]
#[command(about = "Firmware upload tool for the ember bootloader recovery endpoint")]
pub struct Cli {
    /// Device address (e.g. 192.168.0.100 or 192.168.0.100:80)
    #[arg(short = 'H', long)]
    pub host: String,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Upload a firmware image to the download slot
    Upload {
        /// Firmware binary file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Ask the device to reboot out of recovery mode
    Reboot,
}

/// Execute the parsed CLI command.
pub fn run(cli: Cli) -> Result<()> {
    let client = HttpClient::new(&cli.host);

    match cli.command {
        Commands::Upload { file } => commands::upload(&client, &file),
        Commands::Reboot => commands::reboot(&client),
    }
}
