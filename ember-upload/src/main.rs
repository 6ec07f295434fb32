// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Firmware upload tool for a device in bootloader recovery mode.
//!
//! Usage:
//!   ember-upload --host 192.168.0.100 upload firmware.bin
//!   ember-upload --host 192.168.0.100 reboot

mod cli;
mod commands;
mod transport;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let args = cli::Cli::parse();
    cli::run(args)
}
