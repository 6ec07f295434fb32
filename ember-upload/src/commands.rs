// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Command implementations for the recovery endpoint.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use sha2::{Digest, Sha256};

use ember_common::layout::FLASH_SWAP_SPACE_LENGTH;

use crate::transport::HttpClient;

/// Upload a firmware image. The device stages it into the download slot,
/// verifies the digest, and installs it on success.
pub fn upload(client: &HttpClient, file: &Path) -> Result<()> {
    let firmware = fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let size = firmware.len();

    if size == 0 {
        bail!("{} is empty", file.display());
    }
    if size > FLASH_SWAP_SPACE_LENGTH as usize {
        bail!(
            "{} is {} bytes; the download slot holds {}",
            file.display(),
            size,
            FLASH_SWAP_SPACE_LENGTH
        );
    }

    let digest_hex = hex::encode(Sha256::digest(&firmware));

    println!(
        "Firmware: {} ({} bytes, SHA-256: {}...)",
        file.display(),
        size,
        &digest_hex[..16]
    );
    println!();

    let pb = ProgressBar::new(size as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})",
            )?
            .progress_chars("#>-"),
    );

    let status = client.post_image("/upload", &digest_hex, &firmware, |written| {
        pb.set_position(written);
    })?;
    pb.finish_and_clear();

    match status {
        Some(200) => {
            println!("Upload accepted; device is installing and restarting.");
            Ok(())
        }
        Some(code) => bail!("Device answered HTTP {code}"),
        // The recovery server closes the connection on a failed upload
        // instead of sending an error response.
        None => bail!("Device dropped the connection (digest mismatch or malformed upload)"),
    }
}

/// Request an immediate hardware reset.
pub fn reboot(client: &HttpClient) -> Result<()> {
    // The device resets before the TCP teardown finishes, so a broken
    // connection is the expected outcome.
    let _ = client.get("/reboot");
    println!("Reboot requested.");
    Ok(())
}
