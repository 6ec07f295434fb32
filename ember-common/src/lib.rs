// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Common types and core logic for the ember bootloader.
//!
//! This crate supports both `no_std` (embedded) and `std` (host) environments:
//! - Default: `no_std` mode for embedded targets
//! - `std` feature: host tests and tools (enables the `testing` mock device)
//! - `embedded` feature: the application-facing flash ABI (rp2040-hal)
//!
//! Everything that can run without hardware lives here: the metadata record,
//! the boot decision, the swap engine, the integrity verifier, HTTP request
//! recognition, and the recovery session driver, all generic over the
//! [`BlockDevice`] and [`RecoverySocket`](server::RecoverySocket) seams.

#![cfg_attr(not(feature = "std"), no_std)]

pub mod blockdev;
pub mod boot_fsm;
pub mod http;
pub mod layout;
pub mod metadata;
pub mod net;
pub mod server;
pub mod swap;
pub mod verify;

// Flash ABI for the running application (requires embedded feature)
#[cfg(feature = "embedded")]
pub mod flash;

#[cfg(feature = "std")]
pub mod testing;

// Re-export commonly used types
pub use blockdev::{BlockDevice, StorageError};
pub use boot_fsm::{decide_boot_action, BootAction, BootFlags, TriggerPolicy};
pub use layout::{
    FLASH_APP_START, FLASH_BASE, FLASH_DOWNLOAD_SLOT_START, FLASH_INFO_START, FLASH_PAGE_SIZE,
    FLASH_SECTOR_SIZE, FLASH_SWAP_SPACE_LENGTH, WRITE_ALIGN,
};
pub use metadata::InfoRecord;
pub use net::{NetConfig, NetworkError};

/// Blink an LED a specified number of times.
#[cfg(feature = "embedded")]
pub fn blink(
    led: &mut impl embedded_hal::digital::OutputPin,
    timer: &mut impl embedded_hal::delay::DelayNs,
    count: u32,
    period_ms: u32,
) {
    for _ in 0..count {
        led.set_high().ok();
        timer.delay_ms(period_ms);
        led.set_low().ok();
        timer.delay_ms(period_ms);
    }
}
