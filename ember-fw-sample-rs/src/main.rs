// Copyright (c) 2026 ADNT Sarl <info@adnt.io>
// SPDX-License-Identifier: MIT

//! Sample application for the ember bootloader.
//!
//! Exposes the application half of the update contract on a USB CDC console:
//! `status` dumps the persisted flags, `commit` confirms the running image,
//! and `update` runs a complete staged update by cloning the running image
//! into the download slot and rebooting into the bootloader's swap-and-arm
//! path.

#![no_std]
#![no_main]

mod board;
mod console;

use core::fmt::Write;

use cortex_m_rt::entry;
use defmt_rtt as _;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use panic_probe as _;
use rp2040_hal as hal;
use rp2040_hal::usb::UsbBus;
use sha2::{Digest, Sha256};
use usb_device::prelude::*;
use usbd_serial::SerialPort;

use ember_common::flash;
use ember_common::layout::{FLASH_APP_START, FLASH_SWAP_SPACE_LENGTH, WRITE_ALIGN};

use crate::console::{Command, Input, LineEditor, SerialOut};

defmt::timestamp!("{=u64:us}", { 0 });

unsafe extern "C" {
    static __sidata: u32;
    static __sdata: u32;
    static __edata: u32;
}

/// Flash footprint of the running image: text/rodata plus the load image of
/// `.data`, which is the last thing the linker places in flash.
fn firmware_image_len() -> u32 {
    let sidata = unsafe { &__sidata as *const u32 as u32 };
    let data_len = unsafe { (&__edata as *const u32 as u32) - (&__sdata as *const u32 as u32) };
    (sidata + data_len) - FLASH_APP_START
}

#[entry]
fn main() -> ! {
    defmt::println!("Application up");

    let mut b = board::init();
    ember_common::blink(&mut b.led, &mut b.timer, 5, 100);

    if flash::is_after_firmware_update() {
        defmt::println!("First boot of a new image; waiting for commit");
    }
    if flash::is_after_rollback() {
        defmt::println!("Running the previous image after a rollback");
    }

    let mut serial = SerialPort::new(b.usb_bus);
    let mut usb_dev = UsbDeviceBuilder::new(b.usb_bus, UsbVidPid(0x2E8A, 0x000B))
        .strings(&[StringDescriptors::default()
            .manufacturer("ADNT")
            .product("Ember Firmware")
            .serial_number("FW001")])
        .unwrap()
        .device_class(usbd_serial::USB_CLASS_CDC)
        .build();

    defmt::println!("USB CDC console ready; type 'help'");

    let mut editor = LineEditor::new();
    let mut rx = [0u8; 32];

    loop {
        usb_dev.poll(&mut [&mut serial]);

        let n = serial.read(&mut rx).unwrap_or(0);
        for &byte in &rx[..n] {
            match editor.feed(byte) {
                Input::None => {}
                Input::Echo(c) => {
                    let _ = serial.write(&[c]);
                }
                Input::Rubout => {
                    let _ = serial.write(b"\x08 \x08");
                }
                Input::Line => {
                    let _ = serial.write(b"\r\n");
                    dispatch(editor.line(), &mut serial, &mut usb_dev, &mut b.timer);
                    editor.clear();
                    let _ = serial.write(b"> ");
                }
            }
        }

        heartbeat(&mut b);
    }
}

/// Slow LED blink driven by the timer phase, so the console loop never has
/// to count iterations.
fn heartbeat(b: &mut board::Board) {
    let on = (b.timer.get_counter().ticks() / 500_000) & 1 == 0;
    if on {
        b.led.set_high().ok();
    } else {
        b.led.set_low().ok();
    }
}

fn dispatch(
    line: &str,
    serial: &mut SerialPort<'static, UsbBus>,
    usb_dev: &mut UsbDevice<'static, UsbBus>,
    timer: &mut hal::Timer,
) {
    let cmd = match Command::parse(line) {
        Some(cmd) => cmd,
        None => {
            if !line.trim().is_empty() {
                reply(serial, "unknown command; try 'help'\n");
            }
            return;
        }
    };

    match cmd {
        Command::Help => reply(
            serial,
            "commands:\n\
             \x20 status  show update flags\n\
             \x20 commit  confirm this image (disarm rollback)\n\
             \x20 update  stage a copy of this image and reboot to install\n\
             \x20 reboot  restart without installing\n",
        ),
        Command::Status => print_status(serial),
        Command::Commit => {
            flash::mark_should_not_rollback();
            flash::mark_has_no_new_firmware();
            reply(serial, "boot confirmed; rollback disarmed\n");
        }
        Command::Update => run_update(serial, usb_dev, timer),
        Command::Reboot => {
            reply(serial, "rebooting...\n");
            drain_tx(usb_dev, serial, timer);
            flash::reboot();
        }
    }
}

fn reply(serial: &mut SerialPort<'static, UsbBus>, text: &str) {
    let mut out = SerialOut { serial };
    let _ = out.write_str(text);
}

fn print_status(serial: &mut SerialPort<'static, UsbBus>) {
    let rec = flash::read_info();
    let mut out = SerialOut { serial };
    let _ = writeln!(out, "after update:   {}", rec.has_new_firmware());
    let _ = writeln!(out, "after rollback: {}", rec.after_rollback());
    let _ = writeln!(out, "rollback armed: {}", rec.should_rollback());
    let _ = writeln!(out, "slot valid:     {}", rec.download_slot_valid());
    let _ = writeln!(out, "swap size:      {}", rec.swap_size());
}

/// The full staged-update flow with a payload that is guaranteed to boot:
/// clone the running image, digest it, mark the slot valid, reboot into the
/// bootloader.
fn run_update(
    serial: &mut SerialPort<'static, UsbBus>,
    usb_dev: &mut UsbDevice<'static, UsbBus>,
    timer: &mut hal::Timer,
) {
    reply(serial, "erasing download slot (takes a while)...\n");

    let Some(image_len) = stage_self_clone(serial) else {
        reply(serial, "staging write failed\n");
        return;
    };

    {
        let mut out = SerialOut { serial };
        let _ = writeln!(out, "staged {} bytes; switching to bootloader", image_len);
    }
    drain_tx(usb_dev, serial, timer);

    if !flash::perform_update() {
        reply(serial, "download slot not valid\n");
    }
}

/// Copy the running image into the download slot, hashing as it goes.
/// Returns the staged length, or None when a flash write is refused.
fn stage_self_clone(serial: &mut SerialPort<'static, UsbBus>) -> Option<u32> {
    let image_len = firmware_image_len()
        .div_ceil(WRITE_ALIGN as u32)
        .saturating_mul(WRITE_ALIGN as u32)
        .min(FLASH_SWAP_SPACE_LENGTH);

    flash::initialize_download_slot();

    let mut hasher = Sha256::new();
    let mut chunk = [0u8; WRITE_ALIGN];
    let mut offset = 0u32;

    while offset < image_len {
        let src = unsafe {
            core::slice::from_raw_parts((FLASH_APP_START + offset) as *const u8, WRITE_ALIGN)
        };
        chunk.copy_from_slice(src);
        hasher.update(&chunk);

        if !flash::write_to_flash_aligned(&chunk, offset) {
            return None;
        }
        offset += WRITE_ALIGN as u32;

        // one progress dot per 64 KiB staged
        if offset % (64 * 1024) == 0 {
            let _ = serial.write(b".");
        }
    }
    let _ = serial.write(b"\r\n");

    let digest: [u8; 32] = hasher.finalize().into();
    flash::mark_download_slot_valid(image_len, &digest);
    Some(image_len)
}

/// Push queued CDC bytes to the host before a reset throws them away.
fn drain_tx(
    usb_dev: &mut UsbDevice<'static, UsbBus>,
    serial: &mut SerialPort<'static, UsbBus>,
    timer: &mut hal::Timer,
) {
    for _ in 0..50 {
        usb_dev.poll(&mut [&mut *serial]);
        timer.delay_ms(2u32);
    }
}
