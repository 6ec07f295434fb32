// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Recovery mode: serve the upload endpoint until a verified image arrives,
//! then swap-and-commit and hand off.
//!
//! One connection at a time. Each accept wait is bounded; on timeout the
//! socket is torn down and reopened, so a wedged half-open connection can
//! never pin the server. Everything else (page, upload, verification) is the
//! session core in `ember_common::server`.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;
use rp2040_hal as hal;

use ember_common::net::mac_from_unique_id;
use ember_common::server::{self, SessionOutcome};

use crate::flash::{self, RomFlash};
use crate::handoff;
use crate::peripherals::Peripherals;
use crate::w5500::{
    HttpSocket, W5500, HTTP_SOCKET, SOCK_CLOSE_WAIT, SOCK_ESTABLISHED,
};
use crate::{boot, net};

const HTTP_PORT: u16 = 80;
/// Bound on each accept wait before the listener is recycled.
const ACCEPT_WAIT_MS: u64 = 3_000;

pub fn run(p: &mut Peripherals) -> ! {
    defmt::println!("Recovery mode");

    let mac = mac_from_unique_id(&flash::read_unique_id());
    let mut w5500 = W5500::new(&mut p.eth_spi, &mut p.eth_cs);

    // No network, no recovery: retry bring-up until the MAC answers. A reset
    // with the recovery pins released leaves this loop.
    while let Err(e) = net::bring_up(&mut w5500, &mut p.timer, &mac) {
        defmt::println!("network bring-up: {=str}", e.as_str());
        ember_common::blink(&mut p.led_pin, &mut p.timer, 2, 100);
        p.timer.delay_ms(1_000u32);
    }

    let mut dev = RomFlash;

    loop {
        if let Err(e) = w5500.tcp_listen(HTTP_SOCKET, HTTP_PORT) {
            defmt::println!("listen: {=str}", e.as_str());
            p.timer.delay_ms(500u32);
            continue;
        }

        if !wait_for_peer(&mut w5500, &mut p.timer) {
            continue; // bounded accept wait elapsed; recycle the listener
        }

        let outcome = {
            let mut sock = HttpSocket {
                w5500: &mut w5500,
            };
            server::serve_connection(&mut sock, &mut dev)
        };

        match outcome {
            Ok(SessionOutcome::UploadVerified { image_len }) => {
                defmt::println!("upload verified: {} bytes", image_len);
                w5500.disconnect(HTTP_SOCKET).ok();

                match boot::swap_and_commit(&mut dev) {
                    Ok(()) => {
                        defmt::println!("image installed, starting application");
                        p.timer.delay_ms(10u32);
                        unsafe { handoff::start_application() }
                    }
                    Err(e) => {
                        // Do not jump into a half-swapped image; stay in
                        // recovery and let the operator upload again.
                        defmt::println!("install: {=str}", e.as_str());
                    }
                }
            }
            Ok(SessionOutcome::RebootRequested) => {
                defmt::println!("reboot requested");
                cortex_m::peripheral::SCB::sys_reset();
            }
            Ok(SessionOutcome::PageServed) => {
                w5500.disconnect(HTTP_SOCKET).ok();
            }
            Ok(SessionOutcome::IntegrityFailure) => {
                defmt::println!("upload rejected: digest mismatch");
                w5500.disconnect(HTTP_SOCKET).ok();
            }
            Ok(SessionOutcome::Protocol(e)) => {
                defmt::println!("bad request: {=str}", e.as_str());
                w5500.close(HTTP_SOCKET).ok();
            }
            Err(_) => {
                defmt::println!("session aborted");
                w5500.close(HTTP_SOCKET).ok();
            }
        }
    }
}

/// Poll for an established peer, bounded by [`ACCEPT_WAIT_MS`].
fn wait_for_peer<SPI, CS>(w5500: &mut W5500<SPI, CS>, timer: &mut hal::Timer) -> bool
where
    SPI: SpiBus<u8>,
    CS: OutputPin,
{
    let deadline = timer.get_counter().ticks() + ACCEPT_WAIT_MS * 1_000;
    while timer.get_counter().ticks() < deadline {
        match w5500.status(HTTP_SOCKET) {
            Ok(SOCK_ESTABLISHED) | Ok(SOCK_CLOSE_WAIT) => return true,
            Ok(_) => timer.delay_ms(1u32),
            Err(_) => return false,
        }
    }
    false
}
