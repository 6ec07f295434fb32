// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Network bring-up: MAC init, DHCP with retries, static fallback.

use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;
use rp2040_hal as hal;

use ember_common::net::{self, NetConfig, NetworkError};

use crate::dhcp::DhcpLease;
use crate::w5500::W5500;

/// Initialize the MAC and bind an address. DHCP failure is not an error
/// here; the static fallback keeps recovery reachable on a quiet network.
pub fn bring_up<SPI, CS>(
    w5500: &mut W5500<SPI, CS>,
    timer: &mut hal::Timer,
    mac: &[u8; 6],
) -> Result<NetConfig, NetworkError>
where
    SPI: SpiBus<u8>,
    CS: OutputPin,
{
    w5500.init(mac, timer)?;

    let (cfg, leased) = {
        let mut client = DhcpLease {
            w5500: &mut *w5500,
            timer: &mut *timer,
            mac: *mac,
        };
        net::acquire_config(&mut client)
    };

    w5500.set_net_config(&cfg)?;
    let ip = w5500.ip_addr()?;
    defmt::println!(
        "network up: {}.{}.{}.{} ({=str})",
        ip[0],
        ip[1],
        ip[2],
        ip[3],
        if leased { "dhcp" } else { "static fallback" }
    );
    Ok(cfg)
}
