// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Network configuration logic: MAC derivation, DHCP retry policy, static
//! fallback. The MAC driver and the DHCP wire exchange live in the
//! bootloader; only the decisions are here.

/// SPI init / DHCP / socket failure. In recovery the policy is to fall back
/// to a static address and keep listening.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NetworkError {
    Spi,
    NoLink,
    Socket,
    Timeout,
}

impl NetworkError {
    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkError::Spi => "SPI transfer failed",
            NetworkError::NoLink => "MAC not responding",
            NetworkError::Socket => "socket failure",
            NetworkError::Timeout => "timed out",
        }
    }
}

/// IPv4 configuration of the recovery interface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NetConfig {
    pub ip: [u8; 4],
    pub subnet: [u8; 4],
    pub gateway: [u8; 4],
}

/// Used when every DHCP attempt fails.
pub const STATIC_FALLBACK: NetConfig = NetConfig {
    ip: [192, 168, 0, 100],
    subnet: [255, 255, 255, 0],
    gateway: [192, 168, 0, 1],
};

/// Locally administered OUI for derived MAC addresses.
pub const MAC_OUI: [u8; 3] = [0x02, 0xEB, 0x42];

/// OUI plus the last three bytes of the board's flash unique ID.
pub fn mac_from_unique_id(id: &[u8; 8]) -> [u8; 6] {
    [MAC_OUI[0], MAC_OUI[1], MAC_OUI[2], id[5], id[6], id[7]]
}

pub const DHCP_ATTEMPTS: u32 = 4;
pub const DHCP_ATTEMPT_BUDGET_MS: u32 = 5_000;

/// One DHCP lease attempt, bounded by a wall-time budget.
pub trait DhcpClient {
    fn try_acquire(&mut self, budget_ms: u32) -> Result<NetConfig, NetworkError>;
}

/// DHCP with retries; static fallback when every attempt fails.
/// The second element is `true` when the config came from a lease.
pub fn acquire_config<C: DhcpClient>(client: &mut C) -> (NetConfig, bool) {
    for _ in 0..DHCP_ATTEMPTS {
        if let Ok(cfg) = client.try_acquire(DHCP_ATTEMPT_BUDGET_MS) {
            return (cfg, true);
        }
    }
    (STATIC_FALLBACK, false)
}
