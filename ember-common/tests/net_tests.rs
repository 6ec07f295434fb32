// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Unit tests for network configuration policy.

use ember_common::net::{
    acquire_config, mac_from_unique_id, DhcpClient, NetConfig, NetworkError, DHCP_ATTEMPTS,
    MAC_OUI, STATIC_FALLBACK,
};

struct FlakyDhcp {
    failures_before_success: u32,
    attempts: u32,
    lease: NetConfig,
}

impl DhcpClient for FlakyDhcp {
    fn try_acquire(&mut self, _budget_ms: u32) -> Result<NetConfig, NetworkError> {
        self.attempts += 1;
        if self.attempts > self.failures_before_success {
            Ok(self.lease)
        } else {
            Err(NetworkError::Timeout)
        }
    }
}

const LEASE: NetConfig = NetConfig {
    ip: [10, 0, 0, 42],
    subnet: [255, 255, 255, 0],
    gateway: [10, 0, 0, 1],
};

// =============================================================================
// MAC derivation
// =============================================================================

#[test]
fn test_mac_uses_oui_and_id_tail() {
    let id = [0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88];
    let mac = mac_from_unique_id(&id);

    assert_eq!(&mac[..3], &MAC_OUI);
    assert_eq!(&mac[3..], &[0x66, 0x77, 0x88]);
}

#[test]
fn test_mac_oui_is_locally_administered_unicast() {
    // Bit 1 of the first octet set (locally administered), bit 0 clear
    // (unicast); anything else is not a usable station address.
    assert_eq!(MAC_OUI[0] & 0x03, 0x02);
}

#[test]
fn test_distinct_boards_get_distinct_macs() {
    let a = mac_from_unique_id(&[0, 0, 0, 0, 0, 1, 2, 3]);
    let b = mac_from_unique_id(&[0, 0, 0, 0, 0, 1, 2, 4]);
    assert_ne!(a, b);
}

// =============================================================================
// DHCP retry and fallback policy
// =============================================================================

#[test]
fn test_first_attempt_succeeds() {
    let mut client = FlakyDhcp {
        failures_before_success: 0,
        attempts: 0,
        lease: LEASE,
    };
    let (cfg, leased) = acquire_config(&mut client);
    assert!(leased);
    assert_eq!(cfg, LEASE);
    assert_eq!(client.attempts, 1);
}

#[test]
fn test_retry_until_lease() {
    let mut client = FlakyDhcp {
        failures_before_success: DHCP_ATTEMPTS - 1,
        attempts: 0,
        lease: LEASE,
    };
    let (cfg, leased) = acquire_config(&mut client);
    assert!(leased);
    assert_eq!(cfg, LEASE);
    assert_eq!(client.attempts, DHCP_ATTEMPTS);
}

#[test]
fn test_total_failure_falls_back_to_static() {
    let mut client = FlakyDhcp {
        failures_before_success: u32::MAX,
        attempts: 0,
        lease: LEASE,
    };
    let (cfg, leased) = acquire_config(&mut client);
    assert!(!leased);
    assert_eq!(cfg, STATIC_FALLBACK);
    assert_eq!(client.attempts, DHCP_ATTEMPTS, "attempts are bounded");
}

#[test]
fn test_static_fallback_address() {
    assert_eq!(STATIC_FALLBACK.ip, [192, 168, 0, 100]);
    assert_eq!(STATIC_FALLBACK.subnet, [255, 255, 255, 0]);
}
