// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Minimal DHCP client over a W5500 UDP socket.
//!
//! One DISCOVER / OFFER / REQUEST / ACK exchange per attempt, no lease
//! bookkeeping: the bootloader only lives long enough to serve one recovery
//! session, so renewal is pointless. Retries and the static fallback are
//! policy in `ember_common::net`.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;
use rp2040_hal as hal;

use ember_common::net::{DhcpClient, NetConfig, NetworkError};

use crate::w5500::{W5500, DHCP_SOCKET};

const CLIENT_PORT: u16 = 68;
const SERVER_PORT: u16 = 67;
const BROADCAST: [u8; 4] = [255, 255, 255, 255];

const BOOTP_REQUEST: u8 = 1;
const BOOTP_REPLY: u8 = 2;
const MAGIC_COOKIE: [u8; 4] = [0x63, 0x82, 0x53, 0x63];

const MSG_DISCOVER: u8 = 1;
const MSG_OFFER: u8 = 2;
const MSG_REQUEST: u8 = 3;
const MSG_ACK: u8 = 5;

const OPT_SUBNET: u8 = 1;
const OPT_ROUTER: u8 = 3;
const OPT_REQUESTED_IP: u8 = 50;
const OPT_MSG_TYPE: u8 = 53;
const OPT_SERVER_ID: u8 = 54;
const OPT_PARAM_LIST: u8 = 55;
const OPT_END: u8 = 255;

const PACKET_BUF: usize = 600;

pub struct DhcpLease<'a, SPI, CS> {
    pub w5500: &'a mut W5500<SPI, CS>,
    pub timer: &'a mut hal::Timer,
    pub mac: [u8; 6],
}

impl<SPI, CS> DhcpLease<'_, SPI, CS>
where
    SPI: SpiBus<u8>,
    CS: OutputPin,
{
    fn xid(&self) -> u32 {
        u32::from_be_bytes([self.mac[2], self.mac[3], self.mac[4], self.mac[5]])
    }

    fn run_exchange(&mut self, budget_ms: u32) -> Result<NetConfig, NetworkError> {
        let xid = self.xid();
        let deadline = self.timer.get_counter().ticks() + u64::from(budget_ms) * 1_000;

        let mut packet = [0u8; PACKET_BUF];
        let len = build_request(&mut packet, &self.mac, xid, MSG_DISCOVER, None, None);
        self.w5500
            .udp_send_to(DHCP_SOCKET, BROADCAST, SERVER_PORT, &packet[..len])?;

        let mut offer: Option<Reply> = None;

        while self.timer.get_counter().ticks() < deadline {
            let Some((_ip, port, n)) = self.w5500.udp_recv(DHCP_SOCKET, &mut packet)? else {
                self.timer.delay_us(1_000);
                continue;
            };
            if port != SERVER_PORT {
                continue;
            }
            let Some(reply) = parse_reply(&packet[..n], xid) else {
                continue;
            };

            match reply.msg_type {
                MSG_OFFER if offer.is_none() => {
                    let mut req = [0u8; PACKET_BUF];
                    let len = build_request(
                        &mut req,
                        &self.mac,
                        xid,
                        MSG_REQUEST,
                        Some(reply.your_ip),
                        reply.server_id,
                    );
                    self.w5500
                        .udp_send_to(DHCP_SOCKET, BROADCAST, SERVER_PORT, &req[..len])?;
                    offer = Some(reply);
                }
                MSG_ACK if offer.is_some() => {
                    return Ok(NetConfig {
                        ip: reply.your_ip,
                        subnet: reply.subnet.unwrap_or([255, 255, 255, 0]),
                        gateway: reply
                            .router
                            .or(reply.server_id)
                            .unwrap_or([0, 0, 0, 0]),
                    });
                }
                _ => {}
            }
        }

        Err(NetworkError::Timeout)
    }
}

impl<SPI, CS> DhcpClient for DhcpLease<'_, SPI, CS>
where
    SPI: SpiBus<u8>,
    CS: OutputPin,
{
    fn try_acquire(&mut self, budget_ms: u32) -> Result<NetConfig, NetworkError> {
        self.w5500.udp_open(DHCP_SOCKET, CLIENT_PORT)?;
        let res = self.run_exchange(budget_ms);
        self.w5500.close(DHCP_SOCKET)?;
        res
    }
}

struct Reply {
    msg_type: u8,
    your_ip: [u8; 4],
    subnet: Option<[u8; 4]>,
    router: Option<[u8; 4]>,
    server_id: Option<[u8; 4]>,
}

/// BOOTP header (236 bytes) + magic cookie + options.
fn build_request(
    buf: &mut [u8; PACKET_BUF],
    mac: &[u8; 6],
    xid: u32,
    msg_type: u8,
    requested_ip: Option<[u8; 4]>,
    server_id: Option<[u8; 4]>,
) -> usize {
    buf.fill(0);
    buf[0] = BOOTP_REQUEST;
    buf[1] = 1; // htype: ethernet
    buf[2] = 6; // hlen
    buf[4..8].copy_from_slice(&xid.to_be_bytes());
    buf[10] = 0x80; // flags: broadcast reply
    buf[28..34].copy_from_slice(mac);
    buf[236..240].copy_from_slice(&MAGIC_COOKIE);

    let mut i = 240;
    buf[i] = OPT_MSG_TYPE;
    buf[i + 1] = 1;
    buf[i + 2] = msg_type;
    i += 3;

    if let Some(ip) = requested_ip {
        buf[i] = OPT_REQUESTED_IP;
        buf[i + 1] = 4;
        buf[i + 2..i + 6].copy_from_slice(&ip);
        i += 6;
    }
    if let Some(ip) = server_id {
        buf[i] = OPT_SERVER_ID;
        buf[i + 1] = 4;
        buf[i + 2..i + 6].copy_from_slice(&ip);
        i += 6;
    }

    buf[i] = OPT_PARAM_LIST;
    buf[i + 1] = 2;
    buf[i + 2] = OPT_SUBNET;
    buf[i + 3] = OPT_ROUTER;
    i += 4;

    buf[i] = OPT_END;
    i + 1
}

fn parse_reply(packet: &[u8], xid: u32) -> Option<Reply> {
    if packet.len() < 240 || packet[0] != BOOTP_REPLY {
        return None;
    }
    if packet[4..8] != xid.to_be_bytes() || packet[236..240] != MAGIC_COOKIE {
        return None;
    }

    let mut reply = Reply {
        msg_type: 0,
        your_ip: [packet[16], packet[17], packet[18], packet[19]],
        subnet: None,
        router: None,
        server_id: None,
    };

    let mut i = 240;
    while i < packet.len() {
        let code = packet[i];
        if code == 0 {
            i += 1;
            continue;
        }
        if code == OPT_END {
            break;
        }
        let len = *packet.get(i + 1)? as usize;
        let value = packet.get(i + 2..i + 2 + len)?;
        match (code, len) {
            (OPT_MSG_TYPE, 1) => reply.msg_type = value[0],
            (OPT_SUBNET, 4) => reply.subnet = Some([value[0], value[1], value[2], value[3]]),
            (OPT_ROUTER, 4) => reply.router = Some([value[0], value[1], value[2], value[3]]),
            (OPT_SERVER_ID, 4) => reply.server_id = Some([value[0], value[1], value[2], value[3]]),
            _ => {}
        }
        i += 2 + len;
    }

    (reply.msg_type != 0).then_some(reply)
}
