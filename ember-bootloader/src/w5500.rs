// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Register-level driver for the WIZnet W5500 Ethernet MAC on SPI.
//!
//! The W5500 terminates TCP and UDP in hardware, so the bootloader never
//! carries a TCP/IP stack: the recovery server talks to socket registers and
//! the two on-chip 2 KiB buffers per socket. Variable-data frames: 16-bit
//! address, control byte (block select | read/write), payload.

use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;

use ember_common::net::{NetConfig, NetworkError};
use ember_common::server::RecoverySocket;

/// Socket assignments. DHCP keeps its own socket so a lease renewal can
/// never collide with an upload in progress.
pub const HTTP_SOCKET: u8 = 0;
pub const DHCP_SOCKET: u8 = 7;

// Common register block
const COMMON: u8 = 0x00;
const MR: u16 = 0x0000;
const GAR: u16 = 0x0001;
const SUBR: u16 = 0x0005;
const SHAR: u16 = 0x0009;
const SIPR: u16 = 0x000F;
const VERSIONR: u16 = 0x0039;

const MR_RST: u8 = 0x80;
const CHIP_VERSION: u8 = 0x04;

// Socket register block offsets
const SN_MR: u16 = 0x0000;
const SN_CR: u16 = 0x0001;
const SN_IR: u16 = 0x0002;
const SN_SR: u16 = 0x0003;
const SN_PORT: u16 = 0x0004;
const SN_DIPR: u16 = 0x000C;
const SN_DPORT: u16 = 0x0010;
const SN_TX_FSR: u16 = 0x0020;
const SN_TX_WR: u16 = 0x0024;
const SN_RX_RSR: u16 = 0x0026;
const SN_RX_RD: u16 = 0x0028;

const MODE_TCP: u8 = 0x01;
const MODE_UDP: u8 = 0x02;

const CMD_OPEN: u8 = 0x01;
const CMD_LISTEN: u8 = 0x02;
const CMD_DISCON: u8 = 0x08;
const CMD_CLOSE: u8 = 0x10;
const CMD_SEND: u8 = 0x20;
const CMD_RECV: u8 = 0x40;

const IR_SEND_OK: u8 = 0x10;
const IR_TIMEOUT: u8 = 0x08;

pub const SOCK_CLOSED: u8 = 0x00;
pub const SOCK_INIT: u8 = 0x13;
pub const SOCK_LISTEN: u8 = 0x14;
pub const SOCK_ESTABLISHED: u8 = 0x17;
pub const SOCK_CLOSE_WAIT: u8 = 0x1C;
pub const SOCK_UDP: u8 = 0x22;

/// Per-socket buffer size (power-on default).
const SOCKET_BUF_SIZE: usize = 2048;

/// Spin bound for register-state waits. Generous: a SEND of a full buffer
/// completes in well under a millisecond of SPI polling.
const SPIN_LIMIT: u32 = 200_000;

fn sock_reg(s: u8) -> u8 {
    s * 4 + 1
}

fn sock_tx(s: u8) -> u8 {
    s * 4 + 2
}

fn sock_rx(s: u8) -> u8 {
    s * 4 + 3
}

pub struct W5500<SPI, CS> {
    spi: SPI,
    cs: CS,
}

impl<SPI, CS> W5500<SPI, CS>
where
    SPI: SpiBus<u8>,
    CS: OutputPin,
{
    pub fn new(spi: SPI, cs: CS) -> Self {
        Self { spi, cs }
    }

    // --- Frame primitives ---

    fn write_bytes(&mut self, bsb: u8, addr: u16, data: &[u8]) -> Result<(), NetworkError> {
        let header = [(addr >> 8) as u8, addr as u8, (bsb << 3) | 0x04];
        self.cs.set_low().map_err(|_| NetworkError::Spi)?;
        let res = self
            .spi
            .write(&header)
            .and_then(|_| self.spi.write(data))
            .and_then(|_| self.spi.flush());
        self.cs.set_high().map_err(|_| NetworkError::Spi)?;
        res.map_err(|_| NetworkError::Spi)
    }

    fn read_bytes(&mut self, bsb: u8, addr: u16, buf: &mut [u8]) -> Result<(), NetworkError> {
        let header = [(addr >> 8) as u8, addr as u8, bsb << 3];
        self.cs.set_low().map_err(|_| NetworkError::Spi)?;
        let res = self
            .spi
            .write(&header)
            .and_then(|_| self.spi.read(buf))
            .and_then(|_| self.spi.flush());
        self.cs.set_high().map_err(|_| NetworkError::Spi)?;
        res.map_err(|_| NetworkError::Spi)
    }

    fn write_u8(&mut self, bsb: u8, addr: u16, v: u8) -> Result<(), NetworkError> {
        self.write_bytes(bsb, addr, &[v])
    }

    fn read_u8(&mut self, bsb: u8, addr: u16) -> Result<u8, NetworkError> {
        let mut b = [0u8; 1];
        self.read_bytes(bsb, addr, &mut b)?;
        Ok(b[0])
    }

    fn write_u16(&mut self, bsb: u8, addr: u16, v: u16) -> Result<(), NetworkError> {
        self.write_bytes(bsb, addr, &v.to_be_bytes())
    }

    fn read_u16(&mut self, bsb: u8, addr: u16) -> Result<u16, NetworkError> {
        let mut b = [0u8; 2];
        self.read_bytes(bsb, addr, &mut b)?;
        Ok(u16::from_be_bytes(b))
    }

    /// FSR/RSR move under hardware control; read until two samples agree.
    fn read_u16_stable(&mut self, bsb: u8, addr: u16) -> Result<u16, NetworkError> {
        let mut prev = self.read_u16(bsb, addr)?;
        for _ in 0..SPIN_LIMIT {
            let cur = self.read_u16(bsb, addr)?;
            if cur == prev {
                return Ok(cur);
            }
            prev = cur;
        }
        Err(NetworkError::Socket)
    }

    // --- Chip bring-up ---

    /// Soft-reset the chip, probe the version register, program the MAC
    /// address. Fails with `NoLink` when no W5500 answers on the bus.
    pub fn init(
        &mut self,
        mac: &[u8; 6],
        delay: &mut impl embedded_hal::delay::DelayNs,
    ) -> Result<(), NetworkError> {
        self.write_u8(COMMON, MR, MR_RST)?;
        delay.delay_ms(2);

        let mut probed = false;
        for _ in 0..10 {
            if self.read_u8(COMMON, VERSIONR)? == CHIP_VERSION {
                probed = true;
                break;
            }
            delay.delay_ms(1);
        }
        if !probed {
            return Err(NetworkError::NoLink);
        }

        self.write_bytes(COMMON, SHAR, mac)
    }

    pub fn set_net_config(&mut self, cfg: &NetConfig) -> Result<(), NetworkError> {
        self.write_bytes(COMMON, SIPR, &cfg.ip)?;
        self.write_bytes(COMMON, SUBR, &cfg.subnet)?;
        self.write_bytes(COMMON, GAR, &cfg.gateway)
    }

    /// Read back what the chip actually carries (the assigned IP).
    pub fn ip_addr(&mut self) -> Result<[u8; 4], NetworkError> {
        let mut ip = [0u8; 4];
        self.read_bytes(COMMON, SIPR, &mut ip)?;
        Ok(ip)
    }

    // --- Socket plumbing ---

    fn command(&mut self, sock: u8, cmd: u8) -> Result<(), NetworkError> {
        self.write_u8(sock_reg(sock), SN_CR, cmd)?;
        for _ in 0..SPIN_LIMIT {
            if self.read_u8(sock_reg(sock), SN_CR)? == 0 {
                return Ok(());
            }
        }
        Err(NetworkError::Socket)
    }

    fn wait_status(&mut self, sock: u8, wanted: u8) -> Result<(), NetworkError> {
        for _ in 0..SPIN_LIMIT {
            if self.status(sock)? == wanted {
                return Ok(());
            }
        }
        Err(NetworkError::Socket)
    }

    pub fn status(&mut self, sock: u8) -> Result<u8, NetworkError> {
        self.read_u8(sock_reg(sock), SN_SR)
    }

    pub fn close(&mut self, sock: u8) -> Result<(), NetworkError> {
        self.command(sock, CMD_CLOSE)?;
        self.write_u8(sock_reg(sock), SN_IR, 0xFF)
    }

    /// Graceful FIN. Falls back to a hard close if the peer never answers.
    pub fn disconnect(&mut self, sock: u8) -> Result<(), NetworkError> {
        self.command(sock, CMD_DISCON)?;
        if self.wait_status(sock, SOCK_CLOSED).is_err() {
            self.close(sock)?;
        }
        Ok(())
    }

    /// Open socket `sock` as a TCP listener on `port`.
    pub fn tcp_listen(&mut self, sock: u8, port: u16) -> Result<(), NetworkError> {
        self.close(sock)?;
        self.write_u8(sock_reg(sock), SN_MR, MODE_TCP)?;
        self.write_u16(sock_reg(sock), SN_PORT, port)?;
        self.command(sock, CMD_OPEN)?;
        self.wait_status(sock, SOCK_INIT)?;
        self.command(sock, CMD_LISTEN)?;
        self.wait_status(sock, SOCK_LISTEN)
    }

    pub fn recv_pending(&mut self, sock: u8) -> Result<bool, NetworkError> {
        Ok(self.read_u16_stable(sock_reg(sock), SN_RX_RSR)? > 0)
    }

    /// Drain up to `buf.len()` bytes from the receive buffer. 0 when empty.
    pub fn tcp_recv(&mut self, sock: u8, buf: &mut [u8]) -> Result<usize, NetworkError> {
        let rsr = self.read_u16_stable(sock_reg(sock), SN_RX_RSR)?;
        if rsr == 0 {
            return Ok(0);
        }
        let n = (rsr as usize).min(buf.len());

        let rd = self.read_u16(sock_reg(sock), SN_RX_RD)?;
        self.read_bytes(sock_rx(sock), rd, &mut buf[..n])?;
        self.write_u16(sock_reg(sock), SN_RX_RD, rd.wrapping_add(n as u16))?;
        self.command(sock, CMD_RECV)?;
        Ok(n)
    }

    /// Queue `data` for transmission, blocking until the chip accepted it.
    pub fn tcp_send(&mut self, sock: u8, data: &[u8]) -> Result<(), NetworkError> {
        for chunk in data.chunks(SOCKET_BUF_SIZE) {
            self.wait_tx_space(sock, chunk.len())?;
            self.send_chunk(sock, chunk)?;
        }
        Ok(())
    }

    fn wait_tx_space(&mut self, sock: u8, len: usize) -> Result<(), NetworkError> {
        for _ in 0..SPIN_LIMIT {
            let fsr = self.read_u16_stable(sock_reg(sock), SN_TX_FSR)?;
            if fsr as usize >= len {
                return Ok(());
            }
            match self.status(sock)? {
                SOCK_ESTABLISHED | SOCK_CLOSE_WAIT => {}
                _ => return Err(NetworkError::Socket),
            }
        }
        Err(NetworkError::Timeout)
    }

    fn send_chunk(&mut self, sock: u8, chunk: &[u8]) -> Result<(), NetworkError> {
        let wr = self.read_u16(sock_reg(sock), SN_TX_WR)?;
        self.write_bytes(sock_tx(sock), wr, chunk)?;
        self.write_u16(sock_reg(sock), SN_TX_WR, wr.wrapping_add(chunk.len() as u16))?;
        self.command(sock, CMD_SEND)?;

        for _ in 0..SPIN_LIMIT {
            let ir = self.read_u8(sock_reg(sock), SN_IR)?;
            if ir & IR_SEND_OK != 0 {
                return self.write_u8(sock_reg(sock), SN_IR, IR_SEND_OK);
            }
            if ir & IR_TIMEOUT != 0 {
                self.write_u8(sock_reg(sock), SN_IR, IR_TIMEOUT)?;
                return Err(NetworkError::Timeout);
            }
        }
        Err(NetworkError::Timeout)
    }

    // --- UDP (DHCP transport) ---

    pub fn udp_open(&mut self, sock: u8, port: u16) -> Result<(), NetworkError> {
        self.close(sock)?;
        self.write_u8(sock_reg(sock), SN_MR, MODE_UDP)?;
        self.write_u16(sock_reg(sock), SN_PORT, port)?;
        self.command(sock, CMD_OPEN)?;
        self.wait_status(sock, SOCK_UDP)
    }

    pub fn udp_send_to(
        &mut self,
        sock: u8,
        ip: [u8; 4],
        port: u16,
        data: &[u8],
    ) -> Result<(), NetworkError> {
        self.write_bytes(sock_reg(sock), SN_DIPR, &ip)?;
        self.write_u16(sock_reg(sock), SN_DPORT, port)?;
        self.wait_tx_space(sock, data.len())?;
        self.send_chunk(sock, data)
    }

    /// One datagram, if any: `(source ip, source port, payload length)`.
    /// Payload is truncated to `buf.len()`; the rest of the datagram is
    /// dropped so the queue stays framed.
    pub fn udp_recv(
        &mut self,
        sock: u8,
        buf: &mut [u8],
    ) -> Result<Option<([u8; 4], u16, usize)>, NetworkError> {
        let rsr = self.read_u16_stable(sock_reg(sock), SN_RX_RSR)?;
        if rsr < 8 {
            return Ok(None);
        }

        let rd = self.read_u16(sock_reg(sock), SN_RX_RD)?;
        let mut header = [0u8; 8];
        self.read_bytes(sock_rx(sock), rd, &mut header)?;
        let src_ip = [header[0], header[1], header[2], header[3]];
        let src_port = u16::from_be_bytes([header[4], header[5]]);
        let len = u16::from_be_bytes([header[6], header[7]]) as usize;

        let n = len.min(buf.len());
        self.read_bytes(sock_rx(sock), rd.wrapping_add(8), &mut buf[..n])?;

        self.write_u16(
            sock_reg(sock),
            SN_RX_RD,
            rd.wrapping_add(8).wrapping_add(len as u16),
        )?;
        self.command(sock, CMD_RECV)?;
        Ok(Some((src_ip, src_port, n)))
    }
}

/// View of the HTTP socket satisfying the recovery session's socket seam.
pub struct HttpSocket<'a, SPI, CS> {
    pub w5500: &'a mut W5500<SPI, CS>,
}

impl<SPI, CS> RecoverySocket for HttpSocket<'_, SPI, CS>
where
    SPI: SpiBus<u8>,
    CS: OutputPin,
{
    fn recv(&mut self, buf: &mut [u8]) -> Result<usize, NetworkError> {
        self.w5500.tcp_recv(HTTP_SOCKET, buf)
    }

    fn send(&mut self, data: &[u8]) -> Result<(), NetworkError> {
        self.w5500.tcp_send(HTTP_SOCKET, data)
    }

    fn is_open(&mut self) -> bool {
        match self.w5500.status(HTTP_SOCKET) {
            Ok(SOCK_ESTABLISHED) => true,
            // Peer sent FIN; data may still sit in the receive buffer.
            Ok(SOCK_CLOSE_WAIT) => self.w5500.recv_pending(HTTP_SOCKET).unwrap_or(false),
            _ => false,
        }
    }
}
