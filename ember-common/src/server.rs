// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Recovery session core: drive one accepted connection to completion.
//!
//! The session is generic over [`RecoverySocket`] so the whole upload path
//! runs in host tests against a scripted socket. One connection at a time;
//! the caller owns accept/re-listen and acts on the returned
//! [`SessionOutcome`] (reset the chip, swap-and-commit, or keep listening).

use heapless::Vec;

use crate::blockdev::{BlockDevice, StorageError};
use crate::http::{self, ProtocolError, Request, UploadHeader};
use crate::layout::{
    FLASH_DOWNLOAD_SLOT_START, FLASH_SECTOR_SIZE, FLASH_SWAP_SPACE_LENGTH, WRITE_ALIGN,
};
use crate::metadata;
use crate::net::NetworkError;
use crate::verify;

/// Read granularity from the socket receive queue.
pub const ETH_CHUNK_SIZE: usize = 2048;

/// Thin interface over the hardware TCP socket backing a recovery session.
pub trait RecoverySocket {
    /// Pull up to `buf.len()` bytes from the receive queue; 0 when empty.
    fn recv(&mut self, buf: &mut [u8]) -> Result<usize, NetworkError>;
    /// Queue `data` for transmission, blocking until the MAC accepted it all.
    fn send(&mut self, data: &[u8]) -> Result<(), NetworkError>;
    /// Whether the peer can still deliver data (established, or half-closed
    /// with bytes left in the receive queue).
    fn is_open(&mut self) -> bool;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Served the recovery page.
    PageServed,
    /// GET with the reboot marker; the caller must reset the hardware.
    RebootRequested,
    /// Image staged and verified; the caller performs swap-and-commit.
    UploadVerified { image_len: u32 },
    /// Upload completed but the digest did not match. Nothing was committed.
    IntegrityFailure,
    /// Malformed request; the connection is dropped.
    Protocol(ProtocolError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionError {
    Network(NetworkError),
    Storage(StorageError),
}

impl From<NetworkError> for SessionError {
    fn from(e: NetworkError) -> Self {
        SessionError::Network(e)
    }
}

impl From<StorageError> for SessionError {
    fn from(e: StorageError) -> Self {
        SessionError::Storage(e)
    }
}

/// Serve one accepted connection to completion.
pub fn serve_connection<S: RecoverySocket, D: BlockDevice>(
    sock: &mut S,
    dev: &mut D,
) -> Result<SessionOutcome, SessionError> {
    let mut chunk = [0u8; ETH_CHUNK_SIZE];
    let n = recv_first(sock, &mut chunk)?;
    if n == 0 {
        return Ok(SessionOutcome::Protocol(ProtocolError::EmptyRequest));
    }

    match http::parse_request(&chunk[..n]) {
        Err(e) => Ok(SessionOutcome::Protocol(e)),
        Ok(Request::Reboot) => Ok(SessionOutcome::RebootRequested),
        Ok(Request::Page) => {
            let mut resp = [0u8; http::MAX_RESPONSE_SIZE];
            let len = http::page_response(&mut resp);
            sock.send(&resp[..len])?;
            Ok(SessionOutcome::PageServed)
        }
        Ok(Request::Upload(hdr)) => stage_upload(sock, dev, &chunk[..n], hdr),
    }
}

/// Block until the first request bytes arrive or the peer gives up.
fn recv_first<S: RecoverySocket>(sock: &mut S, buf: &mut [u8]) -> Result<usize, SessionError> {
    loop {
        let n = sock.recv(buf)?;
        if n > 0 {
            return Ok(n);
        }
        if !sock.is_open() {
            return Ok(0);
        }
    }
}

/// Stream a POST body into the download slot and verify it.
fn stage_upload<S: RecoverySocket, D: BlockDevice>(
    sock: &mut S,
    dev: &mut D,
    first_chunk: &[u8],
    hdr: UploadHeader,
) -> Result<SessionOutcome, SessionError> {
    if let Some(total) = hdr.content_length {
        if total > FLASH_SWAP_SPACE_LENGTH {
            return Ok(SessionOutcome::Protocol(ProtocolError::TooLarge));
        }
    }

    // The slot must be blank before the first page lands. Erase only what the
    // announced body needs; without a length, erase the whole slot.
    let erase_len = match hdr.content_length {
        Some(total) => total
            .div_ceil(FLASH_SECTOR_SIZE)
            .max(1)
            .saturating_mul(FLASH_SECTOR_SIZE),
        None => FLASH_SWAP_SPACE_LENGTH,
    };
    dev.erase(FLASH_DOWNLOAD_SLOT_START, erase_len)?;

    // An in-band digest replaces whatever was provisioned before. The slot is
    // no longer trustworthy either way until verification passes.
    metadata::update_record(dev, |rec| {
        rec.set_download_slot_valid(false);
        if let Some(d) = &hdr.digest {
            rec.set_digest(d);
        }
    })?;

    let mut stage = Stage {
        pending: Vec::new(),
        flushed: 0,
        received: 0,
    };

    let body_start = hdr.body_start.min(first_chunk.len());
    match stage.consume(dev, &first_chunk[body_start..], hdr.content_length) {
        Ok(()) => {}
        Err(StageError::Overflow) => return Ok(SessionOutcome::Protocol(ProtocolError::TooLarge)),
        Err(StageError::Storage(e)) => return Err(e.into()),
    }

    let mut chunk = [0u8; ETH_CHUNK_SIZE];
    while !stage.body_complete(hdr.content_length) {
        let n = sock.recv(&mut chunk)?;
        if n == 0 {
            if sock.is_open() {
                // Stalled uploader: by design the POST body has no timeout.
                continue;
            }
            break; // queue drained, peer gone
        }
        match stage.consume(dev, &chunk[..n], hdr.content_length) {
            Ok(()) => {}
            Err(StageError::Overflow) => {
                return Ok(SessionOutcome::Protocol(ProtocolError::TooLarge))
            }
            Err(StageError::Storage(e)) => return Err(e.into()),
        }
    }

    stage.flush_tail(dev)?;
    let image_len = stage.received;

    let rec = metadata::read_record(dev)?;
    let matches = verify::verify_image(dev, FLASH_DOWNLOAD_SLOT_START, image_len, rec.digest())?;
    if !matches {
        return Ok(SessionOutcome::IntegrityFailure);
    }

    metadata::update_record(dev, |r| {
        r.set_swap_size(image_len);
        r.set_download_slot_valid(true);
    })?;

    sock.send(http::OK_RESPONSE)?;
    Ok(SessionOutcome::UploadVerified { image_len })
}

enum StageError {
    Storage(StorageError),
    Overflow,
}

impl From<StorageError> for StageError {
    fn from(e: StorageError) -> Self {
        StageError::Storage(e)
    }
}

/// ALIGN-granular staging state: accumulate body bytes and program each full
/// buffer at an offset equal to the running flushed count.
struct Stage {
    pending: Vec<u8, WRITE_ALIGN>,
    flushed: u32,
    received: u32,
}

impl Stage {
    fn consume<D: BlockDevice>(
        &mut self,
        dev: &mut D,
        bytes: &[u8],
        content_length: Option<u32>,
    ) -> Result<(), StageError> {
        // With a Content-Length, bytes past the announced body are ignored.
        let take = match content_length {
            Some(total) => ((total - self.received) as usize).min(bytes.len()),
            None => bytes.len(),
        };

        for &b in &bytes[..take] {
            if self.received >= FLASH_SWAP_SPACE_LENGTH {
                return Err(StageError::Overflow);
            }
            // Never fails: the buffer is flushed the moment it fills.
            let _ = self.pending.push(b);
            self.received += 1;

            if self.pending.is_full() {
                dev.program(FLASH_DOWNLOAD_SLOT_START + self.flushed, &self.pending)?;
                self.flushed += WRITE_ALIGN as u32;
                self.pending.clear();
            }
        }
        Ok(())
    }

    fn body_complete(&self, content_length: Option<u32>) -> bool {
        match content_length {
            Some(total) => self.received >= total,
            None => false,
        }
    }

    /// Zero-pad and program a short final buffer.
    fn flush_tail<D: BlockDevice>(&mut self, dev: &mut D) -> Result<(), StorageError> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let _ = self.pending.resize(WRITE_ALIGN, 0);
        dev.program(FLASH_DOWNLOAD_SLOT_START + self.flushed, &self.pending)?;
        self.flushed += WRITE_ALIGN as u32;
        self.pending.clear();
        Ok(())
    }
}
