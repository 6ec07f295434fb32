// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Unit tests for the recovery session against a scripted socket and the
//! RAM-backed block device.

use std::collections::VecDeque;

use sha2::{Digest, Sha256};

use ember_common::http::ProtocolError;
use ember_common::layout::{FLASH_BASE, FLASH_DOWNLOAD_SLOT_START, WRITE_ALIGN};
use ember_common::metadata::{read_record, update_record};
use ember_common::net::NetworkError;
use ember_common::server::{serve_connection, RecoverySocket, SessionOutcome};
use ember_common::testing::MemFlash;

const DEVICE_LEN: usize = 2 * 1024 * 1024;

/// Socket fed from a script of receive chunks. Once the script is drained
/// the peer counts as gone, which is how uploads without a Content-Length
/// terminate.
struct ScriptSocket {
    incoming: VecDeque<Vec<u8>>,
    sent: Vec<u8>,
}

impl ScriptSocket {
    fn new(chunks: &[&[u8]]) -> Self {
        Self {
            incoming: chunks.iter().map(|c| c.to_vec()).collect(),
            sent: Vec::new(),
        }
    }

    fn sent_str(&self) -> String {
        String::from_utf8_lossy(&self.sent).into_owned()
    }
}

impl RecoverySocket for ScriptSocket {
    fn recv(&mut self, buf: &mut [u8]) -> Result<usize, NetworkError> {
        let Some(mut chunk) = self.incoming.pop_front() else {
            return Ok(0);
        };
        let n = chunk.len().min(buf.len());
        buf[..n].copy_from_slice(&chunk[..n]);
        if n < chunk.len() {
            self.incoming.push_front(chunk.split_off(n));
        }
        Ok(n)
    }

    fn send(&mut self, data: &[u8]) -> Result<(), NetworkError> {
        self.sent.extend_from_slice(data);
        Ok(())
    }

    fn is_open(&mut self) -> bool {
        !self.incoming.is_empty()
    }
}

fn device() -> MemFlash {
    MemFlash::new(FLASH_BASE, DEVICE_LEN)
}

fn body_of(len: usize) -> Vec<u8> {
    (0..len).map(|i| ((i * 31 + 7) % 256) as u8).collect()
}

fn digest_hex(data: &[u8]) -> String {
    Sha256::digest(data)
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

fn post_request(body: &[u8], digest: Option<&str>, content_length: bool) -> Vec<u8> {
    let mut head = String::from("POST /upload HTTP/1.1\r\n");
    if content_length {
        head.push_str(&format!("Content-Length: {}\r\n", body.len()));
    }
    if let Some(d) = digest {
        head.push_str(&format!("X-Image-Sha256: {d}\r\n"));
    }
    head.push_str("\r\n");

    let mut req = head.into_bytes();
    req.extend_from_slice(body);
    req
}

// =============================================================================
// GET sessions
// =============================================================================

#[test]
fn test_get_serves_page_with_content_length() {
    let mut dev = device();
    let mut sock = ScriptSocket::new(&[b"GET / HTTP/1.1\r\nHost: x\r\n\r\n"]);

    let outcome = serve_connection(&mut sock, &mut dev).unwrap();
    assert_eq!(outcome, SessionOutcome::PageServed);

    let resp = sock.sent_str();
    assert!(resp.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(resp.contains("Content-Length: "));
}

#[test]
fn test_get_reboot_requests_reset() {
    let mut dev = device();
    let mut sock = ScriptSocket::new(&[b"GET /Reboot HTTP/1.1\r\n\r\n"]);

    let outcome = serve_connection(&mut sock, &mut dev).unwrap();
    assert_eq!(outcome, SessionOutcome::RebootRequested);
    assert!(sock.sent.is_empty(), "reboot sends no response");
}

#[test]
fn test_peer_closing_without_request() {
    let mut dev = device();
    let mut sock = ScriptSocket::new(&[]);

    let outcome = serve_connection(&mut sock, &mut dev).unwrap();
    assert_eq!(
        outcome,
        SessionOutcome::Protocol(ProtocolError::EmptyRequest)
    );
}

// =============================================================================
// Uploads
// =============================================================================

#[test]
fn test_upload_lands_at_offset_zero_and_verifies() {
    let mut dev = device();
    let body = body_of(5 * WRITE_ALIGN + 100); // deliberately unaligned tail
    let hex = digest_hex(&body);
    let req = post_request(&body, Some(&hex), true);

    let mut sock = ScriptSocket::new(&[&req]);
    let outcome = serve_connection(&mut sock, &mut dev).unwrap();
    assert_eq!(
        outcome,
        SessionOutcome::UploadVerified {
            image_len: body.len() as u32
        }
    );

    // Body bytes at offset 0, zero padding up to the next ALIGN boundary
    assert_eq!(dev.slice(FLASH_DOWNLOAD_SLOT_START, body.len()), &body[..]);
    let pad = dev.slice(
        FLASH_DOWNLOAD_SLOT_START + body.len() as u32,
        WRITE_ALIGN - 100,
    );
    assert!(pad.iter().all(|&b| b == 0));

    // Metadata updated for the swap
    let rec = read_record(&mut dev).unwrap();
    assert!(rec.download_slot_valid());
    assert_eq!(rec.swap_size(), body.len() as u32);

    // 200 response on the wire
    assert!(sock.sent_str().starts_with("HTTP/1.1 200 OK"));
}

#[test]
fn test_upload_fragmented_delivery_without_content_length() {
    let mut dev = device();
    let body = body_of(3 * WRITE_ALIGN);
    let hex = digest_hex(&body);

    // Header in the first chunk, body dribbling in afterwards, terminated by
    // peer close (no Content-Length).
    let head = post_request(&[], Some(&hex), false);
    let mut chunks: Vec<&[u8]> = vec![&head];
    let mut pieces = body.chunks(97);
    chunks.extend(&mut pieces);

    let mut sock = ScriptSocket::new(&chunks);
    let outcome = serve_connection(&mut sock, &mut dev).unwrap();
    assert_eq!(
        outcome,
        SessionOutcome::UploadVerified {
            image_len: body.len() as u32
        }
    );
    assert_eq!(dev.slice(FLASH_DOWNLOAD_SLOT_START, body.len()), &body[..]);
}

#[test]
fn test_upload_exact_align_multiple_has_no_padding_write() {
    let mut dev = device();
    let body = body_of(4 * WRITE_ALIGN);
    let hex = digest_hex(&body);
    let req = post_request(&body, Some(&hex), true);

    let mut sock = ScriptSocket::new(&[&req]);
    let outcome = serve_connection(&mut sock, &mut dev).unwrap();
    assert_eq!(
        outcome,
        SessionOutcome::UploadVerified {
            image_len: body.len() as u32
        }
    );
    assert_eq!(dev.slice(FLASH_DOWNLOAD_SLOT_START, body.len()), &body[..]);
}

#[test]
fn test_upload_bad_digest_is_rejected_without_commit() {
    let mut dev = device();
    let body = body_of(WRITE_ALIGN * 2);
    let wrong = digest_hex(b"not the body");
    let req = post_request(&body, Some(&wrong), true);

    let mut sock = ScriptSocket::new(&[&req]);
    let outcome = serve_connection(&mut sock, &mut dev).unwrap();
    assert_eq!(outcome, SessionOutcome::IntegrityFailure);

    let rec = read_record(&mut dev).unwrap();
    assert!(!rec.download_slot_valid());
    assert!(!sock.sent_str().contains("200 OK"));
}

#[test]
fn test_upload_verifies_against_provisioned_digest() {
    let mut dev = device();
    let body = body_of(WRITE_ALIGN);

    // Digest stored out-of-band (by the application, before recovery)
    let digest: [u8; 32] = Sha256::digest(&body).into();
    update_record(&mut dev, |rec| rec.set_digest(&digest)).unwrap();

    let req = post_request(&body, None, true);
    let mut sock = ScriptSocket::new(&[&req]);
    let outcome = serve_connection(&mut sock, &mut dev).unwrap();
    assert_eq!(
        outcome,
        SessionOutcome::UploadVerified {
            image_len: body.len() as u32
        }
    );
}

#[test]
fn test_upload_without_terminator_is_protocol_error() {
    let mut dev = device();
    let mut sock = ScriptSocket::new(&[b"POST /upload HTTP/1.1\r\nContent-Length: 10\r\n"]);

    let outcome = serve_connection(&mut sock, &mut dev).unwrap();
    assert_eq!(
        outcome,
        SessionOutcome::Protocol(ProtocolError::MissingHeaderEnd)
    );
}

#[test]
fn test_upload_announcing_oversized_body_is_rejected() {
    let mut dev = device();
    let req = b"POST /upload HTTP/1.1\r\nContent-Length: 999999999\r\n\r\n";
    let mut sock = ScriptSocket::new(&[req]);

    let outcome = serve_connection(&mut sock, &mut dev).unwrap();
    assert_eq!(outcome, SessionOutcome::Protocol(ProtocolError::TooLarge));
}

// =============================================================================
// Session sequences: the server survives any outcome and accepts again
// =============================================================================

#[test]
fn test_session_sequence_reaches_every_next_accept() {
    let mut dev = device();
    let body = body_of(WRITE_ALIGN + 5);
    let good = post_request(&body, Some(&digest_hex(&body)), true);
    let bad = post_request(&body, Some(&digest_hex(b"mismatch")), true);

    // page, malformed, bad digest, good upload: each session completes and
    // leaves the server ready for the next connection.
    let sessions: Vec<(Vec<u8>, bool)> = vec![
        (b"GET / HTTP/1.1\r\n\r\n".to_vec(), false),
        (b"DELETE / HTTP/1.1\r\n\r\n".to_vec(), false),
        (bad, false),
        (good, true),
    ];

    for (req, expect_commit) in sessions {
        let mut sock = ScriptSocket::new(&[&req]);
        let outcome = serve_connection(&mut sock, &mut dev).unwrap();
        let committed = matches!(outcome, SessionOutcome::UploadVerified { .. });
        assert_eq!(committed, expect_commit, "request {:?}", &req[..10.min(req.len())]);
    }

    let rec = read_record(&mut dev).unwrap();
    assert!(rec.download_slot_valid());
}
