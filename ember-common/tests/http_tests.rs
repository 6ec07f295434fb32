// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Unit tests for HTTP request recognition and response building.

use ember_common::http::{
    contains_ignore_ascii_case, page_response, parse_request, ProtocolError, Request,
    MAX_RESPONSE_SIZE, RECOVERY_PAGE,
};

// =============================================================================
// GET recognition
// =============================================================================

#[test]
fn test_get_root_serves_page() {
    let req = b"GET / HTTP/1.1\r\nHost: 192.168.0.100\r\n\r\n";
    assert_eq!(parse_request(req).unwrap(), Request::Page);
}

#[test]
fn test_get_any_path_serves_page() {
    let req = b"GET /index.html HTTP/1.1\r\n\r\n";
    assert_eq!(parse_request(req).unwrap(), Request::Page);
}

#[test]
fn test_get_reboot_any_case() {
    for path in ["/reboot", "/REBOOT", "/ReBoOt", "/api/reboot-now"] {
        let req = format!("GET {path} HTTP/1.1\r\n\r\n");
        assert_eq!(
            parse_request(req.as_bytes()).unwrap(),
            Request::Reboot,
            "path {path}"
        );
    }
}

#[test]
fn test_reboot_marker_only_matches_request_line() {
    // "reboot" in a header must not reset the device
    let req = b"GET / HTTP/1.1\r\nX-Comment: reboot later\r\n\r\n";
    assert_eq!(parse_request(req).unwrap(), Request::Page);
}

#[test]
fn test_get_without_terminator_still_recognized() {
    // GETs are classified from the request line alone
    let req = b"GET / HTTP/1.1\r\nHost: x";
    assert_eq!(parse_request(req).unwrap(), Request::Page);
}

// =============================================================================
// POST recognition
// =============================================================================

#[test]
fn test_post_minimal() {
    let req = b"POST /upload HTTP/1.1\r\n\r\nBODY";
    let Request::Upload(hdr) = parse_request(req).unwrap() else {
        panic!("expected upload");
    };
    assert_eq!(&req[hdr.body_start..], b"BODY");
    assert_eq!(hdr.content_length, None);
    assert_eq!(hdr.digest, None);
}

#[test]
fn test_post_with_content_length() {
    let req = b"POST /upload HTTP/1.1\r\nContent-Length: 512\r\n\r\n";
    let Request::Upload(hdr) = parse_request(req).unwrap() else {
        panic!("expected upload");
    };
    assert_eq!(hdr.content_length, Some(512));
}

#[test]
fn test_post_header_names_are_case_insensitive() {
    let req = b"POST /upload HTTP/1.1\r\nCONTENT-LENGTH:  42 \r\n\r\n";
    let Request::Upload(hdr) = parse_request(req).unwrap() else {
        panic!("expected upload");
    };
    assert_eq!(hdr.content_length, Some(42));
}

#[test]
fn test_post_with_digest_header() {
    let hex = "00112233445566778899aabbccddeeff00112233445566778899AABBCCDDEEFF";
    let req = format!("POST /upload HTTP/1.1\r\nX-Image-Sha256: {hex}\r\n\r\n");
    let Request::Upload(hdr) = parse_request(req.as_bytes()).unwrap() else {
        panic!("expected upload");
    };
    let digest = hdr.digest.unwrap();
    assert_eq!(digest[0], 0x00);
    assert_eq!(digest[1], 0x11);
    assert_eq!(digest[31], 0xFF);
}

#[test]
fn test_post_without_terminator_is_protocol_error() {
    let req = b"POST /upload HTTP/1.1\r\nContent-Length: 512\r\n";
    assert_eq!(
        parse_request(req).unwrap_err(),
        ProtocolError::MissingHeaderEnd
    );
}

#[test]
fn test_post_bad_digest_is_rejected() {
    // Too short
    let req = b"POST /upload HTTP/1.1\r\nX-Image-Sha256: abcd\r\n\r\n";
    assert_eq!(parse_request(req).unwrap_err(), ProtocolError::BadDigest);

    // Right length, not hex
    let bad = "zz".repeat(32);
    let req = format!("POST /upload HTTP/1.1\r\nX-Image-Sha256: {bad}\r\n\r\n");
    assert_eq!(
        parse_request(req.as_bytes()).unwrap_err(),
        ProtocolError::BadDigest
    );
}

#[test]
fn test_unknown_method_is_rejected() {
    assert_eq!(
        parse_request(b"PUT /upload HTTP/1.1\r\n\r\n").unwrap_err(),
        ProtocolError::UnsupportedMethod
    );
    assert_eq!(
        parse_request(b"\x16\x03\x01junk").unwrap_err(),
        ProtocolError::UnsupportedMethod
    );
}

// =============================================================================
// Helpers and responses
// =============================================================================

#[test]
fn test_contains_ignore_ascii_case() {
    assert!(contains_ignore_ascii_case(b"GET /REBOOT", b"reboot"));
    assert!(contains_ignore_ascii_case(b"reboot", b"reboot"));
    assert!(!contains_ignore_ascii_case(b"GET /", b"reboot"));
    assert!(!contains_ignore_ascii_case(b"rebo", b"reboot"));
}

#[test]
fn test_page_response_is_well_formed() {
    let mut buf = [0u8; MAX_RESPONSE_SIZE];
    let len = page_response(&mut buf);
    let resp = std::str::from_utf8(&buf[..len]).unwrap();

    assert!(resp.starts_with("HTTP/1.1 200 OK\r\n"));
    let expected = format!("Content-Length: {}\r\n", RECOVERY_PAGE.len());
    assert!(resp.contains(&expected), "missing {expected:?}");
    assert!(resp.ends_with(RECOVERY_PAGE));

    // Announced length matches the actual body
    let body_start = resp.find("\r\n\r\n").unwrap() + 4;
    assert_eq!(resp.len() - body_start, RECOVERY_PAGE.len());
}
