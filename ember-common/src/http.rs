// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Minimal HTTP request recognition for the recovery server.
//!
//! Only two request shapes exist: a GET (serve the upload page, or reboot if
//! the path mentions `reboot` in any case) and a POST carrying a raw firmware
//! image. Everything is matched by prefix/substring on the first received
//! chunk; there is no general HTTP parser here.

use core::fmt::Write;

/// Malformed request. Policy: close the connection, keep listening.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProtocolError {
    /// No `\r\n\r\n` header terminator in the first received chunk.
    MissingHeaderEnd,
    /// Neither GET nor POST.
    UnsupportedMethod,
    /// Digest header present but not 64 hex characters.
    BadDigest,
    /// Announced body does not fit the download slot.
    TooLarge,
    /// Connection closed before any request bytes arrived.
    EmptyRequest,
}

impl ProtocolError {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProtocolError::MissingHeaderEnd => "no header terminator",
            ProtocolError::UnsupportedMethod => "unsupported method",
            ProtocolError::BadDigest => "malformed digest header",
            ProtocolError::TooLarge => "body exceeds download slot",
            ProtocolError::EmptyRequest => "empty request",
        }
    }
}

/// Header fields the upload path cares about.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UploadHeader {
    /// Offset of the first body byte within the first received chunk.
    pub body_start: usize,
    /// `Content-Length`, when the client sent one.
    pub content_length: Option<u32>,
    /// `X-Image-Sha256`, when the client sent one.
    pub digest: Option<[u8; 32]>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Request {
    /// GET whose request line mentions `reboot`: reset the hardware.
    Reboot,
    /// Any other GET: serve the recovery page.
    Page,
    /// POST: stream the body into the download slot.
    Upload(UploadHeader),
}

/// Classify the first chunk received on a fresh connection.
pub fn parse_request(chunk: &[u8]) -> Result<Request, ProtocolError> {
    if chunk.starts_with(b"GET ") {
        let line = request_line(chunk);
        if contains_ignore_ascii_case(line, b"reboot") {
            Ok(Request::Reboot)
        } else {
            Ok(Request::Page)
        }
    } else if chunk.starts_with(b"POST ") {
        let header_end =
            find_subsequence(chunk, b"\r\n\r\n").ok_or(ProtocolError::MissingHeaderEnd)?;
        let headers = &chunk[..header_end];

        let content_length = header_value(headers, b"content-length").and_then(parse_dec);

        let digest = match header_value(headers, b"x-image-sha256") {
            Some(v) => Some(parse_hex_digest(v).ok_or(ProtocolError::BadDigest)?),
            None => None,
        };

        Ok(Request::Upload(UploadHeader {
            body_start: header_end + 4,
            content_length,
            digest,
        }))
    } else {
        Err(ProtocolError::UnsupportedMethod)
    }
}

fn request_line(chunk: &[u8]) -> &[u8] {
    match find_subsequence(chunk, b"\r\n") {
        Some(end) => &chunk[..end],
        None => chunk,
    }
}

pub fn contains_ignore_ascii_case(haystack: &[u8], needle: &[u8]) -> bool {
    if needle.is_empty() || haystack.len() < needle.len() {
        return false;
    }
    haystack
        .windows(needle.len())
        .any(|w| w.eq_ignore_ascii_case(needle))
}

fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Look up a header value by case-insensitive name, whitespace-trimmed.
fn header_value<'a>(headers: &'a [u8], name: &[u8]) -> Option<&'a [u8]> {
    for line in headers.split(|&b| b == b'\n') {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        let Some(colon) = line.iter().position(|&b| b == b':') else {
            continue; // request line, blank line
        };
        if line[..colon].eq_ignore_ascii_case(name) {
            return Some(trim_ascii(&line[colon + 1..]));
        }
    }
    None
}

fn trim_ascii(mut v: &[u8]) -> &[u8] {
    while let [b' ' | b'\t', rest @ ..] = v {
        v = rest;
    }
    while let [rest @ .., b' ' | b'\t'] = v {
        v = rest;
    }
    v
}

fn parse_dec(s: &[u8]) -> Option<u32> {
    if s.is_empty() {
        return None;
    }
    let mut v: u32 = 0;
    for &b in s {
        let d = (b as char).to_digit(10)?;
        v = v.checked_mul(10)?.checked_add(d)?;
    }
    Some(v)
}

fn parse_hex_digest(s: &[u8]) -> Option<[u8; 32]> {
    if s.len() != 64 {
        return None;
    }
    let mut out = [0u8; 32];
    for (i, pair) in s.chunks_exact(2).enumerate() {
        let hi = (pair[0] as char).to_digit(16)?;
        let lo = (pair[1] as char).to_digit(16)?;
        out[i] = ((hi << 4) | lo) as u8;
    }
    Some(out)
}

// --- Responses ---

/// Upload page. The script attaches an `X-Image-Sha256` header when WebCrypto
/// is available; otherwise the device verifies against the digest already
/// stored out-of-band.
pub const RECOVERY_PAGE: &str = "<!DOCTYPE html>\n\
<html><head><title>Firmware recovery</title></head><body>\n\
<h1>Firmware recovery</h1>\n\
<p>Select a firmware image and press Upload. Do not power off the device.</p>\n\
<input type=\"file\" id=\"fw\"><button onclick=\"up()\">Upload</button>\n\
<pre id=\"out\"></pre>\n\
<script>\n\
async function up(){\n\
const f=document.getElementById('fw').files[0];\n\
const o=document.getElementById('out');\n\
if(!f){o.textContent='no file selected';return;}\n\
const b=await f.arrayBuffer();\n\
const h={'Content-Type':'application/octet-stream'};\n\
if(window.crypto&&crypto.subtle){\n\
const d=await crypto.subtle.digest('SHA-256',b);\n\
h['X-Image-Sha256']=Array.from(new Uint8Array(d)).map(x=>x.toString(16).padStart(2,'0')).join('');\n\
}\n\
o.textContent='uploading '+b.byteLength+' bytes...';\n\
try{\n\
const r=await fetch('/upload',{method:'POST',headers:h,body:b});\n\
o.textContent=r.ok?'upload accepted, device is restarting':'upload rejected';\n\
}catch(e){o.textContent='upload failed: '+e;}\n\
}\n\
</script></body></html>\n";

/// Largest response the server ever sends.
pub const MAX_RESPONSE_SIZE: usize = RECOVERY_PAGE.len() + 128;

pub const OK_RESPONSE: &[u8] =
    b"HTTP/1.1 200 OK\r\nContent-Length: 0\r\nConnection: close\r\n\r\n";

/// Write the full 200 response carrying the recovery page into `buf`.
/// Returns the number of bytes written.
pub fn page_response(buf: &mut [u8]) -> usize {
    let mut w = SliceWriter { buf, pos: 0 };
    let _ = write!(
        w,
        "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        RECOVERY_PAGE.len(),
        RECOVERY_PAGE
    );
    w.pos
}

struct SliceWriter<'b> {
    buf: &'b mut [u8],
    pos: usize,
}

impl Write for SliceWriter<'_> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        let bytes = s.as_bytes();
        let remaining = self.buf.len() - self.pos;
        let to_write = bytes.len().min(remaining);
        self.buf[self.pos..self.pos + to_write].copy_from_slice(&bytes[..to_write]);
        self.pos += to_write;
        Ok(())
    }
}
