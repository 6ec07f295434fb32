// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! One-shot HTTP requests over a plain TCP connection.
//!
//! The device side is a single-connection server that only understands two
//! request shapes, so a full HTTP client buys nothing; each command opens a
//! fresh connection, writes one request, and reads one status line.

use std::io::{BufRead, BufReader, Write};
use std::net::TcpStream;
use std::time::Duration;

use anyhow::{Context, Result};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
// Verification hashes the whole image before the response is sent.
const RESPONSE_TIMEOUT: Duration = Duration::from_secs(120);

pub struct HttpClient {
    addr: String,
}

impl HttpClient {
    pub fn new(host: &str) -> Self {
        let addr = if host.contains(':') {
            host.to_string()
        } else {
            format!("{host}:80")
        };
        Self { addr }
    }

    fn connect(&self) -> Result<TcpStream> {
        let addrs: Vec<_> = std::net::ToSocketAddrs::to_socket_addrs(&self.addr)
            .with_context(|| format!("Invalid address {}", self.addr))?
            .collect();
        let addr = addrs.first().context("Address resolved to nothing")?;
        let stream = TcpStream::connect_timeout(addr, CONNECT_TIMEOUT)
            .with_context(|| format!("Failed to connect to {}", self.addr))?;
        stream.set_read_timeout(Some(RESPONSE_TIMEOUT))?;
        stream.set_write_timeout(Some(RESPONSE_TIMEOUT))?;
        Ok(stream)
    }

    /// GET `path`; `None` when the peer closed without answering (which is
    /// what a reboot request does).
    pub fn get(&self, path: &str) -> Result<Option<u16>> {
        let mut stream = self.connect()?;
        write!(stream, "GET {path} HTTP/1.1\r\nHost: {}\r\n\r\n", self.addr)?;
        stream.flush()?;
        read_status(stream)
    }

    /// POST `body` to `path` as a raw octet stream, reporting progress per
    /// written chunk.
    pub fn post_image(
        &self,
        path: &str,
        digest_hex: &str,
        body: &[u8],
        mut progress: impl FnMut(u64),
    ) -> Result<Option<u16>> {
        let mut stream = self.connect()?;
        write!(
            stream,
            "POST {path} HTTP/1.1\r\nHost: {}\r\nContent-Type: application/octet-stream\r\nContent-Length: {}\r\nX-Image-Sha256: {digest_hex}\r\n\r\n",
            self.addr,
            body.len()
        )?;

        // Chunked writes so the progress bar tracks the device draining its
        // receive buffer, not the kernel accepting one huge write.
        let mut written = 0u64;
        for chunk in body.chunks(2048) {
            stream.write_all(chunk)?;
            written += chunk.len() as u64;
            progress(written);
        }
        stream.flush()?;

        read_status(stream)
    }
}

fn read_status(stream: TcpStream) -> Result<Option<u16>> {
    let mut reader = BufReader::new(stream);
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Ok(None); // peer closed without a response
    }

    // "HTTP/1.1 200 OK"
    let code = line
        .split_whitespace()
        .nth(1)
        .and_then(|s| s.parse::<u16>().ok())
        .with_context(|| format!("Malformed response line: {line:?}"))?;
    Ok(Some(code))
}
