// Copyright (c) 2026 ADNT Sarl <info@adnt.io>
// SPDX-License-Identifier: MIT

//! Line console over USB CDC: input editing as an event stream, command
//! parsing, and a `fmt` sink that writes straight to the serial port.
//!
//! The editor owns no I/O. It turns each input byte into an [`Input`] event
//! and the caller decides what reaches the terminal, which keeps the USB
//! plumbing out of the editing logic.

use core::fmt;

use heapless::Vec;
use rp2040_hal::usb::UsbBus;
use usbd_serial::SerialPort;

/// Commands understood by the sample firmware.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Help,
    Status,
    Commit,
    Update,
    Reboot,
}

impl Command {
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim() {
            "help" | "?" => Some(Command::Help),
            "status" => Some(Command::Status),
            "commit" => Some(Command::Commit),
            "update" => Some(Command::Update),
            "reboot" => Some(Command::Reboot),
            _ => None,
        }
    }
}

/// What the terminal should do in response to one input byte.
pub enum Input {
    /// Nothing: dropped control byte, LF, or a full line buffer.
    None,
    /// Echo the accepted character.
    Echo(u8),
    /// Erase the last character on screen.
    Rubout,
    /// Enter was pressed; the buffered line is complete.
    Line,
}

const LINE_CAP: usize = 64;

/// Minimal line editor: printable bytes accumulate, backspace erases, CR
/// completes the line. LF is dropped so CRLF terminals do not produce a
/// phantom empty command.
pub struct LineEditor {
    buf: Vec<u8, LINE_CAP>,
}

impl LineEditor {
    pub const fn new() -> Self {
        Self { buf: Vec::new() }
    }

    pub fn feed(&mut self, byte: u8) -> Input {
        match byte {
            b'\r' => Input::Line,
            0x08 | 0x7F => {
                if self.buf.pop().is_some() {
                    Input::Rubout
                } else {
                    Input::None
                }
            }
            0x20..=0x7E => {
                if self.buf.push(byte).is_ok() {
                    Input::Echo(byte)
                } else {
                    Input::None
                }
            }
            _ => Input::None,
        }
    }

    pub fn line(&self) -> &str {
        core::str::from_utf8(&self.buf).unwrap_or("")
    }

    pub fn clear(&mut self) {
        self.buf.clear();
    }
}

/// `fmt` sink over the CDC port, translating `\n` into `\r\n`. Writes are
/// best-effort: if the host stops draining the TX buffer the tail is dropped
/// rather than wedging the console.
pub struct SerialOut<'a, 'p> {
    pub serial: &'a mut SerialPort<'p, UsbBus>,
}

impl SerialOut<'_, '_> {
    fn write_all(&mut self, mut bytes: &[u8]) {
        while !bytes.is_empty() {
            match self.serial.write(bytes) {
                Ok(n) if n > 0 => bytes = &bytes[n..],
                _ => break,
            }
        }
    }
}

impl fmt::Write for SerialOut<'_, '_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let mut first = true;
        for part in s.split('\n') {
            if !first {
                self.write_all(b"\r\n");
            }
            first = false;
            self.write_all(part.as_bytes());
        }
        Ok(())
    }
}
