// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! RAM-backed block device for host tests.
//!
//! Models the properties of NOR flash the core relies on: erase fills a
//! sector range with 0xFF, and a byte can only be programmed while it still
//! reads 0xFF. Geometry violations panic loudly so engine bugs fail tests at
//! the offending call.

use crate::blockdev::{BlockDevice, StorageError};
use crate::layout::{FLASH_PAGE_SIZE, FLASH_SECTOR_SIZE};

pub struct MemFlash {
    base: u32,
    mem: Vec<u8>,
    pub erase_count: u32,
    pub program_count: u32,
    /// When set, the next matching operation fails (for error-path tests).
    pub fail_next_erase: bool,
    pub fail_next_program: bool,
}

impl MemFlash {
    pub fn new(base: u32, len: usize) -> Self {
        assert_eq!(len % FLASH_SECTOR_SIZE as usize, 0);
        Self {
            base,
            mem: vec![0xFF; len],
            erase_count: 0,
            program_count: 0,
            fail_next_erase: false,
            fail_next_program: false,
        }
    }

    fn index(&self, addr: u32, len: usize) -> Result<usize, StorageError> {
        let start = addr
            .checked_sub(self.base)
            .ok_or(StorageError::OutOfBounds)? as usize;
        if start + len > self.mem.len() {
            return Err(StorageError::OutOfBounds);
        }
        Ok(start)
    }

    /// Direct view of the backing memory, for assertions.
    pub fn slice(&self, addr: u32, len: usize) -> &[u8] {
        let start = self.index(addr, len).expect("slice out of range");
        &self.mem[start..start + len]
    }

    /// Test-setup backdoor: place bytes without erase/program bookkeeping.
    pub fn fill(&mut self, addr: u32, data: &[u8]) {
        let start = self.index(addr, data.len()).expect("fill out of range");
        self.mem[start..start + data.len()].copy_from_slice(data);
    }
}

impl BlockDevice for MemFlash {
    fn erase(&mut self, addr: u32, len: u32) -> Result<(), StorageError> {
        assert_eq!(addr % FLASH_SECTOR_SIZE, 0, "unaligned erase address");
        assert_eq!(len % FLASH_SECTOR_SIZE, 0, "unaligned erase length");
        if self.fail_next_erase {
            self.fail_next_erase = false;
            return Err(StorageError::Erase);
        }
        let start = self.index(addr, len as usize)?;
        self.mem[start..start + len as usize].fill(0xFF);
        self.erase_count += 1;
        Ok(())
    }

    fn program(&mut self, addr: u32, buf: &[u8]) -> Result<(), StorageError> {
        assert_eq!(addr % FLASH_PAGE_SIZE, 0, "unaligned program address");
        assert_eq!(
            buf.len() % FLASH_PAGE_SIZE as usize,
            0,
            "unaligned program length"
        );
        if self.fail_next_program {
            self.fail_next_program = false;
            return Err(StorageError::Program);
        }
        let start = self.index(addr, buf.len())?;
        for (i, &b) in buf.iter().enumerate() {
            assert_eq!(
                self.mem[start + i],
                0xFF,
                "program over unerased byte at {:#010x}",
                addr + i as u32
            );
            self.mem[start + i] = b;
        }
        self.program_count += 1;
        Ok(())
    }

    fn read(&mut self, addr: u32, buf: &mut [u8]) -> Result<(), StorageError> {
        let start = self.index(addr, buf.len())?;
        buf.copy_from_slice(&self.mem[start..start + buf.len()]);
        Ok(())
    }
}
