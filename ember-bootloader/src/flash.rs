// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Block-device facade over the RP2040 ROM flash routines.
//!
//! On RP2040, flash operations (erase/program) require disabling XIP first.
//! The full sequence is:
//!   1. connect_internal_flash()
//!   2. flash_exit_xip()
//!   3. flash_range_erase() or flash_range_program()
//!   4. flash_flush_cache()
//!   5. flash_enter_cmd_xip()
//!
//! All code executing during steps 1-5 must run from RAM, not flash.
//! We use `#[link_section = ".data"]` to place critical functions in RAM,
//! and pre-resolve all ROM function pointers at init time.
//!
//! The raw routines do not touch the interrupt mask themselves; masking is
//! owned by [`with_flash_critical`], which the public [`RomFlash`] operations
//! use per call and the swap path holds across its whole sector loop.

use ember_common::blockdev::{BlockDevice, StorageError};
use ember_common::layout::{
    addr_to_offset, FLASH_APP_START, FLASH_BASE, FLASH_PAGE_SIZE, FLASH_SECTOR_SIZE,
};

const FLASH_END: u32 = FLASH_BASE + 2 * 1024 * 1024;

// ROM function pointer types
type RomFnVoid = unsafe extern "C" fn();
type RomFnErase = unsafe extern "C" fn(u32, usize, u32, u8);
type RomFnProgram = unsafe extern "C" fn(u32, *const u8, usize);

/// ROM function pointers, resolved once at init from the ROM table.
/// Stored in static RAM so RAM-resident functions can call them without
/// accessing flash-based code.
static mut ROM_CONNECT_INTERNAL_FLASH: RomFnVoid = dummy_void;
static mut ROM_FLASH_EXIT_XIP: RomFnVoid = dummy_void;
static mut ROM_FLASH_RANGE_ERASE: RomFnErase = dummy_erase;
static mut ROM_FLASH_RANGE_PROGRAM: RomFnProgram = dummy_program;
static mut ROM_FLASH_FLUSH_CACHE: RomFnVoid = dummy_void;
static mut ROM_FLASH_ENTER_CMD_XIP: RomFnVoid = dummy_void;

unsafe extern "C" fn dummy_void() {}
unsafe extern "C" fn dummy_erase(_: u32, _: usize, _: u32, _: u8) {}
unsafe extern "C" fn dummy_program(_: u32, _: *const u8, _: usize) {}

/// Look up a ROM function by its two-character tag.
/// ROM table pointer at 0x14 and lookup function at 0x18 are 16-bit halfword pointers.
unsafe fn rom_func_lookup(tag: &[u8; 2]) -> usize {
    let fn_table = *(0x14 as *const u16) as *const u16;
    let lookup: unsafe extern "C" fn(*const u16, u32) -> usize =
        core::mem::transmute::<usize, unsafe extern "C" fn(*const u16, u32) -> usize>(
            *(0x18 as *const u16) as usize,
        );
    let code = u16::from_le_bytes(*tag) as u32;
    lookup(fn_table, code)
}

/// Initialize ROM flash function pointers. Must be called once before any
/// flash operation. The lookups themselves require XIP to be active.
pub fn init() {
    unsafe {
        ROM_CONNECT_INTERNAL_FLASH =
            core::mem::transmute::<usize, RomFnVoid>(rom_func_lookup(b"IF"));
        ROM_FLASH_EXIT_XIP = core::mem::transmute::<usize, RomFnVoid>(rom_func_lookup(b"EX"));
        ROM_FLASH_RANGE_ERASE = core::mem::transmute::<usize, RomFnErase>(rom_func_lookup(b"RE"));
        ROM_FLASH_RANGE_PROGRAM =
            core::mem::transmute::<usize, RomFnProgram>(rom_func_lookup(b"RP"));
        ROM_FLASH_FLUSH_CACHE = core::mem::transmute::<usize, RomFnVoid>(rom_func_lookup(b"FC"));
        ROM_FLASH_ENTER_CMD_XIP = core::mem::transmute::<usize, RomFnVoid>(rom_func_lookup(b"CX"));
    }
}

/// Scoped flash critical section: saves PRIMASK, disables interrupts, runs
/// `f`, restores on all exit paths. Re-entrant, so single operations nest
/// inside a section held across a composite operation such as the swap loop.
pub fn with_flash_critical<R>(f: impl FnOnce() -> R) -> R {
    cortex_m::interrupt::free(|_| f())
}

/// Erase flash at the given flash-relative offset.
/// Runs entirely from RAM with proper XIP teardown/setup.
///
/// # Safety
/// `init()` must have been called; interrupts must be masked by the caller.
#[link_section = ".data"]
#[inline(never)]
unsafe fn flash_erase_raw(offset: u32, size: u32) {
    ROM_CONNECT_INTERNAL_FLASH();
    ROM_FLASH_EXIT_XIP();
    ROM_FLASH_RANGE_ERASE(offset, size as usize, FLASH_SECTOR_SIZE, 0x20);
    ROM_FLASH_FLUSH_CACHE();
    ROM_FLASH_ENTER_CMD_XIP();
}

/// Program flash at the given flash-relative offset.
/// Runs entirely from RAM with proper XIP teardown/setup.
///
/// # Safety
/// `init()` must have been called; interrupts must be masked by the caller.
#[link_section = ".data"]
#[inline(never)]
unsafe fn flash_program_raw(offset: u32, data: *const u8, len: usize) {
    ROM_CONNECT_INTERNAL_FLASH();
    ROM_FLASH_EXIT_XIP();
    ROM_FLASH_RANGE_PROGRAM(offset, data, len);
    ROM_FLASH_FLUSH_CACHE();
    ROM_FLASH_ENTER_CMD_XIP();
}

/// The writable region: everything from the APP slot up. The bootloader's
/// own image can never be erased through this facade.
fn check_writable(addr: u32, len: u32) -> Result<(), StorageError> {
    if addr < FLASH_APP_START || addr.saturating_add(len) > FLASH_END {
        return Err(StorageError::OutOfBounds);
    }
    Ok(())
}

/// Handle for the on-chip QSPI flash.
pub struct RomFlash;

impl BlockDevice for RomFlash {
    fn erase(&mut self, addr: u32, len: u32) -> Result<(), StorageError> {
        if addr % FLASH_SECTOR_SIZE != 0 || len % FLASH_SECTOR_SIZE != 0 {
            return Err(StorageError::Erase);
        }
        check_writable(addr, len)?;
        with_flash_critical(|| unsafe {
            flash_erase_raw(addr_to_offset(addr), len);
        });
        Ok(())
    }

    fn program(&mut self, addr: u32, buf: &[u8]) -> Result<(), StorageError> {
        if addr % FLASH_PAGE_SIZE != 0 || buf.len() % FLASH_PAGE_SIZE as usize != 0 {
            return Err(StorageError::Program);
        }
        check_writable(addr, buf.len() as u32)?;
        with_flash_critical(|| unsafe {
            flash_program_raw(addr_to_offset(addr), buf.as_ptr(), buf.len());
        });
        Ok(())
    }

    fn read(&mut self, addr: u32, buf: &mut [u8]) -> Result<(), StorageError> {
        if addr < FLASH_BASE || addr.saturating_add(buf.len() as u32) > FLASH_END {
            return Err(StorageError::OutOfBounds);
        }
        for (i, byte) in buf.iter_mut().enumerate() {
            *byte = unsafe { ((addr + i as u32) as *const u8).read_volatile() };
        }
        Ok(())
    }
}

// --- Flash unique ID (RUID command 0x4B) ---

const SSI_DR0: *mut u32 = (0x1800_0000u32 + 0x60) as *mut u32;
const SSI_SR: *const u32 = (0x1800_0000u32 + 0x28) as *const u32;
const SR_TFNF: u32 = 1 << 1;
const SR_RFNE: u32 = 1 << 3;

const IO_QSPI_SS_CTRL: *mut u32 = (0x4001_8000u32 + 0x0C) as *mut u32;
const SS_OUTOVER_MASK: u32 = 0x3 << 8;
const SS_OUTOVER_LOW: u32 = 0x2 << 8;
const SS_OUTOVER_HIGH: u32 = 0x3 << 8;

/// Clock the RUID command out over the SSI in direct mode. 13 bytes on the
/// wire: command, four dummies, eight ID bytes.
///
/// # Safety
/// `init()` must have been called; interrupts must be masked by the caller.
#[link_section = ".data"]
#[inline(never)]
unsafe fn read_unique_id_raw(out: &mut [u8; 8]) {
    const XFER_LEN: usize = 13;
    let tx: [u8; XFER_LEN] = [0x4B, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
    let mut rx = [0u8; XFER_LEN];

    ROM_CONNECT_INTERNAL_FLASH();
    ROM_FLASH_EXIT_XIP();

    let ss = IO_QSPI_SS_CTRL.read_volatile() & !SS_OUTOVER_MASK;
    IO_QSPI_SS_CTRL.write_volatile(ss | SS_OUTOVER_LOW);

    let mut to_send = XFER_LEN;
    let mut to_recv = XFER_LEN;
    while to_send > 0 || to_recv > 0 {
        let sr = SSI_SR.read_volatile();
        if to_send > 0 && (sr & SR_TFNF) != 0 {
            SSI_DR0.write_volatile(tx[XFER_LEN - to_send] as u32);
            to_send -= 1;
        }
        if to_recv > 0 && (sr & SR_RFNE) != 0 {
            rx[XFER_LEN - to_recv] = SSI_DR0.read_volatile() as u8;
            to_recv -= 1;
        }
    }

    IO_QSPI_SS_CTRL.write_volatile(ss | SS_OUTOVER_HIGH);

    ROM_FLASH_FLUSH_CACHE();
    ROM_FLASH_ENTER_CMD_XIP();

    IO_QSPI_SS_CTRL.write_volatile(ss);

    out.copy_from_slice(&rx[5..]);
}

/// The 8-byte unique ID of the QSPI flash die. Stable across resets; used to
/// derive the MAC address.
pub fn read_unique_id() -> [u8; 8] {
    let mut id = [0u8; 8];
    with_flash_critical(|| unsafe {
        read_unique_id_raw(&mut id);
    });
    id
}
