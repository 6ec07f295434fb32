// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Hand-off to the application: quiesce the core, relocate the vector table
//! to the APP slot, and branch to its reset vector. The application executes
//! in place from flash.

use cortex_m::asm;

unsafe extern "C" {
    static __flash_info_app_vtor: u32;
}

const SYST_CSR: *mut u32 = 0xE000_E010 as *mut u32;
const NVIC_ICER: *mut u32 = 0xE000_E180 as *mut u32;
const NVIC_ICPR: *mut u32 = 0xE000_E280 as *mut u32;
const SCB_VTOR: *mut u32 = 0xE000_ED08 as *mut u32;

const RESETS_RESET: *mut u32 = 0x4000_C000 as *mut u32;
const RESETS_ALL: u32 = 0x01FF_FFFF;
// io_qspi, pads_qspi, pll_sys, syscfg stay out of reset: XIP execution and
// the system clock depend on them.
const RESETS_KEEP: u32 = (1 << 6) | (1 << 9) | (1 << 12) | (1 << 18);

/// Jump to the application in the APP slot. Does not return.
///
/// # Safety
/// All flash operations must have completed and the metadata record must be
/// durable before calling; the APP slot is assumed to hold an image whose
/// vector table is at its base.
pub unsafe fn start_application() -> ! {
    let vtor = &__flash_info_app_vtor as *const u32 as u32;

    cortex_m::interrupt::disable();

    // SysTick off before the vector table moves
    SYST_CSR.write_volatile(0);

    // Disable and clear all external interrupts
    NVIC_ICER.write_volatile(0xFFFF_FFFF);
    NVIC_ICPR.write_volatile(0xFFFF_FFFF);

    // Put every other peripheral back into reset; the application's runtime
    // brings up what it needs.
    let resets = RESETS_RESET.read_volatile();
    RESETS_RESET.write_volatile(resets | (RESETS_ALL & !RESETS_KEEP));

    SCB_VTOR.write_volatile(vtor);
    asm::dsb();
    asm::isb();

    let initial_sp = (vtor as *const u32).read_volatile();
    let reset_vector = (vtor as *const u32).offset(1).read_volatile();

    core::arch::asm!(
        "msr msp, {sp}",
        "cpsie i", // application runtime expects PRIMASK=0
        "bx {reset}",
        sp = in(reg) initial_sp,
        reset = in(reg) reset_vector,
        options(noreturn)
    );
}
