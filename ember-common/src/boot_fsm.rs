// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Boot decision core - pure logic without hardware dependencies.
//!
//! On every reset the bootloader maps the persisted flags plus the recovery
//! trigger to exactly one action. The arming semantics implement A/B
//! fail-over without watchdog cooperation: swap-and-arm leaves
//! `should_rollback` set, and unless the new application commits, the next
//! reset rolls back.

use crate::metadata::InfoRecord;

/// The one action performed on this reset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BootAction {
    /// Serve the recovery HTTP endpoint until a verified image arrives.
    Recovery,
    /// Swap back to the previous image and mark the rollback.
    Rollback,
    /// Install the staged image and arm the rollback for the next reset.
    SwapAndArm,
    /// Commit the running image and hand off.
    Passthrough,
}

/// Armed-update flags sampled from the metadata store at reset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BootFlags {
    pub should_rollback: bool,
    pub has_new_firmware: bool,
    pub after_rollback: bool,
}

impl BootFlags {
    pub fn from_record(rec: &InfoRecord) -> Self {
        Self {
            should_rollback: rec.should_rollback(),
            has_new_firmware: rec.has_new_firmware(),
            after_rollback: rec.after_rollback(),
        }
    }
}

/// How the recovery trigger is derived from board state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriggerPolicy {
    /// Only the physical recovery pins force recovery. For devices with a
    /// reachable button.
    GpioOnly,
    /// Any unresolved armed state also forces recovery, so every
    /// not-yet-confirmed boot is a recovery opportunity. For headless
    /// deployments.
    FlagUnion,
}

pub fn recovery_trigger(policy: TriggerPolicy, recovery_pin_low: bool, flags: &BootFlags) -> bool {
    match policy {
        TriggerPolicy::GpioOnly => recovery_pin_low,
        TriggerPolicy::FlagUnion => {
            recovery_pin_low
                || flags.should_rollback
                || flags.has_new_firmware
                || flags.after_rollback
        }
    }
}

/// Total over all inputs: exactly one action for every flag combination.
pub fn decide_boot_action(recovery_trigger: bool, flags: &BootFlags) -> BootAction {
    if recovery_trigger {
        BootAction::Recovery
    } else if flags.should_rollback {
        BootAction::Rollback
    } else if flags.has_new_firmware {
        BootAction::SwapAndArm
    } else {
        BootAction::Passthrough
    }
}

// --- Flag transitions, applied to the record after each path's swap ---

/// Rollback: the previous image is back; remember that and disarm.
pub fn apply_rollback(rec: &mut InfoRecord) {
    rec.set_should_rollback(false);
    rec.set_has_new_firmware(false);
    rec.set_after_rollback(true);
    rec.set_download_slot_valid(false);
}

/// Swap-and-arm: the staged image is installed but unproven. The running
/// application must clear `should_rollback` to survive the next reset.
pub fn apply_swap_and_arm(rec: &mut InfoRecord) {
    rec.set_has_new_firmware(true);
    rec.set_after_rollback(false);
    rec.set_should_rollback(true);
    rec.set_download_slot_valid(false);
}

/// Swap-and-commit: a recovery upload was verified and installed; no arming.
pub fn apply_swap_and_commit(rec: &mut InfoRecord) {
    rec.set_should_rollback(false);
    rec.set_has_new_firmware(false);
    rec.set_after_rollback(false);
    rec.set_download_slot_valid(false);
}

/// Passthrough: commit the running image.
pub fn apply_passthrough_commit(rec: &mut InfoRecord) {
    rec.set_should_rollback(false);
    rec.set_has_new_firmware(false);
}
