// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Unit tests for the boot decision core and the flag transitions.

use ember_common::boot_fsm::{
    apply_passthrough_commit, apply_rollback, apply_swap_and_arm, apply_swap_and_commit,
    decide_boot_action, recovery_trigger, BootAction, BootFlags, TriggerPolicy,
};
use ember_common::metadata::InfoRecord;

fn flags(should_rollback: bool, has_new_firmware: bool, after_rollback: bool) -> BootFlags {
    BootFlags {
        should_rollback,
        has_new_firmware,
        after_rollback,
    }
}

// =============================================================================
// decide_boot_action: the decision table
// =============================================================================

#[test]
fn test_trigger_always_wins() {
    for sr in [false, true] {
        for hnf in [false, true] {
            for ar in [false, true] {
                assert_eq!(
                    decide_boot_action(true, &flags(sr, hnf, ar)),
                    BootAction::Recovery
                );
            }
        }
    }
}

#[test]
fn test_should_rollback_beats_has_new_firmware() {
    assert_eq!(
        decide_boot_action(false, &flags(true, true, false)),
        BootAction::Rollback
    );
    assert_eq!(
        decide_boot_action(false, &flags(true, false, false)),
        BootAction::Rollback
    );
}

#[test]
fn test_has_new_firmware_selects_swap_and_arm() {
    assert_eq!(
        decide_boot_action(false, &flags(false, true, false)),
        BootAction::SwapAndArm
    );
}

#[test]
fn test_all_clear_selects_passthrough() {
    assert_eq!(
        decide_boot_action(false, &flags(false, false, false)),
        BootAction::Passthrough
    );
    // after_rollback alone does not change the decision
    assert_eq!(
        decide_boot_action(false, &flags(false, false, true)),
        BootAction::Passthrough
    );
}

#[test]
fn test_decision_is_total() {
    // Every input tuple maps to exactly one of the four actions.
    for trigger in [false, true] {
        for sr in [false, true] {
            for hnf in [false, true] {
                for ar in [false, true] {
                    let action = decide_boot_action(trigger, &flags(sr, hnf, ar));
                    let expected = match (trigger, sr, hnf) {
                        (true, _, _) => BootAction::Recovery,
                        (false, true, _) => BootAction::Rollback,
                        (false, false, true) => BootAction::SwapAndArm,
                        (false, false, false) => BootAction::Passthrough,
                    };
                    assert_eq!(action, expected, "tuple ({trigger},{sr},{hnf},{ar})");
                }
            }
        }
    }
}

// =============================================================================
// recovery_trigger: the two policies
// =============================================================================

#[test]
fn test_gpio_only_ignores_flags() {
    let armed = flags(true, true, true);
    assert!(!recovery_trigger(TriggerPolicy::GpioOnly, false, &armed));
    assert!(recovery_trigger(TriggerPolicy::GpioOnly, true, &armed));
}

#[test]
fn test_flag_union_fires_on_any_unresolved_state() {
    for (sr, hnf, ar) in [
        (true, false, false),
        (false, true, false),
        (false, false, true),
    ] {
        assert!(recovery_trigger(
            TriggerPolicy::FlagUnion,
            false,
            &flags(sr, hnf, ar)
        ));
    }
    assert!(!recovery_trigger(
        TriggerPolicy::FlagUnion,
        false,
        &flags(false, false, false)
    ));
    assert!(recovery_trigger(
        TriggerPolicy::FlagUnion,
        true,
        &flags(false, false, false)
    ));
}

// =============================================================================
// BootFlags::from_record
// =============================================================================

#[test]
fn test_flags_from_record() {
    let mut rec = InfoRecord::default_new();
    assert_eq!(BootFlags::from_record(&rec), flags(false, false, false));

    rec.set_should_rollback(true);
    rec.set_has_new_firmware(true);
    assert_eq!(BootFlags::from_record(&rec), flags(true, true, false));
}

// =============================================================================
// Flag transitions
// =============================================================================

#[test]
fn test_apply_swap_and_arm_arms_the_rollback() {
    let mut rec = InfoRecord::default_new();
    rec.set_has_new_firmware(true);
    rec.set_download_slot_valid(true);

    apply_swap_and_arm(&mut rec);

    assert!(rec.should_rollback());
    assert!(rec.has_new_firmware());
    assert!(!rec.after_rollback());
    assert!(!rec.download_slot_valid());
}

#[test]
fn test_apply_rollback_disarms_and_marks() {
    let mut rec = InfoRecord::default_new();
    rec.set_should_rollback(true);
    rec.set_has_new_firmware(true);

    apply_rollback(&mut rec);

    assert!(!rec.should_rollback());
    assert!(!rec.has_new_firmware());
    assert!(rec.after_rollback());
}

#[test]
fn test_apply_swap_and_commit_clears_everything() {
    let mut rec = InfoRecord::default_new();
    rec.set_should_rollback(true);
    rec.set_has_new_firmware(true);
    rec.set_after_rollback(true);
    rec.set_download_slot_valid(true);

    apply_swap_and_commit(&mut rec);

    assert!(!rec.should_rollback());
    assert!(!rec.has_new_firmware());
    assert!(!rec.after_rollback());
    assert!(!rec.download_slot_valid());
}

#[test]
fn test_apply_passthrough_commit_keeps_after_rollback() {
    let mut rec = InfoRecord::default_new();
    rec.set_should_rollback(true);
    rec.set_after_rollback(true);

    apply_passthrough_commit(&mut rec);

    assert!(!rec.should_rollback());
    assert!(!rec.has_new_firmware());
    assert!(rec.after_rollback());
}

// =============================================================================
// Scenario walks (decision + transition, reset by reset)
// =============================================================================

#[test]
fn test_scenario_fresh_device_passes_through() {
    let rec = InfoRecord::default_new();
    let f = BootFlags::from_record(&rec);
    assert_eq!(decide_boot_action(false, &f), BootAction::Passthrough);
}

#[test]
fn test_scenario_successful_ota() {
    let mut rec = InfoRecord::default_new();

    // Application stages an image and requests the update.
    rec.set_swap_size(200 * 1024);
    rec.set_download_slot_valid(true);
    rec.set_has_new_firmware(true);

    // Reset 1: bootloader installs and arms.
    let f = BootFlags::from_record(&rec);
    assert_eq!(decide_boot_action(false, &f), BootAction::SwapAndArm);
    apply_swap_and_arm(&mut rec);
    assert!(rec.should_rollback());

    // New image boots, self-tests, commits through the application ABI.
    rec.set_should_rollback(false);
    rec.set_has_new_firmware(false);

    // Reset 2: nothing armed, ordinary boot.
    let f = BootFlags::from_record(&rec);
    assert_eq!(decide_boot_action(false, &f), BootAction::Passthrough);
}

#[test]
fn test_scenario_ota_without_commit_rolls_back() {
    let mut rec = InfoRecord::default_new();
    rec.set_has_new_firmware(true);

    let f = BootFlags::from_record(&rec);
    assert_eq!(decide_boot_action(false, &f), BootAction::SwapAndArm);
    apply_swap_and_arm(&mut rec);

    // New image never commits. Reset: rollback.
    let f = BootFlags::from_record(&rec);
    assert_eq!(decide_boot_action(false, &f), BootAction::Rollback);
    apply_rollback(&mut rec);

    assert!(rec.after_rollback());
    let f = BootFlags::from_record(&rec);
    assert_eq!(decide_boot_action(false, &f), BootAction::Passthrough);
}
