// Copyright (c) 2024-2025 Jesse Morgan / Morgan Forge
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Rule chains for each shop-floor record.
//!
//! Rule order is part of the contract: it decides which message an operator
//! sees when several things are wrong at once.

use super::{ValidationResult, Validator};
use crate::types::{InfoUpdate, Machine, Part, User};

/// Longest notice title that fits the floor display.
pub const MAX_INFO_TITLE_CHARS: usize = 80;

/// Machine numbers are always three digits ("007", "120").
pub const MACHINE_NUMBER_DIGITS: usize = 3;

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn is_numeric(value: &str) -> bool {
    let value = value.trim();
    !value.is_empty() && value.chars().all(|c| c.is_ascii_digit())
}

/// Evaluate `(broken, message)` rules in order; the first broken one wins.
macro_rules! first_failure {
    ($(($broken:expr, $message:expr)),+ $(,)?) => {{
        $(
            if $broken {
                return ValidationResult::invalid($message);
            }
        )+
        ValidationResult::valid()
    }};
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MachineValidator;

impl Validator<Machine> for MachineValidator {
    fn validate(&self, item: Option<&Machine>) -> ValidationResult {
        let Some(machine) = item else {
            return ValidationResult::invalid("A valid machine item is required");
        };

        first_failure!(
            (is_blank(&machine.machine_number), "Machine ID is required"),
            (!is_numeric(&machine.machine_number), "Machine ID must be a number"),
            (
                machine.machine_number.trim().len() != MACHINE_NUMBER_DIGITS,
                "Machine ID must be exactly 3 digits"
            ),
            (is_blank(&machine.machine_set_id), "Machine set ID is required"),
            (machine.owner.is_none(), "An owning department must be selected"),
            (is_blank(&machine.status_message), "A status comment is required"),
        )
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PartValidator;

impl Validator<Part> for PartValidator {
    fn validate(&self, item: Option<&Part>) -> ValidationResult {
        let Some(part) = item else {
            return ValidationResult::invalid("A valid part item is required");
        };

        first_failure!(
            (is_blank(&part.part_number), "Part number is required"),
            (!is_numeric(&part.part_number), "Part number must be a number"),
            (is_blank(&part.part_stamp), "Part stamp is required"),
            (!is_numeric(&part.part_stamp), "Part stamp must be a number"),
            (is_blank(&part.part_tooth_count), "Tooth count is required"),
            (!is_numeric(&part.part_tooth_count), "Tooth count must be a number"),
        )
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UserValidator;

impl Validator<User> for UserValidator {
    fn validate(&self, item: Option<&User>) -> ValidationResult {
        let Some(user) = item else {
            return ValidationResult::invalid("A valid user item is required");
        };

        first_failure!(
            (is_blank(&user.first_name), "First name is required"),
            (is_blank(&user.last_name), "Last name is required"),
            (is_blank(&user.clock_number), "Clock number is required"),
            (!is_numeric(&user.clock_number), "Clock number must be a number"),
            (user.shift.is_none(), "A shift must be selected"),
        )
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InfoUpdateValidator;

impl Validator<InfoUpdate> for InfoUpdateValidator {
    fn validate(&self, item: Option<&InfoUpdate>) -> ValidationResult {
        let Some(update) = item else {
            return ValidationResult::invalid("A valid info update is required");
        };

        first_failure!(
            (is_blank(&update.title), "Title is required"),
            (
                update.title.trim().chars().count() > MAX_INFO_TITLE_CHARS,
                "Title must be 80 characters or fewer"
            ),
            (is_blank(&update.body), "Update text is required"),
        )
    }
}
