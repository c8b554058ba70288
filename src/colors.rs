// Copyright (c) 2024-2025 Jesse Morgan / Morgan Forge
// SPDX-License-Identifier: AGPL-3.0-or-later

//! ANSI styling for the operator binary.
//!
//! - RED = rejected credentials, broken rules
//! - GREEN = granted sessions, valid records
//! - YELLOW = warnings
//! - CYAN = headings, hints

/// Reset all formatting
pub const RESET: &str = "\x1b[0m";

/// Bold text
pub const BOLD: &str = "\x1b[1m";

/// Dimmed/faint text
pub const DIM: &str = "\x1b[2m";

pub const RED: &str = "\x1b[31m";

pub const GREEN: &str = "\x1b[32m";

pub const YELLOW: &str = "\x1b[33m";

pub const CYAN: &str = "\x1b[36m";

/// Status markers (no emoji, floor terminals render them badly)
pub mod symbols {
    pub const SUCCESS: &str = "[OK]";
    pub const ERROR: &str = "[X]";
    pub const WARNING: &str = "[!]";
}

/// `[OK] message` in green.
pub fn success_line(message: &str) -> String {
    format!("{GREEN}{}{RESET} {message}", symbols::SUCCESS)
}

/// `[X] message` in red.
pub fn error_line(message: &str) -> String {
    format!("{RED}{}{RESET} {message}", symbols::ERROR)
}

/// `[!] message` in yellow.
pub fn warning_line(message: &str) -> String {
    format!("{YELLOW}{}{RESET} {message}", symbols::WARNING)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_carry_marker_and_reset() {
        let line = error_line("Machine ID is required");
        assert!(line.starts_with(RED));
        assert!(line.contains("[X]"));
        assert!(line.ends_with("Machine ID is required"));
        assert!(success_line("ok").contains(RESET));
    }
}
