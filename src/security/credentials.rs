// Copyright (c) 2024-2025 Jesse Morgan / Morgan Forge
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Admin credential policy.
//!
//! Only the exact configured (username, secret) pair is accepted, compared
//! case-insensitively. Every rule is evaluated, so a bad pair can yield more
//! than one message (an empty username with a good secret reports both the
//! missing username and the mismatch).

use subtle::ConstantTimeEq;

pub const USERNAME_REQUIRED: &str = "Username is required";
pub const PASSWORD_REQUIRED: &str = "Password is required";
pub const PASSWORD_INCORRECT: &str = "Password is incorrect";
pub const CREDENTIALS_INCORRECT: &str = "Username and password are incorrect";
pub const USERNAME_INCORRECT: &str = "Username is incorrect";
pub const SESSION_UNAVAILABLE: &str = "Admin session could not be started";

/// Outcome of one authentication attempt.
///
/// Messages are kept in the order the rules ran.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CredentialCheck {
    errors: Vec<String>,
}

impl CredentialCheck {
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn is_successful(&self) -> bool {
        self.errors.is_empty()
    }

    pub(crate) fn push_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }
}

/// Case-insensitive, constant-time comparison of two credential strings.
fn matches_ignore_case(input: &str, expected: &str) -> bool {
    let input = input.to_lowercase();
    let expected = expected.to_lowercase();
    input.as_bytes().ct_eq(expected.as_bytes()).into()
}

/// Run the admin credential rules against a username/password pair.
///
/// Blank checks trim, identity checks do not: `" admin"` is present but is not
/// the admin username.
pub fn check_credentials(
    username: &str,
    password: &str,
    admin_username: &str,
    admin_secret: &str,
) -> CredentialCheck {
    let mut errors = Vec::new();

    let user_ok = matches_ignore_case(username, admin_username);
    let secret_ok = matches_ignore_case(password, admin_secret);

    if username.trim().is_empty() {
        errors.push(USERNAME_REQUIRED.to_string());
    }
    if password.trim().is_empty() {
        errors.push(PASSWORD_REQUIRED.to_string());
    }
    if user_ok && !secret_ok {
        errors.push(PASSWORD_INCORRECT.to_string());
    }
    if !user_ok && !secret_ok {
        errors.push(CREDENTIALS_INCORRECT.to_string());
    }
    if !user_ok && secret_ok {
        errors.push(USERNAME_INCORRECT.to_string());
    }

    CredentialCheck { errors }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(user: &str, pass: &str) -> CredentialCheck {
        check_credentials(user, pass, "Supervisor", "Gear5hop")
    }

    #[test]
    fn test_exact_pair_succeeds() {
        assert!(check("Supervisor", "Gear5hop").is_successful());
    }

    #[test]
    fn test_comparison_ignores_case() {
        assert!(check("SUPERVISOR", "gear5HOP").is_successful());
    }

    #[test]
    fn test_wrong_password() {
        let result = check("supervisor", "nope");
        assert_eq!(result.errors(), [PASSWORD_INCORRECT]);
    }

    #[test]
    fn test_both_wrong() {
        let result = check("operator", "nope");
        assert_eq!(result.errors(), [CREDENTIALS_INCORRECT]);
    }

    #[test]
    fn test_right_password_wrong_username() {
        let result = check("operator", "Gear5hop");
        assert_eq!(result.errors(), [USERNAME_INCORRECT]);
    }

    #[test]
    fn test_missing_fields_accumulate() {
        let result = check("", "");
        assert_eq!(result.errors(), [USERNAME_REQUIRED, PASSWORD_REQUIRED, CREDENTIALS_INCORRECT]);

        let result = check("", "Gear5hop");
        assert_eq!(result.errors(), [USERNAME_REQUIRED, USERNAME_INCORRECT]);

        let result = check("supervisor", "   ");
        assert_eq!(result.errors(), [PASSWORD_REQUIRED, PASSWORD_INCORRECT]);
    }

    #[test]
    fn test_surrounding_whitespace_is_not_stripped() {
        let result = check(" Supervisor", "Gear5hop");
        assert_eq!(result.errors(), [USERNAME_INCORRECT]);

        let result = check("Supervisor", "Gear5hop ");
        assert_eq!(result.errors(), [PASSWORD_INCORRECT]);
    }

    #[test]
    fn test_non_empty_pairs_yield_at_most_one_error() {
        let users = ["supervisor", "SuperVisor", "operator", "x"];
        let passwords = ["gear5hop", "GEAR5HOP", "wrong", "y"];
        for user in users {
            for pass in passwords {
                let result = check(user, pass);
                let expected_ok = user.eq_ignore_ascii_case("supervisor")
                    && pass.eq_ignore_ascii_case("gear5hop");
                assert_eq!(result.is_successful(), expected_ok, "{user}/{pass}");
                if !expected_ok {
                    assert_eq!(result.errors().len(), 1, "{user}/{pass}");
                }
            }
        }
    }
}
