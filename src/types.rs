// Copyright (c) 2024-2025 Jesse Morgan
// Licensed under the MIT License. See LICENSE file for details.

//! Shop-floor record types.
//!
//! Fields hold text exactly as an operator typed it. Numeric fields such as
//! machine numbers stay `String` so validators can report "must be a number"
//! instead of the record failing to exist at all.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Department that owns a machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Department {
    Gear,
    Pinion,
    Inspection,
    Maintenance,
}

impl Department {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gear => "gear",
            Self::Pinion => "pinion",
            Self::Inspection => "inspection",
            Self::Maintenance => "maintenance",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "gear" => Some(Self::Gear),
            "pinion" => Some(Self::Pinion),
            "inspection" => Some(Self::Inspection),
            "maintenance" => Some(Self::Maintenance),
            _ => None,
        }
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Shift {
    Day,
    Afternoon,
    Night,
}

impl Shift {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Afternoon => "afternoon",
            Self::Night => "night",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "day" | "1" | "first" => Some(Self::Day),
            "afternoon" | "2" | "second" => Some(Self::Afternoon),
            "night" | "3" | "third" => Some(Self::Night),
            _ => None,
        }
    }
}

impl fmt::Display for Shift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A machine on the floor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Machine {
    #[serde(default)]
    pub id: Option<u64>,
    pub machine_number: String,
    pub machine_set_id: String,
    pub owner: Option<Department>,
    pub status_message: String,
}

/// A part produced on the floor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub id: Option<u64>,
    pub part_number: String,
    pub part_stamp: String,
    pub part_tooth_count: String,
}

/// A floor user (operator, lead, supervisor).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: Option<u64>,
    pub first_name: String,
    pub last_name: String,
    pub clock_number: String,
    pub shift: Option<Shift>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
    }
}

/// A notice posted to the floor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoUpdate {
    #[serde(default)]
    pub id: Option<u64>,
    pub title: String,
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_department_parse() {
        assert_eq!(Department::parse(" Gear "), Some(Department::Gear));
        assert_eq!(Department::parse("PINION"), Some(Department::Pinion));
        assert_eq!(Department::parse("paint"), None);
        assert_eq!(Department::Maintenance.to_string(), "maintenance");
    }

    #[test]
    fn test_shift_parse() {
        assert_eq!(Shift::parse("2"), Some(Shift::Afternoon));
        assert_eq!(Shift::parse("Night"), Some(Shift::Night));
        assert_eq!(Shift::parse(""), None);
    }

    #[test]
    fn test_user_full_name() {
        let user = User {
            first_name: " Dana ".to_string(),
            last_name: "Kowalski".to_string(),
            ..Default::default()
        };
        assert_eq!(user.full_name(), "Dana Kowalski");
    }

    #[test]
    fn test_machine_json_without_id() {
        let json = r#"{
            "machine_number": "101",
            "machine_set_id": "7",
            "owner": "Gear",
            "status_message": "running"
        }"#;
        let machine: Machine = serde_json::from_str(json).unwrap();
        assert_eq!(machine.id, None);
        assert_eq!(machine.owner, Some(Department::Gear));
    }
}
