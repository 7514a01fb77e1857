use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Label rendered for a stored code that no longer has a definition.
pub const DELETED_SHIFT_LABEL: &str = "Unknown shift (deleted)";
/// Label rendered for an empty cell.
pub const EMPTY_SHIFT_LABEL: &str = "N/A";

const DEFAULT_DEFINITIONS: [(&str, &str); 10] = [
    ("M2", "8 AM – 5 PM"),
    ("M3", "9 AM – 6 PM"),
    ("M4", "10 AM – 7 PM"),
    ("D1", "12 PM – 9 PM"),
    ("D2", "1 PM – 10 PM"),
    ("DO", "OFF"),
    ("SL", "Sick Leave"),
    ("CL", "Casual Leave"),
    ("EL", "Emergency Leave"),
    ("HL", "Holiday Leave"),
];

/// Per-tenant vocabulary of shift codes. A tenant that never edited its
/// vocabulary gets the built-in set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftDefinitions {
    #[serde(default)]
    definitions: BTreeMap<String, String>,
}

impl Default for ShiftDefinitions {
    fn default() -> Self {
        Self {
            definitions: DEFAULT_DEFINITIONS
                .iter()
                .map(|(code, label)| (code.to_string(), label.to_string()))
                .collect(),
        }
    }
}

/// Display-time resolution of a cell value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShiftLabel<'a> {
    Defined(&'a str),
    Empty,
    Deleted,
}

impl ShiftLabel<'_> {
    pub fn as_str(&self) -> &str {
        match self {
            ShiftLabel::Defined(label) => label,
            ShiftLabel::Empty => EMPTY_SHIFT_LABEL,
            ShiftLabel::Deleted => DELETED_SHIFT_LABEL,
        }
    }
}

impl fmt::Display for ShiftLabel<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ShiftDefinitions {
    pub const DOCUMENT: &'static str = "shift_definitions";

    pub fn empty() -> Self {
        Self {
            definitions: BTreeMap::new(),
        }
    }

    pub fn normalize_code(code: &str) -> String {
        code.trim().to_uppercase()
    }

    /// Inserts or overwrites. Expects an already normalised code.
    pub fn upsert(&mut self, code: String, label: String) {
        self.definitions.insert(code, label);
    }

    pub fn remove(&mut self, code: &str) -> bool {
        self.definitions
            .remove(&Self::normalize_code(code))
            .is_some()
    }

    pub fn get(&self, code: &str) -> Option<&str> {
        self.definitions
            .get(&Self::normalize_code(code))
            .map(String::as_str)
    }

    pub fn lookup(&self, code: &str) -> ShiftLabel<'_> {
        if code.trim().is_empty() {
            return ShiftLabel::Empty;
        }
        match self.get(code) {
            Some(label) => ShiftLabel::Defined(label),
            None => ShiftLabel::Deleted,
        }
    }

    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.definitions
    }
}
