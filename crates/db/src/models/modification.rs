use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modification {
    pub employee_id: String,
    pub employee_name: String,
    pub team_name: String,
    pub date_index: usize,
    pub date_header: String,
    pub old_shift: String,
    pub new_shift: String,
    pub modified_by: String,
    pub timestamp: DateTime<Utc>,
    pub month_year: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthlyStats {
    pub total_modifications: u64,
    /// Distinct employee ids, first-modified first.
    pub employees_modified: Vec<String>,
    pub modifications_by_user: BTreeMap<String, u64>,
}

/// Append-only record of manual cell edits with per-month aggregates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModificationLedger {
    #[serde(default)]
    modifications: Vec<Modification>,
    #[serde(default)]
    monthly_stats: BTreeMap<String, MonthlyStats>,
}

impl ModificationLedger {
    pub const DOCUMENT: &'static str = "modifications";

    pub fn append(&mut self, modification: Modification) {
        let stats = self
            .monthly_stats
            .entry(modification.month_year.clone())
            .or_default();
        stats.total_modifications += 1;
        if !stats.employees_modified.contains(&modification.employee_id) {
            stats
                .employees_modified
                .push(modification.employee_id.clone());
        }
        *stats
            .modifications_by_user
            .entry(modification.modified_by.clone())
            .or_default() += 1;

        self.modifications.push(modification);
    }

    pub fn entries(&self) -> &[Modification] {
        &self.modifications
    }

    pub fn is_empty(&self) -> bool {
        self.modifications.is_empty()
    }

    pub fn stats_for(&self, month_year: &str) -> Option<&MonthlyStats> {
        self.monthly_stats.get(month_year)
    }

    pub fn for_month<'a>(&'a self, month_year: &'a str) -> impl Iterator<Item = &'a Modification> {
        self.modifications
            .iter()
            .filter(move |m| m.month_year == month_year)
    }

    pub fn for_employee<'a>(&'a self, employee_id: &'a str) -> impl Iterator<Item = &'a Modification> {
        self.modifications
            .iter()
            .filter(move |m| m.employee_id == employee_id)
    }
}

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// `YYYY-MM` bucket of the month a date header falls in.
///
/// Understands ISO dates (`2025-01-03`) and day/month labels such as `1Jan`,
/// `01-Jan`, `Mon 1 Jan` or `Jan 1 2025`. A label without a four-digit year
/// takes the year of `fallback`; an unrecognised label buckets under
/// `fallback`'s month.
pub fn month_bucket(header: &str, fallback: DateTime<Utc>) -> String {
    let header = header.trim();
    if let Ok(date) = NaiveDate::parse_from_str(header, "%Y-%m-%d") {
        return format!("{:04}-{:02}", date.year(), date.month());
    }

    let lower = header.to_ascii_lowercase();
    let tokens: Vec<&str> = lower
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();

    let month = tokens.iter().find_map(|token| {
        let letters: String = token.chars().filter(|c| c.is_ascii_alphabetic()).collect();
        if letters.len() < 3 {
            return None;
        }
        MONTHS
            .iter()
            .position(|m| letters.starts_with(m))
            .map(|i| i as u32 + 1)
    });

    let year = tokens.iter().find_map(|token| {
        (token.len() == 4 && token.chars().all(|c| c.is_ascii_digit()))
            .then(|| token.parse::<i32>().ok())
            .flatten()
    });

    match month {
        Some(month) => format!("{:04}-{:02}", year.unwrap_or(fallback.year()), month),
        None => format!("{:04}-{:02}", fallback.year(), fallback.month()),
    }
}
