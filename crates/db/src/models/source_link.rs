use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::ValidationError;

/// Where each month of the imported roster came from, keyed by `YYYY-MM`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceLinks {
    links: BTreeMap<String, String>,
}

impl SourceLinks {
    pub const DOCUMENT: &'static str = "source_links";

    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.links
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn get(&self, month: &str) -> Option<&str> {
        self.links.get(month).map(String::as_str)
    }

    /// Records `link` for `month`, replacing any earlier one. Returns the
    /// normalised month key.
    pub fn set(&mut self, month: &str, link: &str) -> Result<String, ValidationError> {
        let month = month_key(month)?;
        let link = link.trim();
        if !(link.starts_with("https://") || link.starts_with("http://")) {
            return Err(ValidationError::new(format!(
                "link for {month} must be an http(s) URL"
            )));
        }
        self.links.insert(month.clone(), link.to_string());
        Ok(month)
    }

    pub fn remove(&mut self, month: &str) -> bool {
        self.links.remove(month.trim()).is_some()
    }
}

fn month_key(month: &str) -> Result<String, ValidationError> {
    let month = month.trim();
    NaiveDate::parse_from_str(&format!("{month}-01"), "%Y-%m-%d")
        .map(|date| date.format("%Y-%m").to_string())
        .map_err(|_| ValidationError::new(format!("month '{month}' must look like YYYY-MM")))
}
