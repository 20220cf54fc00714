use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Days of dismissals kept in the ledger
pub const DISMISSAL_RETENTION_DAYS: i64 = 14;

/// Suggestion texts hidden by the user, per `YYYY-MM-DD`
#[derive(Serialize, Deserialize, Default, Clone, Debug, PartialEq)]
#[serde(transparent)]
pub struct DismissalLedger(pub BTreeMap<String, Vec<String>>);

impl DismissalLedger {
    pub fn for_day(&self, date_key: &str) -> &[String] {
        self.0.get(date_key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Appends `text` to the day's list unless already present.
    /// Returns whether the ledger changed.
    pub fn dismiss(&mut self, date_key: &str, text: &str) -> bool {
        let day = self.0.entry(date_key.to_string()).or_default();
        if day.iter().any(|t| t == text) {
            return false;
        }
        day.push(text.to_string());
        true
    }

    /// Drops every day strictly older than `cutoff_key`.
    /// `YYYY-MM-DD` keys order lexicographically like the dates they name.
    pub fn prune_before(&mut self, cutoff_key: &str) -> usize {
        let before = self.0.len();
        self.0.retain(|date, _| date.as_str() >= cutoff_key);
        before - self.0.len()
    }
}
