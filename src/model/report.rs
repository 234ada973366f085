//! Per-ward aggregation of a flat record list.

use crate::model::CollectionRecord;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// The aggregation unit for one ward: bill count, amount total and the
/// `"name (code)"` owner strings in record order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WardSummary {
    pub count: u64,
    pub total_amount: f64,
    pub owners: Vec<String>,
}

/// Ward → [`WardSummary`] mapping for a single query result. Iteration and
/// serialization follow first-seen ward order. Built fresh per query and
/// discarded after rendering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WardReport {
    entries: Vec<(String, WardSummary)>,
}

impl WardReport {
    /// Folds a flat record list into ward buckets. Every record lands in
    /// exactly one bucket: its own ward, or `"Unknown"` when the ward field
    /// is absent. An empty input yields an empty report.
    pub fn from_records(records: &[CollectionRecord]) -> Self {
        let mut report = WardReport::default();
        for record in records {
            let summary = report.bucket_mut(record.ward());
            summary.count += 1;
            summary.total_amount += record.amount();
            summary.owners.push(record.owner());
        }
        report
    }

    /// The bucket for `ward`, created on first encounter. A result rarely
    /// holds more than a few dozen wards, so a linear scan suffices.
    fn bucket_mut(&mut self, ward: &str) -> &mut WardSummary {
        if let Some(i) = self.entries.iter().position(|(w, _)| w == ward) {
            return &mut self.entries[i].1;
        }
        self.entries.push((ward.to_string(), WardSummary::default()));
        &mut self.entries.last_mut().expect("just pushed").1
    }

    pub fn get(&self, ward: &str) -> Option<&WardSummary> {
        self.entries
            .iter()
            .find(|(w, _)| w == ward)
            .map(|(_, s)| s)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &WardSummary)> {
        self.entries.iter().map(|(w, s)| (w.as_str(), s))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all per-ward bill counts, i.e. the number of input records.
    pub fn total_bills(&self) -> u64 {
        self.entries.iter().map(|(_, s)| s.count).sum()
    }

    /// Sum of all per-ward amount totals.
    pub fn total_amount(&self) -> f64 {
        self.entries.iter().map(|(_, s)| s.total_amount).sum()
    }
}

impl Serialize for WardReport {
    /// Serializes as a JSON object keyed by ward, in first-seen order.
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (ward, summary) in &self.entries {
            map.serialize_entry(ward, summary)?;
        }
        map.end()
    }
}
