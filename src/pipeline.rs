//! Pipeline stages after cleaning, and the working set they produce.
//!
//! `WorkingSet::build` runs Loader → Cleaner → WindowFilter →
//! LatestPerEntityReducer once, eagerly. The result is never mutated; a
//! refresh builds a new set and swaps it in through [`SharedWorkingSet`].

use crate::cleaner::{clean, CleanReport};
use crate::error::Result;
use crate::loader::load_raw;
use crate::types::{RawRow, Record};
use chrono::{Days, NaiveDate};
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{info, warn};

/// Keep records collected within `days_back` days of the newest date,
/// both ends inclusive. An empty input yields an empty output.
pub fn filter_window(records: &[Record], days_back: u64) -> Vec<Record> {
    let Some(max_date) = records.iter().map(|r| r.collected_date).max() else {
        return Vec::new();
    };
    let min_date = window_start(max_date, days_back);
    info!(
        "Filtering data from {} to {}",
        min_date.format("%d/%m/%Y"),
        max_date.format("%d/%m/%Y")
    );
    records
        .iter()
        .filter(|r| r.collected_date >= min_date && r.collected_date <= max_date)
        .cloned()
        .collect()
}

fn window_start(max_date: NaiveDate, days_back: u64) -> NaiveDate {
    max_date
        .checked_sub_days(Days::new(days_back))
        .unwrap_or(NaiveDate::MIN)
}

/// One record per `(municipality, region, seller)`: the most recent one.
///
/// Records are stably sorted by date ascending and the last of each group is
/// kept, so on a date tie the record that came later in the input wins. The
/// output stays in ascending date order.
pub fn latest_per_entity(records: &[Record]) -> Vec<Record> {
    let mut sorted: Vec<&Record> = records.iter().collect();
    sorted.sort_by_key(|r| r.collected_date);

    let mut last_index: HashMap<(&str, &str, &str), usize> = HashMap::new();
    for (i, r) in sorted.iter().enumerate() {
        last_index.insert(
            (r.municipality.as_str(), r.region.as_str(), r.seller.as_str()),
            i,
        );
    }

    let latest: Vec<Record> = sorted
        .iter()
        .enumerate()
        .filter(|(i, r)| {
            last_index.get(&(r.municipality.as_str(), r.region.as_str(), r.seller.as_str()))
                == Some(i)
        })
        .map(|(_, r)| (*r).clone())
        .collect();
    info!("Latest prices kept for {} records", latest.len());
    latest
}

/// Row counts for each pipeline stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PipelineReport {
    pub clean: CleanReport,
    pub windowed: usize,
    pub reduced: usize,
    pub window_start: Option<NaiveDate>,
    pub window_end: Option<NaiveDate>,
}

/// The deduplicated, windowed, latest-per-entity records every query reads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkingSet {
    records: Vec<Record>,
}

impl WorkingSet {
    /// Load `path` and run every stage.
    pub fn build(path: &Path, days_back: u64) -> Result<(Self, PipelineReport)> {
        let rows = load_raw(path)?;
        Ok(Self::from_raw(&rows, days_back))
    }

    /// Run the post-load stages over rows that were already read.
    pub fn from_raw(rows: &[RawRow], days_back: u64) -> (Self, PipelineReport) {
        let (cleaned, clean_report) = clean(rows);
        Self::from_cleaned(cleaned, clean_report, days_back)
    }

    fn from_cleaned(
        cleaned: Vec<Record>,
        clean_report: CleanReport,
        days_back: u64,
    ) -> (Self, PipelineReport) {
        if cleaned.is_empty() {
            warn!("No valid records after cleaning");
        }
        let window_end = cleaned.iter().map(|r| r.collected_date).max();
        let windowed = filter_window(&cleaned, days_back);
        let records = latest_per_entity(&windowed);
        let report = PipelineReport {
            clean: clean_report,
            windowed: windowed.len(),
            reduced: records.len(),
            window_start: window_end.map(|d| window_start(d, days_back)),
            window_end,
        };
        (Self { records }, report)
    }

    /// Wrap already-final records, skipping every stage.
    pub fn from_records(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Working set shared between request handlers. Readers clone an `Arc`
/// snapshot; `refresh` rebuilds from the source and swaps the pointer.
#[derive(Debug, Default)]
pub struct SharedWorkingSet {
    current: RwLock<Arc<WorkingSet>>,
}

impl SharedWorkingSet {
    pub fn new(set: WorkingSet) -> Self {
        Self {
            current: RwLock::new(Arc::new(set)),
        }
    }

    pub fn snapshot(&self) -> Arc<WorkingSet> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    pub fn replace(&self, set: WorkingSet) {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::new(set);
    }

    /// Rebuild from `path`. On failure the previous snapshot stays in place.
    pub fn refresh(&self, path: &Path, days_back: u64) -> Result<PipelineReport> {
        let (set, report) = WorkingSet::build(path, days_back)?;
        self.replace(set);
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Address;
    use rust_decimal::Decimal;

    fn rec(date: (i32, u32, u32), city: &str, region: &str, seller: &str, price: f64) -> Record {
        Record {
            collected_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            region: region.into(),
            municipality: city.into(),
            seller: seller.into(),
            seller_tax_id: String::new(),
            address: Address::default(),
            price: Decimal::try_from(price).unwrap(),
            brand: String::new(),
            product: "GLP".into(),
        }
    }

    #[test]
    fn window_is_inclusive_on_both_ends() {
        let records = vec![
            rec((2025, 5, 1), "A", "SP", "S", 1.0),
            rec((2025, 5, 2), "A", "SP", "S", 2.0),
            rec((2025, 6, 1), "A", "SP", "S", 3.0),
        ];
        let out = filter_window(&records, 30);
        let prices: Vec<Decimal> = out.iter().map(|r| r.price).collect();
        assert_eq!(prices, vec![Decimal::from(2), Decimal::from(3)]);
    }

    #[test]
    fn zero_days_keeps_only_newest_date() {
        let records = vec![
            rec((2025, 5, 31), "A", "SP", "S", 1.0),
            rec((2025, 6, 1), "A", "SP", "S", 2.0),
            rec((2025, 6, 1), "B", "SP", "S", 3.0),
        ];
        assert_eq!(filter_window(&records, 0).len(), 2);
    }

    #[test]
    fn window_of_empty_set_is_empty() {
        assert!(filter_window(&[], 30).is_empty());
    }

    #[test]
    fn window_is_idempotent() {
        let records = vec![
            rec((2025, 4, 1), "A", "SP", "S", 1.0),
            rec((2025, 5, 20), "A", "SP", "S", 2.0),
            rec((2025, 6, 1), "B", "RJ", "T", 3.0),
        ];
        let once = filter_window(&records, 14);
        let twice = filter_window(&once, 14);
        assert_eq!(once, twice);
    }

    #[test]
    fn reducer_keeps_most_recent_per_entity() {
        let records = vec![
            rec((2025, 6, 3), "A", "SP", "S", 3.0),
            rec((2025, 6, 1), "A", "SP", "S", 1.0),
            rec((2025, 6, 2), "B", "SP", "S", 2.0),
        ];
        let out = latest_per_entity(&records);
        assert_eq!(out.len(), 2);
        // ascending date order
        assert_eq!(out[0].municipality, "B");
        assert_eq!(out[1].price, Decimal::from(3));
    }

    #[test]
    fn reducer_tie_keeps_last_in_input_order() {
        let records = vec![
            rec((2025, 6, 1), "A", "SP", "S", 1.0),
            rec((2025, 6, 1), "A", "SP", "S", 2.0),
        ];
        let out = latest_per_entity(&records);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].price, Decimal::from(2));
    }

    #[test]
    fn different_sellers_are_different_entities() {
        let records = vec![
            rec((2025, 6, 1), "A", "SP", "S1", 1.0),
            rec((2025, 6, 1), "A", "SP", "S2", 1.0),
        ];
        assert_eq!(latest_per_entity(&records).len(), 2);
    }

    #[test]
    fn reducer_output_has_one_record_per_key() {
        let records = vec![
            rec((2025, 6, 1), "A", "SP", "S", 1.0),
            rec((2025, 6, 2), "A", "RJ", "S", 1.0),
            rec((2025, 6, 3), "A", "SP", "S", 1.0),
            rec((2025, 6, 4), "A", "RJ", "S", 1.0),
            rec((2025, 6, 5), "B", "SP", "S", 1.0),
        ];
        let out = latest_per_entity(&records);
        let mut keys: Vec<_> = out
            .iter()
            .map(|r| (r.municipality.clone(), r.region.clone(), r.seller.clone()))
            .collect();
        let n = keys.len();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), n);
        assert_eq!(n, 3);
    }

    #[test]
    fn shared_set_swaps_snapshots() {
        let shared = SharedWorkingSet::new(WorkingSet::default());
        let before = shared.snapshot();
        shared.replace(WorkingSet::from_records(vec![rec((2025, 6, 1), "A", "SP", "S", 1.0)]));
        assert!(before.is_empty());
        assert_eq!(shared.snapshot().len(), 1);
    }

    #[test]
    fn failed_refresh_keeps_previous_snapshot() {
        let shared = SharedWorkingSet::new(WorkingSet::from_records(vec![rec(
            (2025, 6, 1),
            "A",
            "SP",
            "S",
            1.0,
        )]));
        assert!(shared.refresh(Path::new("/nonexistent/glp.csv"), 30).is_err());
        assert_eq!(shared.snapshot().len(), 1);
    }
}
