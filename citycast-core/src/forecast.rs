//! Day-by-day grouping of the 3-hour forecast.
//!
//! Entries are bucketed by their UTC calendar date. Each day takes its min/max
//! from the first entry of the bucket rather than scanning the whole day, and
//! its condition from the fifth entry (around midday for a full day) when the
//! bucket has one, else from the first.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::model::{DailyForecastSummary, ForecastEntry};

pub const MAX_DAYS: usize = 5;

const REPRESENTATIVE_INDEX: usize = 4;

pub fn summarize_daily(entries: &[ForecastEntry]) -> Vec<DailyForecastSummary> {
    let mut buckets: BTreeMap<NaiveDate, Vec<&ForecastEntry>> = BTreeMap::new();
    for entry in entries {
        buckets
            .entry(entry.timestamp.date_naive())
            .or_default()
            .push(entry);
    }

    buckets
        .into_iter()
        .take(MAX_DAYS)
        .filter_map(|(date, day)| {
            let first = day.first()?;
            let representative = day.get(REPRESENTATIVE_INDEX).unwrap_or(first);
            Some(DailyForecastSummary {
                date,
                temp_min_c: first.temp_min_c,
                temp_max_c: first.temp_max_c,
                condition: representative.condition.clone(),
            })
        })
        .collect()
}
