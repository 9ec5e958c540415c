//! Recency / frequency / monetary summary per weekday

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::Serialize;

use crate::aggregate::{add_count, group_and_reduce, key_ascending};
use crate::data::DailyRecord;

/// Number of weekdays shown in each ranking
pub const RANKING_LEN: usize = 5;

/// RFM metrics of one weekday
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RfmRow {
    pub weekday: u32,
    /// Days between the window's latest date and this weekday's latest date
    pub recency: i64,
    /// Distinct daily records (by `instant`)
    pub frequency: u64,
    /// Total rentals
    pub monetary: u64,
}

/// Headline averages over all weekday rows
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RfmAverages {
    /// Mean recency in days, one decimal
    pub recency: f64,
    /// Mean frequency, two decimals
    pub frequency: f64,
    pub monetary: f64,
}

/// Per-weekday RFM rows ordered by weekday
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RfmTable {
    /// Latest date of the summarized table; recency is measured from here
    pub reference_date: Option<NaiveDate>,
    rows: Vec<RfmRow>,
}

#[derive(Default)]
struct WeekdayActivity {
    latest: Option<NaiveDate>,
    instants: BTreeSet<i64>,
    monetary: u64,
}

/// Whole days from `latest` to `reference`
pub fn recency_days(reference: NaiveDate, latest: NaiveDate) -> i64 {
    (reference - latest).num_days()
}

/// Summarize a (filtered) daily table into one RFM row per weekday present.
///
/// The reference date is the latest date of `daily` itself, so narrowing the
/// window shifts every weekday's recency.
pub fn summarize(daily: &[DailyRecord]) -> RfmTable {
    let Some(reference) = daily.iter().map(|r| r.date).max() else {
        return RfmTable::default();
    };

    let groups = group_and_reduce(
        daily,
        |r| r.weekday,
        |activity: &mut WeekdayActivity, r| {
            activity.latest = activity.latest.max(Some(r.date));
            activity.instants.insert(r.instant);
            add_count(&mut activity.monetary, r.cnt);
        },
        key_ascending,
    );

    let rows = groups
        .into_iter()
        .filter_map(|group| {
            let latest = group.measure.latest?;
            Some(RfmRow {
                weekday: group.key,
                recency: recency_days(reference, latest),
                frequency: group.measure.instants.len() as u64,
                monetary: group.measure.monetary,
            })
        })
        .collect();

    RfmTable {
        reference_date: Some(reference),
        rows,
    }
}

impl RfmTable {
    pub fn rows(&self) -> &[RfmRow] {
        &self.rows
    }

    pub fn get(&self, weekday: u32) -> Option<&RfmRow> {
        self.rows.iter().find(|row| row.weekday == weekday)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Most recent weekdays first
    pub fn by_recency(&self, n: usize) -> Vec<RfmRow> {
        self.ranked(n, |a, b| a.recency.cmp(&b.recency))
    }

    /// Most frequent weekdays first
    pub fn by_frequency(&self, n: usize) -> Vec<RfmRow> {
        self.ranked(n, |a, b| b.frequency.cmp(&a.frequency))
    }

    /// Highest-total weekdays first
    pub fn by_monetary(&self, n: usize) -> Vec<RfmRow> {
        self.ranked(n, |a, b| b.monetary.cmp(&a.monetary))
    }

    // rows are weekday-ascending, so the stable sort breaks ties by weekday
    fn ranked<F>(&self, n: usize, compare: F) -> Vec<RfmRow>
    where
        F: Fn(&RfmRow, &RfmRow) -> std::cmp::Ordering,
    {
        let mut rows = self.rows.clone();
        rows.sort_by(compare);
        rows.truncate(n);
        rows
    }

    pub fn averages(&self) -> Option<RfmAverages> {
        if self.rows.is_empty() {
            return None;
        }
        let n = self.rows.len() as f64;
        let mean = |f: fn(&RfmRow) -> f64| self.rows.iter().map(f).sum::<f64>() / n;

        Some(RfmAverages {
            recency: round_to(mean(|r| r.recency as f64), 1),
            frequency: round_to(mean(|r| r.frequency as f64), 2),
            monetary: mean(|r| r.monetary as f64),
        })
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Short weekday name for day numbers 0 (Sunday) to 6; other values print as numbers
pub fn weekday_label(weekday: u32) -> String {
    match weekday {
        0 => "Sun".to_string(),
        1 => "Mon".to_string(),
        2 => "Tue".to_string(),
        3 => "Wed".to_string(),
        4 => "Thu".to_string(),
        5 => "Fri".to_string(),
        6 => "Sat".to_string(),
        other => other.to_string(),
    }
}
