//! Grouped aggregation over filtered rental tables
//!
//! Every aggregate goes through [`group_and_reduce`], so grouping and
//! tie-breaking behave the same way for all of them: groups are collected in
//! ascending key order and then stably sorted by the requested ordering, which
//! leaves equal rows in ascending key order.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::Serialize;

use crate::data::{DailyRecord, HourlyRecord};

/// Number of rows in the best/worst hour views
pub const EXTREMES_LEN: usize = 5;

/// One grouped row: a key and its reduced measure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregateRow<K, M> {
    pub key: K,
    pub measure: M,
}

impl<K, M> AggregateRow<K, M> {
    pub fn new(key: K, measure: M) -> Self {
        Self { key, measure }
    }
}

/// Ordered rows of one aggregate
pub type AggregateResult<K, M> = Vec<AggregateRow<K, M>>;

/// Casual and registered totals for one (hour, day type) group
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RiderSplit {
    pub casual: u64,
    pub registered: u64,
}

/// Key of the hour x day-type aggregate: `(hour, workingday)`
pub type HourDayType = (u32, bool);

/// Best and worst performing hours, both cut from one ranked result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HourExtremes {
    /// Highest totals first
    pub best: AggregateResult<u32, u64>,
    /// Lowest totals first
    pub worst: AggregateResult<u32, u64>,
}

impl HourExtremes {
    /// Cut the `n` highest and `n` lowest rows from a result ranked by descending total.
    ///
    /// Both views break ties by ascending hour.
    pub fn from_ranked(ranked: &AggregateResult<u32, u64>, n: usize) -> Self {
        let mut worst = ranked.clone();
        worst.sort_by(|a, b| a.measure.cmp(&b.measure).then(a.key.cmp(&b.key)));
        worst.truncate(n);

        Self {
            best: ranked.iter().take(n).cloned().collect(),
            worst,
        }
    }
}

/// Group `records` by `key_fn`, fold each group with `reduce_fn`, then order rows with `order_fn`.
///
/// Keys are opaque: out-of-domain values form their own groups.
pub fn group_and_reduce<R, K, M, KF, RF, OF>(
    records: &[R],
    key_fn: KF,
    reduce_fn: RF,
    order_fn: OF,
) -> AggregateResult<K, M>
where
    K: Ord,
    M: Default,
    KF: Fn(&R) -> K,
    RF: Fn(&mut M, &R),
    OF: Fn(&AggregateRow<K, M>, &AggregateRow<K, M>) -> Ordering,
{
    let mut groups: BTreeMap<K, M> = BTreeMap::new();
    for record in records {
        reduce_fn(groups.entry(key_fn(record)).or_default(), record);
    }

    let mut rows: AggregateResult<K, M> = groups
        .into_iter()
        .map(|(key, measure)| AggregateRow::new(key, measure))
        .collect();
    rows.sort_by(order_fn);
    rows
}

/// Larger measure first
pub fn measure_descending<K, M: Ord>(a: &AggregateRow<K, M>, b: &AggregateRow<K, M>) -> Ordering {
    b.measure.cmp(&a.measure)
}

/// Add a count to a running total, pinning at `u64::MAX` instead of overflowing
pub fn add_count(total: &mut u64, count: u64) {
    *total = total.saturating_add(count);
}

/// Smaller key first
pub fn key_ascending<K: Ord, M>(a: &AggregateRow<K, M>, b: &AggregateRow<K, M>) -> Ordering {
    a.key.cmp(&b.key)
}

/// Total rentals per season, largest first
pub fn by_season(daily: &[DailyRecord]) -> AggregateResult<u32, u64> {
    group_and_reduce(daily, |r| r.season, |sum, r| add_count(sum, r.cnt), measure_descending)
}

/// Total rentals per month, largest first
pub fn by_month(daily: &[DailyRecord]) -> AggregateResult<u32, u64> {
    group_and_reduce(daily, |r| r.month, |sum, r| add_count(sum, r.cnt), measure_descending)
}

/// Total rentals per hour of day, largest first
pub fn by_hour(hourly: &[HourlyRecord]) -> AggregateResult<u32, u64> {
    group_and_reduce(hourly, |r| r.hour, |sum, r| add_count(sum, r.cnt), measure_descending)
}

/// Casual and registered totals per (hour, workingday), ordered by hour then day type
pub fn by_hour_and_day_type(hourly: &[HourlyRecord]) -> AggregateResult<HourDayType, RiderSplit> {
    group_and_reduce(
        hourly,
        |r| (r.hour, r.workingday),
        |split: &mut RiderSplit, r| {
            add_count(&mut split.casual, r.casual);
            add_count(&mut split.registered, r.registered);
        },
        key_ascending,
    )
}

/// Sum of the measure column of a count aggregate
pub fn total_measure<K>(rows: &AggregateResult<K, u64>) -> u64 {
    rows.iter().fold(0, |total, row| total.saturating_add(row.measure))
}
