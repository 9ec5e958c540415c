//! Inclusive date-range filtering over rental tables

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::data::{parse_date, Dated};
use crate::error::{DashboardError, Result};

/// Closed calendar interval `[start, end]`.
///
/// An inverted range (`start > end`) is representable and simply matches no
/// records; use [`DateRange::ensure_ordered`] where an inverted request must
/// be rejected instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Parse `YYYY-MM-DD` bounds; malformed input fails with `InvalidRange`
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        let start_date = parse_date(start).ok_or_else(|| {
            DashboardError::invalid_range(format!("start date '{}' is not YYYY-MM-DD", start))
        })?;
        let end_date = parse_date(end).ok_or_else(|| {
            DashboardError::invalid_range(format!("end date '{}' is not YYYY-MM-DD", end))
        })?;

        Ok(Self::new(start_date, end_date))
    }

    /// Smallest range covering every record, `None` for an empty table
    pub fn spanning<R: Dated>(records: &[R]) -> Option<Self> {
        let start = records.iter().map(Dated::date).min()?;
        let end = records.iter().map(Dated::date).max()?;
        Some(Self::new(start, end))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn is_inverted(&self) -> bool {
        self.start > self.end
    }

    /// Reject an inverted range with `InvalidRange`
    pub fn ensure_ordered(self) -> Result<Self> {
        if self.is_inverted() {
            return Err(DashboardError::invalid_range(format!(
                "start {} is after end {}",
                self.start, self.end
            )));
        }
        Ok(self)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// Records whose date lies in `range`, in source order
pub fn filter_by_date<R: Dated + Clone>(records: &[R], range: &DateRange) -> Vec<R> {
    if range.is_inverted() {
        return Vec::new();
    }

    records
        .iter()
        .filter(|record| range.contains(record.date()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DailyRecord;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn daily(instant: i64, date: NaiveDate) -> DailyRecord {
        DailyRecord {
            instant,
            date,
            season: 1,
            month: 1,
            weekday: 0,
            cnt: 10,
        }
    }

    fn table() -> Vec<DailyRecord> {
        vec![
            daily(3, day(2011, 1, 3)),
            daily(1, day(2011, 1, 1)),
            daily(5, day(2011, 1, 5)),
            daily(2, day(2011, 1, 2)),
        ]
    }

    #[test]
    fn test_filter_is_inclusive_and_keeps_order() {
        let range = DateRange::new(day(2011, 1, 2), day(2011, 1, 3));
        let filtered = filter_by_date(&table(), &range);

        let instants: Vec<i64> = filtered.iter().map(|r| r.instant).collect();
        assert_eq!(instants, vec![3, 2]);
    }

    #[test]
    fn test_single_day_range() {
        let range = DateRange::new(day(2011, 1, 5), day(2011, 1, 5));
        let filtered = filter_by_date(&table(), &range);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].instant, 5);
    }

    #[test]
    fn test_inverted_range_is_empty() {
        let range = DateRange::new(day(2011, 1, 5), day(2011, 1, 1));
        assert!(range.is_inverted());
        assert!(filter_by_date(&table(), &range).is_empty());
        assert!(range.ensure_ordered().is_err());
    }

    #[test]
    fn test_filter_does_not_touch_source() {
        let source = table();
        let range = DateRange::new(day(2011, 1, 1), day(2011, 1, 1));
        let _ = filter_by_date(&source, &range);
        assert_eq!(source, table());
    }

    #[test]
    fn test_parse_range() {
        let range = DateRange::parse("2011-01-01", "2012-12-31").unwrap();
        assert_eq!(range.start, day(2011, 1, 1));
        assert_eq!(range.end, day(2012, 12, 31));

        assert!(matches!(
            DateRange::parse("2011-02-30", "2012-12-31"),
            Err(DashboardError::InvalidRange { .. })
        ));
        assert!(DateRange::parse("2011-01-01", "yesterday").is_err());
    }

    #[test]
    fn test_spanning() {
        let span = DateRange::spanning(&table()).unwrap();
        assert_eq!(span, DateRange::new(day(2011, 1, 1), day(2011, 1, 5)));

        let empty: Vec<DailyRecord> = Vec::new();
        assert_eq!(DateRange::spanning(&empty), None);
    }
}
