//! Full recomputation pipeline: range filter, aggregates and RFM summary

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::aggregate::{
    self, AggregateResult, HourDayType, HourExtremes, RiderSplit, EXTREMES_LEN,
};
use crate::data::{DailyRecord, HourlyRecord};
use crate::filter::{filter_by_date, DateRange};
use crate::rfm::{self, RfmAverages, RfmRow, RfmTable};

/// Which input table a warning refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    Hourly,
    Daily,
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableKind::Hourly => write!(f, "hourly"),
            TableKind::Daily => write!(f, "daily"),
        }
    }
}

/// Non-fatal conditions noticed while building a report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PipelineWarning {
    /// The filter window matched no records of this table
    EmptyResult { table: TableKind },
}

impl fmt::Display for PipelineWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineWarning::EmptyResult { table } => {
                write!(f, "no {} records in the selected range", table)
            }
        }
    }
}

/// The three RFM rankings shown next to each other
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RfmRankings {
    pub by_recency: Vec<RfmRow>,
    pub by_frequency: Vec<RfmRow>,
    pub by_monetary: Vec<RfmRow>,
}

impl RfmRankings {
    pub fn from_table(table: &RfmTable, n: usize) -> Self {
        Self {
            by_recency: table.by_recency(n),
            by_frequency: table.by_frequency(n),
            by_monetary: table.by_monetary(n),
        }
    }
}

/// Every aggregate derived from one date range, ready for rendering
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardReport {
    pub range: DateRange,
    pub hourly_rows: usize,
    pub daily_rows: usize,
    pub by_season: AggregateResult<u32, u64>,
    pub by_month: AggregateResult<u32, u64>,
    pub by_hour: AggregateResult<u32, u64>,
    pub hour_extremes: HourExtremes,
    pub by_hour_and_day_type: AggregateResult<HourDayType, RiderSplit>,
    pub rfm: RfmTable,
    pub rfm_rankings: RfmRankings,
    pub rfm_averages: Option<RfmAverages>,
    pub warnings: Vec<PipelineWarning>,
}

/// Filter both tables to `range` and derive every aggregate from the filtered views.
///
/// Extremes and rankings are cut to the default five rows; see [`build_report_with_top`].
pub fn build_report(
    hourly: &[HourlyRecord],
    daily: &[DailyRecord],
    range: DateRange,
) -> DashboardReport {
    build_report_with_top(hourly, daily, range, EXTREMES_LEN)
}

/// Like [`build_report`], with best/worst hours and RFM rankings cut to `top` rows
#[instrument(skip_all, fields(range = %range, top = top))]
pub fn build_report_with_top(
    hourly: &[HourlyRecord],
    daily: &[DailyRecord],
    range: DateRange,
    top: usize,
) -> DashboardReport {
    let hourly_view = filter_by_date(hourly, &range);
    let daily_view = filter_by_date(daily, &range);

    let mut warnings = Vec::new();
    if hourly_view.is_empty() {
        warnings.push(PipelineWarning::EmptyResult {
            table: TableKind::Hourly,
        });
    }
    if daily_view.is_empty() {
        warnings.push(PipelineWarning::EmptyResult {
            table: TableKind::Daily,
        });
    }
    for warning in &warnings {
        warn!("{}", warning);
    }

    let by_hour = aggregate::by_hour(&hourly_view);
    let hour_extremes = HourExtremes::from_ranked(&by_hour, top);
    let rfm = rfm::summarize(&daily_view);

    let report = DashboardReport {
        range,
        hourly_rows: hourly_view.len(),
        daily_rows: daily_view.len(),
        by_season: aggregate::by_season(&daily_view),
        by_month: aggregate::by_month(&daily_view),
        by_hour,
        hour_extremes,
        by_hour_and_day_type: aggregate::by_hour_and_day_type(&hourly_view),
        rfm_rankings: RfmRankings::from_table(&rfm, top),
        rfm_averages: rfm.averages(),
        rfm,
        warnings,
    };

    info!(
        hourly_rows = report.hourly_rows,
        daily_rows = report.daily_rows,
        weekdays = report.rfm.len(),
        "Built dashboard report"
    );
    report
}

/// Loaded tables plus reports memoized by date range
#[derive(Debug)]
pub struct Dashboard {
    hourly: Vec<HourlyRecord>,
    daily: Vec<DailyRecord>,
    top: usize,
    cache: HashMap<DateRange, DashboardReport>,
}

impl Dashboard {
    pub fn new(hourly: Vec<HourlyRecord>, daily: Vec<DailyRecord>) -> Self {
        Self {
            hourly,
            daily,
            top: EXTREMES_LEN,
            cache: HashMap::new(),
        }
    }

    /// Cut best/worst hours and RFM rankings to `top` rows. Drops memoized reports.
    pub fn with_top(mut self, top: usize) -> Self {
        self.top = top;
        self.cache.clear();
        self
    }

    pub fn top(&self) -> usize {
        self.top
    }

    pub fn hourly(&self) -> &[HourlyRecord] {
        &self.hourly
    }

    pub fn daily(&self) -> &[DailyRecord] {
        &self.daily
    }

    /// Date span of the hourly table, the default selection window
    pub fn default_range(&self) -> Option<DateRange> {
        DateRange::spanning(&self.hourly)
    }

    /// Report for `range`, computed on first request and reused afterwards
    pub fn report(&mut self, range: DateRange) -> &DashboardReport {
        if self.cache.contains_key(&range) {
            debug!(range = %range, "Reusing memoized report");
        }
        self.cache
            .entry(range)
            .or_insert_with(|| build_report_with_top(&self.hourly, &self.daily, range, self.top))
    }

    pub fn cached_reports(&self) -> usize {
        self.cache.len()
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn tables() -> (Vec<HourlyRecord>, Vec<DailyRecord>) {
        let hourly = vec![
            HourlyRecord {
                date: day(2011, 1, 1),
                hour: 0,
                workingday: false,
                casual: 3,
                registered: 13,
                cnt: 16,
            },
            HourlyRecord {
                date: day(2011, 1, 3),
                hour: 8,
                workingday: true,
                casual: 2,
                registered: 90,
                cnt: 92,
            },
        ];
        let daily = vec![
            DailyRecord {
                instant: 1,
                date: day(2011, 1, 1),
                season: 1,
                month: 1,
                weekday: 6,
                cnt: 985,
            },
            DailyRecord {
                instant: 3,
                date: day(2011, 1, 3),
                season: 1,
                month: 1,
                weekday: 1,
                cnt: 1349,
            },
        ];
        (hourly, daily)
    }

    #[test]
    fn test_build_report() {
        let (hourly, daily) = tables();
        let report = build_report(&hourly, &daily, DateRange::new(day(2011, 1, 1), day(2011, 1, 3)));

        assert_eq!(report.hourly_rows, 2);
        assert_eq!(report.daily_rows, 2);
        assert_eq!(report.by_season.len(), 1);
        assert_eq!(report.by_season[0].measure, 2334);
        assert_eq!(report.by_hour[0].key, 8);
        assert_eq!(report.hour_extremes.worst[0].key, 0);
        assert_eq!(report.rfm.get(6).map(|r| r.recency), Some(2));
        assert_eq!(report.rfm_rankings.by_monetary[0].weekday, 1);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_empty_window_warns() {
        let (hourly, daily) = tables();
        let report = build_report(&hourly, &daily, DateRange::new(day(2012, 1, 1), day(2012, 1, 31)));

        assert!(report.by_month.is_empty());
        assert!(report.rfm.is_empty());
        assert_eq!(report.rfm_averages, None);
        assert_eq!(
            report.warnings,
            vec![
                PipelineWarning::EmptyResult {
                    table: TableKind::Hourly
                },
                PipelineWarning::EmptyResult {
                    table: TableKind::Daily
                },
            ]
        );
    }

    #[test]
    fn test_dashboard_memoizes_by_range() {
        let (hourly, daily) = tables();
        let mut dashboard = Dashboard::new(hourly, daily);
        let range = dashboard.default_range().unwrap();
        assert_eq!(range, DateRange::new(day(2011, 1, 1), day(2011, 1, 3)));

        let first = dashboard.report(range).clone();
        let second = dashboard.report(range).clone();
        assert_eq!(first, second);
        assert_eq!(dashboard.cached_reports(), 1);

        dashboard.report(DateRange::new(day(2011, 1, 1), day(2011, 1, 1)));
        assert_eq!(dashboard.cached_reports(), 2);

        dashboard.clear_cache();
        assert_eq!(dashboard.cached_reports(), 0);
    }

    #[test]
    fn test_top_limits_extremes_and_rankings() {
        let (mut hourly, mut daily) = tables();
        for (hour, cnt) in [(5, 40), (12, 7), (17, 120)] {
            hourly.push(HourlyRecord {
                date: day(2011, 1, 2),
                hour,
                workingday: false,
                casual: 0,
                registered: cnt,
                cnt,
            });
        }
        daily.push(DailyRecord {
            instant: 2,
            date: day(2011, 1, 2),
            season: 1,
            month: 1,
            weekday: 0,
            cnt: 801,
        });
        let range = DateRange::new(day(2011, 1, 1), day(2011, 1, 3));

        let report = build_report_with_top(&hourly, &daily, range, 2);
        let best: Vec<u32> = report.hour_extremes.best.iter().map(|r| r.key).collect();
        let worst: Vec<u32> = report.hour_extremes.worst.iter().map(|r| r.key).collect();
        assert_eq!(best, vec![17, 8]);
        assert_eq!(worst, vec![12, 0]);
        assert_eq!(report.by_hour.len(), 5);
        assert_eq!(report.rfm_rankings.by_recency.len(), 2);
        assert_eq!(report.rfm_rankings.by_frequency.len(), 2);
        let monetary: Vec<u32> = report.rfm_rankings.by_monetary.iter().map(|r| r.weekday).collect();
        assert_eq!(monetary, vec![1, 6]);

        let mut dashboard = Dashboard::new(hourly.clone(), daily.clone()).with_top(2);
        assert_eq!(dashboard.top(), 2);
        assert_eq!(dashboard.report(range), &report);

        let defaults = build_report(&hourly, &daily, range);
        assert_eq!(defaults.hour_extremes.best.len(), 5);
        assert_eq!(defaults.rfm_rankings.by_recency.len(), 3);
    }

    #[test]
    fn test_warning_message() {
        let warning = PipelineWarning::EmptyResult {
            table: TableKind::Daily,
        };
        assert_eq!(warning.to_string(), "no daily records in the selected range");
    }
}
