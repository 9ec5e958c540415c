//! Bike-sharing dashboard: descriptive aggregates over hourly and daily rental counts
//!
//! This library filters both tables to an inclusive date range, groups them by
//! season, month, hour and hour x day type, and summarizes each weekday with
//! recency, frequency and monetary (RFM) metrics.

pub mod aggregate;
pub mod cli;
pub mod dashboard;
pub mod data;
pub mod error;
pub mod filter;
pub mod logging;
pub mod rfm;
pub mod viz;

// Re-export public items for easier access
pub use aggregate::{
    by_hour, by_hour_and_day_type, by_month, by_season, group_and_reduce, AggregateResult,
    AggregateRow, HourExtremes, RiderSplit,
};
pub use cli::Args;
pub use dashboard::{build_report, build_report_with_top, Dashboard, DashboardReport, PipelineWarning};
pub use data::{load_daily_csv, load_hourly_csv, DailyRecord, Dated, HourlyRecord};
pub use error::{DashboardError, Result};
pub use filter::{filter_by_date, DateRange};
pub use rfm::{summarize, RfmRow, RfmTable};
