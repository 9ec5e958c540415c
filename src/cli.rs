//! Command-line interface definitions and argument parsing

use std::path::PathBuf;

use clap::Parser;

use crate::error::{DashboardError, Result};
use crate::filter::DateRange;

/// Bike-sharing dashboard: seasonal, monthly and hourly totals plus RFM per weekday
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the hourly CSV file
    #[arg(long, default_value = "hour_data.csv")]
    pub hourly: PathBuf,

    /// Path to the daily CSV file
    #[arg(long, default_value = "day_data.csv")]
    pub daily: PathBuf,

    /// First day of the window (YYYY-MM-DD); defaults to the first day in the hourly data
    #[arg(short, long)]
    pub start: Option<String>,

    /// Last day of the window (YYYY-MM-DD); defaults to the last day in the hourly data
    #[arg(short, long)]
    pub end: Option<String>,

    /// Rows in the best/worst hour views and in each RFM ranking
    #[arg(long, default_value = "5")]
    pub top: usize,

    /// Directory for the rendered SVG charts
    #[arg(short, long, default_value = "dashboard")]
    pub output_dir: PathBuf,

    /// Print the full report as JSON instead of the text summary
    #[arg(long)]
    pub json: bool,

    /// Skip chart rendering
    #[arg(long)]
    pub no_charts: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Resolve the requested window against the data's own span.
    ///
    /// Missing bounds fall back to `default_range`. Malformed or inverted
    /// bounds fail with `InvalidRange` before anything is computed.
    pub fn date_range(&self, default_range: Option<DateRange>) -> Result<DateRange> {
        let start = match (&self.start, default_range) {
            (Some(start), _) => start.clone(),
            (None, Some(range)) => range.start.to_string(),
            (None, None) => {
                return Err(DashboardError::invalid_range(
                    "no start date given and the hourly table is empty",
                ))
            }
        };
        let end = match (&self.end, default_range) {
            (Some(end), _) => end.clone(),
            (None, Some(range)) => range.end.to_string(),
            (None, None) => {
                return Err(DashboardError::invalid_range(
                    "no end date given and the hourly table is empty",
                ))
            }
        };

        DateRange::parse(&start, &end)?.ensure_ordered()
    }

    /// Log filter directive for the chosen verbosity
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn args(start: Option<&str>, end: Option<&str>) -> Args {
        Args {
            hourly: PathBuf::from("hour.csv"),
            daily: PathBuf::from("day.csv"),
            start: start.map(str::to_string),
            end: end.map(str::to_string),
            top: 5,
            output_dir: PathBuf::from("out"),
            json: false,
            no_charts: false,
            verbose: false,
        }
    }

    fn span() -> Option<DateRange> {
        Some(DateRange::new(
            NaiveDate::from_ymd_opt(2011, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2012, 12, 31).unwrap(),
        ))
    }

    #[test]
    fn test_date_range_defaults_to_span() {
        let range = args(None, None).date_range(span()).unwrap();
        assert_eq!(range, span().unwrap());

        let range = args(Some("2012-06-01"), None).date_range(span()).unwrap();
        assert_eq!(range.start, NaiveDate::from_ymd_opt(2012, 6, 1).unwrap());
        assert_eq!(range.end, NaiveDate::from_ymd_opt(2012, 12, 31).unwrap());
    }

    #[test]
    fn test_date_range_rejects_bad_input() {
        assert!(matches!(
            args(Some("2012-13-01"), None).date_range(span()),
            Err(DashboardError::InvalidRange { .. })
        ));
        assert!(matches!(
            args(Some("2012-06-01"), Some("2012-05-01")).date_range(span()),
            Err(DashboardError::InvalidRange { .. })
        ));
        assert!(args(None, Some("2012-05-01")).date_range(None).is_err());
    }

    #[test]
    fn test_parse_command_line() {
        let parsed = Args::try_parse_from([
            "bikeshare-dashboard",
            "--hourly",
            "h.csv",
            "--start",
            "2011-01-01",
            "--json",
        ])
        .unwrap();

        assert_eq!(parsed.hourly, PathBuf::from("h.csv"));
        assert_eq!(parsed.daily, PathBuf::from("day_data.csv"));
        assert_eq!(parsed.start.as_deref(), Some("2011-01-01"));
        assert_eq!(parsed.top, 5);
        assert!(parsed.json);
        assert_eq!(parsed.log_level(), "info");
    }

    #[test]
    fn test_parse_top() {
        let parsed = Args::try_parse_from(["bikeshare-dashboard", "--top", "3"]).unwrap();
        assert_eq!(parsed.top, 3);

        assert!(Args::try_parse_from(["bikeshare-dashboard", "--top", "-1"]).is_err());
        assert!(Args::try_parse_from(["bikeshare-dashboard", "--top", "many"]).is_err());
    }
}
