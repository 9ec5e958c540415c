//! Rental record types and CSV loading using Polars

use std::path::Path;

use chrono::NaiveDate;
use polars::prelude::*;
use tracing::info;

use crate::error::{DashboardError, Result};

/// Date format of the `dteday` column
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const HOURLY_COLUMNS: [&str; 5] = ["hr", "workingday", "casual", "registered", "cnt"];
const DAILY_COLUMNS: [&str; 5] = ["instant", "season", "mnth", "weekday", "cnt"];

/// Records that carry a calendar date and can be range-filtered
pub trait Dated {
    fn date(&self) -> NaiveDate;
}

/// One row of the hourly table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HourlyRecord {
    pub date: NaiveDate,
    /// Hour of day, expected 0-23 but not validated
    pub hour: u32,
    pub workingday: bool,
    pub casual: u64,
    pub registered: u64,
    /// Total rentals; the source data keeps `cnt == casual + registered`
    pub cnt: u64,
}

/// One row of the daily table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyRecord {
    /// Sequential record identifier
    pub instant: i64,
    pub date: NaiveDate,
    /// Season code, expected 1-4
    pub season: u32,
    /// Month, expected 1-12
    pub month: u32,
    /// Weekday, expected 0-6 with 0 = Sunday
    pub weekday: u32,
    pub cnt: u64,
}

impl Dated for HourlyRecord {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

impl Dated for DailyRecord {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

/// Load the hourly table from a CSV file with a header row
///
/// # Arguments
/// * `file_path` - Path to the CSV file (`dteday,hr,workingday,casual,registered,cnt` among its columns)
///
/// # Returns
/// * Records in file order
pub fn load_hourly_csv<P: AsRef<Path>>(file_path: P) -> Result<Vec<HourlyRecord>> {
    let file_path = file_path.as_ref();
    let df = read_columns(file_path, &HOURLY_COLUMNS)?;

    let dates = date_column(&df, "dteday")?;
    let hours = unsigned_column(&df, "hr")?;
    let workingdays = unsigned_column(&df, "workingday")?;
    let casual = unsigned_column(&df, "casual")?;
    let registered = unsigned_column(&df, "registered")?;
    let counts = unsigned_column(&df, "cnt")?;

    let records: Vec<HourlyRecord> = (0..df.height())
        .map(|i| HourlyRecord {
            date: dates[i],
            hour: hours[i] as u32,
            workingday: workingdays[i] != 0,
            casual: casual[i],
            registered: registered[i],
            cnt: counts[i],
        })
        .collect();

    info!(path = %file_path.display(), rows = records.len(), "Loaded hourly table");
    Ok(records)
}

/// Load the daily table from a CSV file with a header row
///
/// # Arguments
/// * `file_path` - Path to the CSV file (`instant,dteday,season,mnth,weekday,cnt` among its columns)
///
/// # Returns
/// * Records in file order
pub fn load_daily_csv<P: AsRef<Path>>(file_path: P) -> Result<Vec<DailyRecord>> {
    let file_path = file_path.as_ref();
    let df = read_columns(file_path, &DAILY_COLUMNS)?;

    let dates = date_column(&df, "dteday")?;
    let instants = signed_column(&df, "instant")?;
    let seasons = unsigned_column(&df, "season")?;
    let months = unsigned_column(&df, "mnth")?;
    let weekdays = unsigned_column(&df, "weekday")?;
    let counts = unsigned_column(&df, "cnt")?;

    let records: Vec<DailyRecord> = (0..df.height())
        .map(|i| DailyRecord {
            instant: instants[i],
            date: dates[i],
            season: seasons[i] as u32,
            month: months[i] as u32,
            weekday: weekdays[i] as u32,
            cnt: counts[i],
        })
        .collect();

    info!(path = %file_path.display(), rows = records.len(), "Loaded daily table");
    Ok(records)
}

/// Scan the CSV and keep `dteday` as text plus the given integer columns
fn read_columns(file_path: &Path, int_columns: &[&str]) -> Result<DataFrame> {
    let mut selection = vec![col("dteday").cast(DataType::String)];
    selection.extend(
        int_columns
            .iter()
            .map(|&name| col(name).cast(DataType::Int64)),
    );

    let df = LazyCsvReader::new(file_path)
        .with_has_header(true)
        .finish()?
        .select(selection)
        .collect()?;

    Ok(df)
}

fn date_column(df: &DataFrame, name: &str) -> Result<Vec<NaiveDate>> {
    let values = df.column(name)?.str()?;

    values
        .into_iter()
        .enumerate()
        .map(|(row, value)| {
            let value = value.ok_or_else(|| DashboardError::MissingValue {
                column: name.to_string(),
                row,
            })?;
            parse_date(value).ok_or_else(|| DashboardError::InvalidDate {
                column: name.to_string(),
                row,
                value: value.to_string(),
            })
        })
        .collect()
}

fn signed_column(df: &DataFrame, name: &str) -> Result<Vec<i64>> {
    let values = df.column(name)?.i64()?;

    values
        .into_iter()
        .enumerate()
        .map(|(row, value)| {
            value.ok_or_else(|| DashboardError::MissingValue {
                column: name.to_string(),
                row,
            })
        })
        .collect()
}

/// Integer column that must be non-negative and fit in `u32` for key columns
fn unsigned_column(df: &DataFrame, name: &str) -> Result<Vec<u64>> {
    let values = signed_column(df, name)?;
    let is_key = !matches!(name, "casual" | "registered" | "cnt");

    values
        .into_iter()
        .enumerate()
        .map(|(row, value)| {
            let fits = value >= 0 && (!is_key || value <= i64::from(u32::MAX));
            if fits {
                Ok(value as u64)
            } else {
                Err(DashboardError::OutOfRange {
                    column: name.to_string(),
                    row,
                    value,
                })
            }
        })
        .collect()
}

/// Parse a `YYYY-MM-DD` date, tolerating surrounding whitespace
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}
