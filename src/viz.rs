//! Chart rendering and console summaries using Plotters

use std::fs;
use std::path::{Path, PathBuf};

use plotters::coord::Shift;
use plotters::prelude::*;
use tracing::info;

use crate::aggregate::{AggregateResult, HourDayType, HourExtremes, RiderSplit};
use crate::dashboard::{DashboardReport, RfmRankings};
use crate::rfm::{weekday_label, RfmRow};

/// Highlighted bar colour
const HIGHLIGHT: RGBColor = RGBColor(0x90, 0xCA, 0xF9);
/// Colour of the remaining bars
const MUTED: RGBColor = RGBColor(0xD3, 0xD3, 0xD3);

const CASUAL_COLOR: RGBColor = RGBColor(0xFF, 0xA5, 0x00);
const CASUAL_OFF_COLOR: RGBColor = RGBColor(0xFF, 0xD2, 0x80);
const REGISTERED_COLOR: RGBColor = RGBColor(0x00, 0x80, 0x00);
const REGISTERED_OFF_COLOR: RGBColor = RGBColor(0x80, 0xC0, 0x80);

/// Which bars get the highlight colour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarStyle {
    /// First bar highlighted, the rest muted
    LeaderHighlighted,
    /// Every bar highlighted
    Uniform,
}

/// One labelled bar
pub type Bar = (String, u64);

/// Write every dashboard chart as SVG into `output_dir`
///
/// # Returns
/// * Paths of the written charts
pub fn render_dashboard(report: &DashboardReport, output_dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    fs::create_dir_all(output_dir)?;

    let season_path = output_dir.join("season.svg");
    render_bar_chart(
        &season_path,
        "Count of Total by Season",
        &labelled(&report.by_season, |season| format!("S{}", season)),
        BarStyle::LeaderHighlighted,
    )?;

    let month_path = output_dir.join("month.svg");
    render_bar_chart(
        &month_path,
        "Count of Total by Month",
        &labelled(&report.by_month, |month| month.to_string()),
        BarStyle::LeaderHighlighted,
    )?;

    let hours_path = output_dir.join("hours.svg");
    render_hour_extremes(&hours_path, &report.hour_extremes)?;

    let riders_path = output_dir.join("casual_registered.svg");
    render_rider_split(&riders_path, &report.by_hour_and_day_type)?;

    let rfm_path = output_dir.join("rfm.svg");
    render_rfm_rankings(&rfm_path, &report.rfm_rankings)?;

    let written = vec![season_path, month_path, hours_path, riders_path, rfm_path];
    info!(dir = %output_dir.display(), charts = written.len(), "Charts written");
    Ok(written)
}

/// Single-panel bar chart
pub fn render_bar_chart(path: &Path, title: &str, bars: &[Bar], style: BarStyle) -> anyhow::Result<()> {
    let root = SVGBackend::new(path, (1000, 500)).into_drawing_area();
    root.fill(&WHITE)?;
    draw_bars(&root, title, bars, style)?;
    root.present()?;
    Ok(())
}

/// Best and worst performing hours side by side
pub fn render_hour_extremes(path: &Path, extremes: &HourExtremes) -> anyhow::Result<()> {
    let root = SVGBackend::new(path, (1400, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let panels = root.split_evenly((1, 2));
    let label = |hour: u32| format!("{:02}h", hour);
    draw_bars(
        &panels[0],
        "Best Performing Hour",
        &labelled(&extremes.best, label),
        BarStyle::LeaderHighlighted,
    )?;
    draw_bars(
        &panels[1],
        "Worst Performing Hour",
        &labelled(&extremes.worst, label),
        BarStyle::LeaderHighlighted,
    )?;

    root.present()?;
    Ok(())
}

/// RFM rankings in three panels
pub fn render_rfm_rankings(path: &Path, rankings: &RfmRankings) -> anyhow::Result<()> {
    let root = SVGBackend::new(path, (1500, 500)).into_drawing_area();
    root.fill(&WHITE)?;

    let panels = root.split_evenly((1, 3));

    draw_bars(
        &panels[0],
        "By Recency (days)",
        &weekday_bars(&rankings.by_recency, |r| r.recency.max(0) as u64),
        BarStyle::Uniform,
    )?;
    draw_bars(
        &panels[1],
        "By Frequency",
        &weekday_bars(&rankings.by_frequency, |r| r.frequency),
        BarStyle::Uniform,
    )?;
    draw_bars(
        &panels[2],
        "By Monetary",
        &weekday_bars(&rankings.by_monetary, |r| r.monetary),
        BarStyle::Uniform,
    )?;

    root.present()?;
    Ok(())
}

/// Casual and registered riders per hour, one line per rider type and day type
pub fn render_rider_split(
    path: &Path,
    rows: &AggregateResult<HourDayType, RiderSplit>,
) -> anyhow::Result<()> {
    let root = SVGBackend::new(path, (1200, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let title = "Comparison of Casual and Registered per Hour";
    if rows.is_empty() {
        draw_no_data(&root, title)?;
        root.present()?;
        return Ok(());
    }

    let max_hour = rows.iter().map(|row| row.key.0).max().unwrap_or(23).max(23);
    let max_value = rows
        .iter()
        .map(|row| row.measure.casual.max(row.measure.registered))
        .max()
        .unwrap_or(0);

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(0f64..max_hour as f64, 0f64..y_upper(max_value))?;

    chart
        .configure_mesh()
        .x_desc("Hour")
        .y_desc("Total")
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    let series: [(&str, bool, fn(&RiderSplit) -> u64, RGBColor); 4] = [
        ("Casual (working day)", true, |s| s.casual, CASUAL_COLOR),
        ("Casual (non-working day)", false, |s| s.casual, CASUAL_OFF_COLOR),
        ("Registered (working day)", true, |s| s.registered, REGISTERED_COLOR),
        ("Registered (non-working day)", false, |s| s.registered, REGISTERED_OFF_COLOR),
    ];

    for (name, workingday, value, color) in series {
        let points: Vec<(f64, f64)> = rows
            .iter()
            .filter(|row| row.key.1 == workingday)
            .map(|row| (row.key.0 as f64, value(&row.measure) as f64))
            .collect();

        chart
            .draw_series(LineSeries::new(points, color.stroke_width(2)))?
            .label(name)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

fn draw_bars<DB>(area: &DrawingArea<DB, Shift>, title: &str, bars: &[Bar], style: BarStyle) -> anyhow::Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    if bars.is_empty() {
        return draw_no_data(area, title);
    }

    let max_value = bars.iter().map(|(_, value)| *value).max().unwrap_or(0);
    let mut chart = ChartBuilder::on(area)
        .caption(title, ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(-0.5f64..(bars.len() as f64 - 0.5), 0f64..y_upper(max_value))?;

    let label_for = |x: &f64| bar_label(bars, *x);
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(bars.len())
        .x_label_formatter(&label_for)
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    chart.draw_series(bars.iter().enumerate().map(|(i, (_, value))| {
        let x = i as f64;
        let color = match style {
            BarStyle::LeaderHighlighted if i > 0 => MUTED,
            _ => HIGHLIGHT,
        };
        Rectangle::new([(x - 0.4, 0.0), (x + 0.4, *value as f64)], color.filled())
    }))?;

    Ok(())
}

fn draw_no_data<DB>(area: &DrawingArea<DB, Shift>, title: &str) -> anyhow::Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    area.draw(&Text::new(
        format!("{}: no data in range", title),
        (20, 20),
        ("sans-serif", 20),
    ))?;
    Ok(())
}

/// Label of the bar centred on `x`, empty between bars
fn bar_label(bars: &[Bar], x: f64) -> String {
    let index = x.round();
    if (x - index).abs() > 1e-6 || index < 0.0 {
        return String::new();
    }
    bars.get(index as usize)
        .map(|(label, _)| label.clone())
        .unwrap_or_default()
}

fn weekday_bars(rows: &[RfmRow], value: fn(&RfmRow) -> u64) -> Vec<Bar> {
    rows.iter()
        .map(|row| (weekday_label(row.weekday), value(row)))
        .collect()
}

fn y_upper(max_value: u64) -> f64 {
    (max_value as f64 * 1.1).max(1.0)
}

fn labelled<F>(rows: &AggregateResult<u32, u64>, label: F) -> Vec<Bar>
where
    F: Fn(u32) -> String,
{
    rows.iter().map(|row| (label(row.key), row.measure)).collect()
}

/// Format with two decimals and comma thousands separators
pub fn format_thousands(value: f64) -> String {
    let formatted = format!("{:.2}", value.abs());
    let (int_part, frac_part) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, frac_part)
}

/// Print the report's metrics and rankings to the console
pub fn print_report_summary(report: &DashboardReport) {
    println!("\n=== Bike-sharing Dashboard ({}) ===", report.range);
    println!("Hourly rows: {}, daily rows: {}", report.hourly_rows, report.daily_rows);

    for warning in &report.warnings {
        println!("Warning: {}", warning);
    }

    println!("\nCount of total by season:");
    for row in &report.by_season {
        println!("  Season {:>2}: {:>10}", row.key, row.measure);
    }

    println!("\nCount of total by month:");
    for row in &report.by_month {
        println!("  Month {:>3}: {:>10}", row.key, row.measure);
    }

    println!("\nBest performing hours:");
    for row in &report.hour_extremes.best {
        println!("  {:02}h: {:>10}", row.key, row.measure);
    }
    println!("Worst performing hours:");
    for row in &report.hour_extremes.worst {
        println!("  {:02}h: {:>10}", row.key, row.measure);
    }

    println!("\nBest weekday based on RFM parameters");
    match report.rfm_averages {
        Some(averages) => {
            println!("  Average Recency (days): {:.1}", averages.recency);
            println!("  Average Frequency:      {:.2}", averages.frequency);
            println!("  Average Monetary:       {}", format_thousands(averages.monetary));
        }
        None => println!("  No daily records in range"),
    }

    println!("\n  Weekday | Recency | Frequency | Monetary");
    println!("  --------|---------|-----------|----------");
    for row in report.rfm.rows() {
        println!(
            "  {:>7} | {:>7} | {:>9} | {:>8}",
            weekday_label(row.weekday),
            row.recency,
            row.frequency,
            row.monetary
        );
    }
}
