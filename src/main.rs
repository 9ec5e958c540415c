//! Bike-sharing dashboard CLI
//!
//! Loads the hourly and daily tables, builds the report for the requested
//! date range, prints it and renders the charts.

use std::time::Instant;

use anyhow::{Context, Result};
use bikeshare_dashboard::{load_daily_csv, load_hourly_csv, logging, viz, Args, Dashboard};
use clap::Parser;
use tracing::info;

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init_logging(args.log_level());

    let start_time = Instant::now();

    let hourly = load_hourly_csv(&args.hourly)
        .with_context(|| format!("loading hourly data from {}", args.hourly.display()))?;
    let daily = load_daily_csv(&args.daily)
        .with_context(|| format!("loading daily data from {}", args.daily.display()))?;

    let mut dashboard = Dashboard::new(hourly, daily).with_top(args.top);
    let range = args.date_range(dashboard.default_range())?;
    info!(range = %range, "Selected date range");

    let report = dashboard.report(range);

    if args.json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        viz::print_report_summary(report);
    }

    if !args.no_charts {
        let written = viz::render_dashboard(report, &args.output_dir)?;
        if !args.json {
            println!("\nCharts saved to:");
            for path in written {
                println!("  {}", path.display());
            }
        }
    }

    info!(elapsed_ms = start_time.elapsed().as_millis() as u64, "Dashboard complete");
    Ok(())
}
