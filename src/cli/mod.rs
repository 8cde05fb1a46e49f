//! Command-line parsing for the dashboard.
//!
//! Argument parsing and dispatch stay separate from the pipeline code; every
//! subcommand maps onto one dashboard view.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};

use crate::domain::{LaborMeasure, MapMetric, SecondarySeries, TrendMetric};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "cdash", version, about = "COVID-19, labor and GDP dashboard")]
pub struct Cli {
    /// Directory holding the source CSV files (overrides COVID_DASH_DATA_DIR).
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Reference date for relative periods (defaults to the local date).
    #[arg(long, global = true, value_name = "YYYY-MM-DD")]
    pub today: Option<NaiveDate>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Headline totals for the selected region and period.
    Summary(SummaryArgs),
    /// Time series of the selection, daily or bucketed by month.
    Trend(TrendArgs),
    /// Latest values per country for the period.
    Map(MapArgs),
    /// Yearly cases/deaths next to GDP growth or stringency.
    Gdp(GdpArgs),
    /// Employment and unemployment charts for one country.
    Labor(LaborArgs),
    /// List continents, or the locations of one continent.
    Locations(LocationsArgs),
}

/// Region and period selection shared by `summary` and `trend`.
#[derive(Debug, Parser, Clone)]
pub struct FilterArgs {
    #[arg(long)]
    pub continent: Option<String>,

    #[arg(long)]
    pub location: Option<String>,

    #[command(flatten)]
    pub period: PeriodArgs,
}

#[derive(Debug, Parser, Clone)]
pub struct PeriodArgs {
    /// last7days, last15days, last30days, lastMonth, all-time, custom, or a year (YYYY).
    #[arg(long, default_value = "all-time")]
    pub period: String,

    /// Custom period start (YYYY-MM-DD or MM-DD-YYYY).
    #[arg(long)]
    pub start: Option<String>,

    /// Custom period end (YYYY-MM-DD or MM-DD-YYYY).
    #[arg(long)]
    pub end: Option<String>,
}

#[derive(Debug, Parser, Clone)]
pub struct SummaryArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Print the summary as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Parser, Clone)]
pub struct TrendArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Metrics to plot (repeatable).
    #[arg(long = "metric", value_enum, default_values_t = [TrendMetric::TotalCases])]
    pub metrics: Vec<TrendMetric>,

    /// Render an ASCII plot in the terminal (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Export the series to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Parser, Clone)]
pub struct MapArgs {
    #[command(flatten)]
    pub period: PeriodArgs,

    #[arg(long, value_enum, default_value_t = MapMetric::Cases)]
    pub metric: MapMetric,

    /// Keep countries whose name contains this text (case-insensitive).
    #[arg(long)]
    pub search: Option<String>,

    /// Local GeoJSON file with the country features.
    #[arg(long, value_name = "GEOJSON", conflicts_with = "remote")]
    pub geo: Option<PathBuf>,

    /// Fetch the country features from COVID_DASH_GEO_URL.
    #[arg(long)]
    pub remote: bool,

    /// Only show the N countries with the highest values.
    #[arg(long)]
    pub top: Option<usize>,
}

#[derive(Debug, Parser, Clone)]
pub struct GdpArgs {
    #[arg(long, default_value = "United States")]
    pub location: String,

    /// Secondary series drawn next to the yearly totals.
    #[arg(long, value_enum, default_value_t = SecondarySeries::GdpGrowth)]
    pub series: SecondarySeries,

    #[arg(long, default_value_t = 2015)]
    pub from: i32,

    #[arg(long, default_value_t = 2024)]
    pub to: i32,

    /// Render an ASCII plot of the secondary series (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    #[arg(long)]
    pub no_plot: bool,

    /// Export the yearly rows to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LaborView {
    /// One series per age band.
    Ages,
    /// Employment and unemployment for ages 15-64.
    Trends,
    /// Male vs female for one year.
    Gender,
}

#[derive(Debug, Parser, Clone)]
pub struct LaborArgs {
    #[arg(long, default_value = "United States")]
    pub country: String,

    #[arg(long, value_enum, default_value_t = LaborView::Trends)]
    pub view: LaborView,

    #[arg(long, value_enum, default_value_t = LaborMeasure::EmploymentRate)]
    pub measure: LaborMeasure,

    /// Year for the gender view (defaults to the latest available).
    #[arg(long)]
    pub year: Option<i32>,
}

#[derive(Debug, Parser, Clone)]
pub struct LocationsArgs {
    /// List the locations of this continent instead of the continents.
    #[arg(long)]
    pub continent: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_flags_and_defaults() {
        let cli = Cli::parse_from([
            "cdash",
            "trend",
            "--data-dir",
            "/tmp/d",
            "--today",
            "2024-03-15",
            "--metric",
            "total-deaths",
            "--metric",
            "hosp-patients",
        ]);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/d")));
        assert_eq!(cli.today, NaiveDate::from_ymd_opt(2024, 3, 15));
        let Command::Trend(args) = cli.command else {
            panic!("expected trend");
        };
        assert_eq!(args.metrics, [TrendMetric::TotalDeaths, TrendMetric::HospPatients]);
        assert_eq!(args.filter.period.period, "all-time");
        assert!(args.plot && !args.no_plot);
    }

    #[test]
    fn gdp_defaults_cover_ten_years() {
        let cli = Cli::parse_from(["cdash", "gdp", "--series", "stringency"]);
        let Command::Gdp(args) = cli.command else {
            panic!("expected gdp");
        };
        assert_eq!((args.from, args.to), (2015, 2024));
        assert_eq!(args.series, SecondarySeries::Stringency);
        assert_eq!(args.location, "United States");
    }

    #[test]
    fn labor_measure_names() {
        let cli = Cli::parse_from(["cdash", "labor", "--view", "gender", "--measure", "unemployment"]);
        let Command::Labor(args) = cli.command else {
            panic!("expected labor");
        };
        assert_eq!(args.view, LaborView::Gender);
        assert_eq!(args.measure, LaborMeasure::UnemploymentRate);
    }

    #[test]
    fn map_geo_and_remote_conflict() {
        let res = Cli::try_parse_from(["cdash", "map", "--geo", "w.json", "--remote"]);
        assert!(res.is_err());
    }
}
