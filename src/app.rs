//! Top-level application orchestration.
//!
//! `src/main.rs` is tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads the four source files once
//! - runs the dashboard pipeline for the requested view
//! - prints tables/plots and writes optional exports

use chrono::{Local, NaiveDate};
use clap::Parser;
use tracing::{info, warn};

use crate::analysis::period::{self, PeriodPreset};
use crate::analysis::{filter, join, labor};
use crate::cli::{
    Cli, Command, FilterArgs, GdpArgs, LaborArgs, LaborView, LocationsArgs, MapArgs, PeriodArgs, SummaryArgs, TrendArgs,
};
use crate::data::{DataHandle, DataPaths, Dataset, load_dataset};
use crate::domain::Metric;
use crate::error::AppError;
use crate::io::geo::{self, GeoSource};
use crate::plot::{MARKERS, PlotSeries};

pub mod pipeline;

use pipeline::DashboardQuery;

/// Entry point for the `cdash` binary.
pub fn run() -> Result<(), AppError> {
    init_tracing();
    let cli = Cli::parse();
    let today = cli.today.unwrap_or_else(|| Local::now().date_naive());

    let paths = DataPaths::from_env(cli.data_dir.as_deref());
    let handle = DataHandle::new();
    handle.on_ready(|dataset| {
        info!(
            covid = dataset.covid.len(),
            labor = dataset.labor.len(),
            gdp = dataset.gdp.len(),
            "dataset ready"
        );
    });
    handle.complete(load_dataset(&paths))?;
    let dataset = handle.get()?;

    if dataset.report.has_failures() {
        eprint!("{}", crate::report::format_load_report(&dataset.report));
    }

    match cli.command {
        Command::Summary(args) => handle_summary(&dataset, today, args),
        Command::Trend(args) => handle_trend(&dataset, today, args),
        Command::Map(args) => handle_map(&dataset, today, args),
        Command::Gdp(args) => handle_gdp(&dataset, args),
        Command::Labor(args) => handle_labor(&dataset, args),
        Command::Locations(args) => handle_locations(&dataset, args),
    }
}

fn init_tracing() {
    // A second init (e.g. from tests) is harmless.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

/// Build a pipeline query from CLI selections.
pub fn query_from_args(filter: &FilterArgs, today: NaiveDate) -> Result<DashboardQuery, AppError> {
    let mut query = period_query(&filter.period, today)?;
    query.continent = filter.continent.clone();
    query.location = filter.location.clone();
    Ok(query)
}

fn period_query(args: &PeriodArgs, today: NaiveDate) -> Result<DashboardQuery, AppError> {
    let preset: PeriodPreset = args.period.parse()?;
    let mut query = DashboardQuery {
        period: preset,
        ..DashboardQuery::new(today)
    };
    if preset == PeriodPreset::Custom {
        let bound = |s: &Option<String>| s.as_deref().map(period::parse_bound).transpose();
        query.custom_start = bound(&args.start)?;
        query.custom_end = bound(&args.end)?;
    } else if args.start.is_some() || args.end.is_some() {
        warn!(period = %preset, "--start/--end only apply to the custom period; ignoring");
    }
    Ok(query)
}

fn handle_summary(dataset: &Dataset, today: NaiveDate, args: SummaryArgs) -> Result<(), AppError> {
    let query = query_from_args(&args.filter, today)?;
    let view = pipeline::build_dashboard(dataset, &query)?;

    if args.json {
        let json = serde_json::to_string_pretty(&view.summary)
            .map_err(|e| AppError::new(2, format!("Failed to serialize summary: {e}")))?;
        println!("{json}");
    } else {
        print!("{}", crate::report::format_summary(&view.label, &view.summary));
    }
    Ok(())
}

fn handle_trend(dataset: &Dataset, today: NaiveDate, args: TrendArgs) -> Result<(), AppError> {
    let query = query_from_args(&args.filter, today)?;
    let view = pipeline::build_dashboard(dataset, &query)?;

    let metrics: Vec<Metric> = args.metrics.iter().map(|t| t.metric()).collect();
    println!("{}", view.label);
    print!("{}", crate::report::format_buckets(&view.trend, &metrics));

    if args.plot && !args.no_plot {
        let origin = view.range.start();
        let series: Vec<PlotSeries> = metrics
            .iter()
            .enumerate()
            .map(|(i, &m)| {
                let points = view
                    .trend
                    .buckets
                    .iter()
                    .map(|b| ((b.bucket_date - origin).num_days() as f64, b.metric(m)))
                    .collect();
                PlotSeries::new(m.display_name(), MARKERS[i % MARKERS.len()], points)
            })
            .collect();
        println!();
        print!("{}", crate::plot::render_series_plot(&view.label, &series, args.width, args.height));
    }

    if let Some(path) = &args.export {
        crate::io::export::write_buckets_csv(path, &view.trend)?;
    }
    Ok(())
}

fn handle_map(dataset: &Dataset, today: NaiveDate, args: MapArgs) -> Result<(), AppError> {
    let query = period_query(&args.period, today)?;
    let view = pipeline::build_dashboard(dataset, &query)?;

    let source = match (&args.geo, args.remote) {
        (Some(path), _) => Some(GeoSource::File(path.clone())),
        (None, true) => Some(GeoSource::url_from_env()),
        (None, false) => None,
    };
    let points = match source {
        Some(source) => geo::join_latest(&geo::load_features(&source)?, &view.latest_by_iso),
        None => geo::points_without_geo(&view.latest_by_iso),
    };
    let hits = geo::search(&points, args.search.as_deref().unwrap_or(""));

    println!("{}", view.label);
    print!("{}", crate::report::format_map_list(&hits, args.metric, args.top));
    Ok(())
}

fn handle_gdp(dataset: &Dataset, args: GdpArgs) -> Result<(), AppError> {
    if args.from > args.to {
        return Err(AppError::new(2, format!("--from {} is after --to {}.", args.from, args.to)));
    }
    if dataset.gdp_for(&args.location).is_none() {
        warn!(location = %args.location, "no GDP record for location");
    }
    let rows = join::join_location(&dataset.covid, &dataset.gdp, &args.location, args.from..=args.to);

    print!("{}", crate::report::format_yearly(&args.location, &rows, args.series));

    if args.plot && !args.no_plot {
        let points = rows.iter().map(|r| (f64::from(r.year), r.secondary(args.series))).collect();
        let series = [PlotSeries::new(args.series.display_name(), MARKERS[0], points)];
        println!();
        print!("{}", crate::plot::render_series_plot(&args.location, &series, 60, 15));
    }

    if let Some(path) = &args.export {
        crate::io::export::write_yearly_csv(path, &rows)?;
    }
    Ok(())
}

fn handle_labor(dataset: &Dataset, args: LaborArgs) -> Result<(), AppError> {
    let records = &dataset.labor;
    let out = match args.view {
        LaborView::Ages => {
            let series = labor::age_breakdown(records, &args.country, args.measure);
            let title = format!("{}: {} by age", args.country, args.measure.display_name());
            crate::report::format_labor_series(&title, &series)
        }
        LaborView::Trends => {
            let series = labor::measure_trends(records, &args.country);
            let title = format!("{}: employment vs unemployment (15-64)", args.country);
            crate::report::format_labor_series(&title, &series)
        }
        LaborView::Gender => {
            let year = args
                .year
                .or_else(|| labor::years_for(records, &args.country).last().copied());
            let split = year.and_then(|y| labor::gender_split(records, &args.country, y, args.measure));
            crate::report::format_gender_split(&args.country, split.as_ref())
        }
    };
    print!("{out}");
    Ok(())
}

fn handle_locations(dataset: &Dataset, args: LocationsArgs) -> Result<(), AppError> {
    let names = match args.continent.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
        Some(continent) => filter::locations_in(&dataset.covid, continent),
        None => filter::distinct_continents(&dataset.covid),
    };
    for name in names {
        println!("{name}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DataError;

    fn filter_args(period: &str, start: Option<&str>, end: Option<&str>) -> FilterArgs {
        FilterArgs {
            continent: Some("Europe".to_string()),
            location: None,
            period: PeriodArgs {
                period: period.to_string(),
                start: start.map(str::to_string),
                end: end.map(str::to_string),
            },
        }
    }

    #[test]
    fn query_parses_period_and_bounds() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let q = query_from_args(&filter_args("custom", Some("01-02-2021"), Some("2021-03-01")), today).unwrap();
        assert_eq!(q.period, PeriodPreset::Custom);
        assert_eq!(q.custom_start, NaiveDate::from_ymd_opt(2021, 1, 2));
        assert_eq!(q.continent.as_deref(), Some("Europe"));
        assert_eq!(q.range().unwrap().end(), NaiveDate::from_ymd_opt(2021, 3, 1).unwrap());
    }

    #[test]
    fn bad_period_or_date_is_a_usage_error() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let err = query_from_args(&filter_args("fortnight", None, None), today).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        let err = query_from_args(&filter_args("custom", Some("soon"), None), today).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert_eq!(err.to_string(), DataError::InvalidDate("soon".to_string()).to_string());
    }

    #[test]
    fn bounds_are_ignored_outside_the_custom_period() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let q = query_from_args(&filter_args("all-time", Some("soon"), Some("later")), today).unwrap();
        assert_eq!(q.period, PeriodPreset::AllTime);
        assert_eq!((q.custom_start, q.custom_end), (None, None));

        let q = query_from_args(&filter_args("2021", Some("2020-01-01"), None), today).unwrap();
        assert_eq!(q.custom_start, None);
        assert_eq!(q.range().unwrap().start(), NaiveDate::from_ymd_opt(2021, 1, 1).unwrap());
    }
}
