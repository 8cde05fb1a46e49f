//! End-to-end scenarios: CSV files on disk -> load -> dashboard pipeline.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;

use covid_dash::analysis::bucket::{Granularity, aggregate};
use covid_dash::analysis::filter;
use covid_dash::analysis::join::{DEFAULT_YEARS, join_location};
use covid_dash::analysis::labor;
use covid_dash::analysis::period::PeriodPreset;
use covid_dash::app::pipeline::{DashboardQuery, build_dashboard, build_from_handle};
use covid_dash::data::{DataHandle, DataPaths, load_dataset};
use covid_dash::domain::{DateRange, LaborMeasure, Metric, SecondarySeries};
use covid_dash::error::DataError;
use covid_dash::plot::{PlotSeries, render_series_plot};

const COVID_CSV: &str = "\
iso_code,continent,location,date,total_cases,total_deaths,total_vaccinations,hosp_patients,stringency_index,population
TST,Europe,Testland,2021-01-01,10,1,,,55.5,1000
TST,Europe,Testland,2021-02-01,20,2,,,,1000
OTH,Asia,Otherland,2021-01-15,5,0,,,,2000
OTH,Asia,Otherland,not-a-date,999,0,,,,2000
";

const EMPLOYMENT_CSV: &str = "\
Reference area,Sex,AGE,Age,MEASURE,TIME_PERIOD,OBS_VALUE
Testland,_T,Y15T64,From 15 to 64 years,EMP_WAP,2020,70.1
Testland,M,Y15T64,From 15 to 64 years,EMP_WAP,2020,74.0
Testland,F,Y15T64,From 15 to 64 years,EMP_WAP,2020,66.2
Testland,_T,Y15T24,From 15 to 24 years,EMP_WAP,2020,40.0
Testland,_T,Y15T74,From 15 to 74 years,EMP_WAP,2020,60.0
";

const UNEMPLOYMENT_CSV: &str = "\
Reference area,Sex,AGE,Age,MEASURE,TIME_PERIOD,OBS_VALUE
Testland,_T,Y15T64,From 15 to 64 years,UNE_LF,2020,7.5
Testland,_T,Y15T64,From 15 to 64 years,UNE_LF,2021,6.0
";

const GDP_CSV: &str = "\
Country Name,Country Code,2020 [YR2020],2021 [YR2021],2022 [YR2022]
Testland,TST,-3.1,..,2.5
";

fn write_sources(dir: &Path) -> DataPaths {
    let paths = DataPaths::in_dir(dir);
    fs::write(&paths.covid, COVID_CSV).unwrap();
    fs::write(&paths.employment, EMPLOYMENT_CSV).unwrap();
    fs::write(&paths.unemployment, UNEMPLOYMENT_CSV).unwrap();
    fs::write(&paths.gdp, GDP_CSV).unwrap();
    paths
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn loads_all_sources_and_reports_skipped_rows() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = load_dataset(&write_sources(dir.path()));

    assert!(!dataset.report.has_failures());
    assert_eq!(dataset.covid.len(), 4);
    // The Y15T74 band is not one the charts use.
    assert_eq!(dataset.labor.len(), 6);
    assert_eq!(dataset.gdp.len(), 1);

    let skipped: usize = dataset.report.sources.iter().map(|s| s.row_errors.len()).sum();
    assert_eq!(skipped, 1);

    let undated = dataset.covid.iter().filter(|o| o.date.is_none()).count();
    assert_eq!(undated, 1);
    assert_eq!(dataset.covid[0].extra.get("population").map(String::as_str), Some("1000"));
}

#[test]
fn four_hundred_day_window_yields_two_monthly_buckets() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = load_dataset(&write_sources(dir.path()));

    let range = DateRange::new(day(2020, 6, 1), day(2021, 7, 5));
    assert_eq!(range.span_days(), 399);
    let testland = filter::by_location(&dataset.covid, Some("Testland"));
    let series = aggregate(filter::by_date_range(testland, &range), 400);

    assert_eq!(series.granularity, Granularity::Monthly);
    let got: Vec<(String, Option<f64>)> = series
        .buckets
        .iter()
        .map(|b| (b.month_key(), b.metric(Metric::TotalCases)))
        .collect();
    assert_eq!(got, [("2021-01".to_string(), Some(10.0)), ("2021-02".to_string(), Some(20.0))]);
    // The stringency value on 2021-01-01 is not a trend metric.
    assert!(series.buckets.iter().all(|b| b.metric(Metric::StringencyIndex).is_none()));
}

#[test]
fn dashboard_views_share_one_dataset() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = load_dataset(&write_sources(dir.path()));

    let query = DashboardQuery {
        continent: Some("Europe".to_string()),
        period: PeriodPreset::Year(2021),
        ..DashboardQuery::new(day(2024, 3, 15))
    };
    let view = build_dashboard(&dataset, &query).unwrap();

    assert_eq!(view.summary.total_cases, 20.0);
    assert_eq!(view.summary.date, Some(day(2021, 2, 1)));
    assert_eq!(view.trend.granularity, Granularity::Monthly);
    // Map keys ignore the continent selection.
    assert_eq!(view.latest_by_iso.keys().cloned().collect::<Vec<_>>(), ["OTH", "TST"]);
}

#[test]
fn lifecycle_distinguishes_not_ready_from_empty() {
    let handle = DataHandle::new();
    let query = DashboardQuery::new(day(2024, 3, 15));
    assert!(!handle.is_ready());
    assert_eq!(build_from_handle(&handle, &query).unwrap_err(), DataError::NotReady);

    let dir = tempfile::tempdir().unwrap();
    // Nothing on disk: every source fails, the dataset is empty but ready.
    handle.complete(load_dataset(&DataPaths::in_dir(dir.path()))).unwrap();
    let view = build_from_handle(&handle, &query).unwrap();
    assert_eq!(view.summary.total_cases, 0.0);
    assert_eq!(view.summary.date, None);
    assert_eq!(view.dataset.report.failures().count(), 4);
}

#[test]
fn yearly_join_is_complete_and_skips_missing_gdp() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = load_dataset(&write_sources(dir.path()));

    let rows = join_location(&dataset.covid, &dataset.gdp, "Testland", DEFAULT_YEARS);
    assert_eq!(rows.len(), 10);
    assert!(rows.windows(2).all(|w| w[0].year < w[1].year));

    let y2020 = &rows[5];
    assert_eq!(y2020.year, 2020);
    assert_eq!(y2020.gdp_growth, Some(-3.1));
    let y2021 = &rows[6];
    assert_eq!(y2021.total_cases, 20.0);
    assert_eq!(y2021.gdp_growth, None);
    assert_eq!(y2021.stringency_index, None);

    // A renderer fed these rows skips the missing points instead of plotting zero.
    let points: Vec<(f64, Option<f64>)> = rows
        .iter()
        .map(|r| (f64::from(r.year), r.secondary(SecondarySeries::GdpGrowth)))
        .collect();
    let plot = render_series_plot("Testland", &[PlotSeries::new("GDP", 'o', points)], 20, 6);
    assert!(plot.starts_with("Testland | y=["));
    let markers = plot.lines().skip(2).flat_map(|l| l.chars()).filter(|&c| c == 'o').count();
    assert_eq!(markers, 2);

    let nowhere = join_location(&dataset.covid, &dataset.gdp, "Nowhere", DEFAULT_YEARS);
    assert_eq!(nowhere.len(), 10);
    assert!(nowhere.iter().all(|r| r.total_cases == 0.0 && r.gdp_growth.is_none()));
}

#[test]
fn labor_views_from_loaded_tables() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = load_dataset(&write_sources(dir.path()));

    let trends = labor::measure_trends(&dataset.labor, "Testland");
    assert_eq!(trends[0].points.len(), 1);
    assert_eq!(trends[1].points.iter().map(|p| p.year).collect::<Vec<_>>(), [2020, 2021]);

    let split = labor::gender_split(&dataset.labor, "Testland", 2020, LaborMeasure::EmploymentRate).unwrap();
    assert_eq!((split.male, split.female), (74.0, 66.2));

    let ages = labor::age_breakdown(&dataset.labor, "Testland", LaborMeasure::EmploymentRate);
    assert_eq!(ages[0].points.len(), 1);
    assert!(ages[1].points.is_empty());
}
