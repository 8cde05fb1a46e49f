//! Export chart series to CSV.
//!
//! Missing values are written as empty cells, never as `0`.

use std::path::Path;

use csv::Writer;

use crate::analysis::bucket::{BUCKET_METRICS, BucketSeries};
use crate::domain::YearlyRow;
use crate::error::AppError;

/// One row per trend point: bucket date, representative date, then the
/// bucket metrics.
pub fn write_buckets_csv(path: &Path, series: &BucketSeries) -> Result<(), AppError> {
    let mut w = create(path)?;

    let mut header = vec!["bucket_date", "representative_date"];
    header.extend(BUCKET_METRICS.iter().map(|m| m.column()));
    w.write_record(&header).map_err(write_err)?;

    for b in &series.buckets {
        let mut row = vec![b.bucket_date.to_string(), b.representative_date.to_string()];
        row.extend(BUCKET_METRICS.iter().map(|&m| b.metric(m).map(format_number).unwrap_or_default()));
        w.write_record(&row).map_err(write_err)?;
    }

    w.flush().map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))
}

pub fn write_yearly_csv(path: &Path, rows: &[YearlyRow]) -> Result<(), AppError> {
    let mut w = create(path)?;
    w.write_record(["year", "total_cases", "total_deaths", "stringency_index", "gdp_growth"])
        .map_err(write_err)?;

    for r in rows {
        w.write_record([
            r.year.to_string(),
            format_number(r.total_cases),
            format_number(r.total_deaths),
            r.stringency_index.map(format_number).unwrap_or_default(),
            r.gdp_growth.map(format_number).unwrap_or_default(),
        ])
        .map_err(write_err)?;
    }

    w.flush().map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))
}

fn create(path: &Path) -> Result<Writer<std::fs::File>, AppError> {
    Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))
}

fn write_err(e: csv::Error) -> AppError {
    AppError::new(2, format!("Failed to write export CSV row: {e}"))
}

/// Counts print without a fractional part; rates keep up to 4 decimals.
fn format_number(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{v:.0}")
    } else {
        format!("{v:.4}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::bucket::Granularity;
    use crate::domain::{AggregatedBucket, Metric};
    use chrono::NaiveDate;

    #[test]
    fn yearly_export_leaves_missing_cells_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("yearly.csv");
        let rows = vec![
            YearlyRow {
                year: 2020,
                total_cases: 25.0,
                total_deaths: 1.0,
                stringency_index: Some(71.3),
                gdp_growth: Some(-3.4),
            },
            YearlyRow {
                year: 2021,
                total_cases: 0.0,
                total_deaths: 0.0,
                stringency_index: None,
                gdp_growth: None,
            },
        ];
        write_yearly_csv(&path, &rows).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "year,total_cases,total_deaths,stringency_index,gdp_growth");
        assert_eq!(lines[1], "2020,25,1,71.3000,-3.4000");
        assert_eq!(lines[2], "2021,0,0,,");
    }

    #[test]
    fn bucket_export_has_one_row_per_bucket() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trend.csv");
        let day = |d| NaiveDate::from_ymd_opt(2021, 3, d).unwrap();
        let series = BucketSeries {
            granularity: Granularity::Monthly,
            buckets: vec![AggregatedBucket {
                bucket_date: day(1),
                representative_date: day(31),
                metrics: [(Metric::TotalCases, 150.0), (Metric::TotalDeaths, 0.0)].into_iter().collect(),
            }],
        };
        write_buckets_csv(&path, &series).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "bucket_date,representative_date,total_cases,total_deaths,total_vaccinations,hosp_patients"
        );
        assert_eq!(lines[1], "2021-03-01,2021-03-31,150,0,,");
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn unwritable_path_maps_to_exit_code_2() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.csv");
        let err = write_yearly_csv(&path, &[]).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
