//! Formatted terminal output for each dashboard view.
//!
//! Formatting lives here so the pipeline stays free of presentation and
//! output changes stay localized.

use chrono::NaiveDate;

use crate::analysis::bucket::{BucketSeries, Granularity};
use crate::data::LoadReport;
use crate::domain::{GenderSplit, LaborSeries, MapMetric, MapPoint, Metric, SecondarySeries, Summary, YearlyRow};

/// Summary tiles for one dashboard label.
pub fn format_summary(label: &str, summary: &Summary) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== {label} ===\n"));
    out.push_str(&format!("As of: {}\n", fmt_date(summary.date)));
    out.push_str(&format!("{:<14} {:>16}\n", "Cases", fmt_count(summary.total_cases)));
    out.push_str(&format!("{:<14} {:>16}\n", "Deaths", fmt_count(summary.total_deaths)));
    out.push_str(&format!("{:<14} {:>16}\n", "Vaccinations", fmt_count(summary.total_vaccinations)));
    out.push_str(&format!("{:<14} {:>16}\n", "Hospitalized", fmt_count(summary.hosp_patients)));
    out
}

/// Trend table, one column per requested metric.
pub fn format_buckets(series: &BucketSeries, metrics: &[Metric]) -> String {
    let mut out = String::new();
    let kind = match series.granularity {
        Granularity::Daily => "daily",
        Granularity::Monthly => "monthly (last observed date per month)",
    };
    out.push_str(&format!("Trend: {} points, {kind}\n", series.buckets.len()));

    let mut header = format!("{:<10} {:<10}", "bucket", "as of");
    let mut rule = format!("{:-<10} {:-<10}", "", "");
    for m in metrics {
        header.push_str(&format!(" {:>16}", truncate(m.display_name(), 16)));
        rule.push_str(&format!(" {:-<16}", ""));
    }
    out.push_str(header.trim_end());
    out.push('\n');
    out.push_str(&rule);
    out.push('\n');

    for b in &series.buckets {
        let bucket = match series.granularity {
            Granularity::Daily => b.bucket_date.to_string(),
            Granularity::Monthly => b.month_key(),
        };
        let mut line = format!("{:<10} {:<10}", bucket, b.representative_date);
        for &m in metrics {
            line.push_str(&format!(" {:>16}", b.metric(m).map(fmt_count).unwrap_or_else(|| "-".to_string())));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

/// Map list sorted by the selected metric, highest first.
pub fn format_map_list(points: &[&MapPoint], metric: MapMetric, top: Option<usize>) -> String {
    let mut sorted: Vec<&MapPoint> = points.to_vec();
    sorted.sort_by(|a, b| {
        b.value(metric)
            .partial_cmp(&a.value(metric))
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name))
    });
    if let Some(n) = top {
        sorted.truncate(n);
    }

    let label = match metric {
        MapMetric::Cases => "cases",
        MapMetric::Deaths => "deaths",
    };

    let mut out = String::new();
    out.push_str(&format!("{:<5} {:<28} {:>16} {:<10}\n", "iso", "country", label, "as of"));
    out.push_str(&format!("{:-<5} {:-<28} {:-<16} {:-<10}\n", "", "", "", ""));
    for p in sorted {
        let line = format!(
            "{:<5} {:<28} {:>16} {:<10}",
            truncate(&p.iso_code, 5),
            truncate(&p.name, 28),
            fmt_count(p.value(metric)),
            fmt_date(p.date),
        );
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

/// Yearly joined rows with the chosen secondary series; missing values print `-`.
pub fn format_yearly(location: &str, rows: &[YearlyRow], series: SecondarySeries) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== {location}: yearly totals vs {} ===\n", series.display_name()));
    out.push_str(&format!("{:<6} {:>16} {:>14} {:>18}\n", "year", "cases", "deaths", truncate(series.display_name(), 18)));
    out.push_str(&format!("{:-<6} {:-<16} {:-<14} {:-<18}\n", "", "", "", ""));
    for r in rows {
        let secondary = r.secondary(series).map(|v| format!("{v:.2}")).unwrap_or_else(|| "-".to_string());
        out.push_str(&format!(
            "{:<6} {:>16} {:>14} {:>18}\n",
            r.year,
            fmt_count(r.total_cases),
            fmt_count(r.total_deaths),
            secondary
        ));
    }
    out
}

/// One block per series: `year  value%`.
pub fn format_labor_series(title: &str, series: &[LaborSeries]) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== {title} ===\n"));
    for s in series {
        out.push_str(&format!("\n{}:\n", s.name));
        if s.points.is_empty() {
            out.push_str("  (no data)\n");
            continue;
        }
        for p in &s.points {
            out.push_str(&format!("  {:<6} {:>7.2}%\n", p.year, p.value));
        }
    }
    out
}

pub fn format_gender_split(country: &str, split: Option<&GenderSplit>) -> String {
    match split {
        Some(s) => format!(
            "=== {country}: {} by gender, {} ===\n{:<8} {:>7.2}%\n{:<8} {:>7.2}%\n",
            s.measure.display_name(),
            s.year,
            "Male",
            s.male,
            "Female",
            s.female
        ),
        None => format!("=== {country}: no gender data for the selected year ===\n"),
    }
}

/// One line per source; failures and skipped rows are called out.
pub fn format_load_report(report: &LoadReport) -> String {
    let mut out = String::new();
    for s in &report.sources {
        match &s.failure {
            Some(err) => out.push_str(&format!("{:<16} FAILED: {err}\n", s.kind.to_string())),
            None => {
                let mut line = format!("{:<16} {} rows", s.kind.to_string(), s.rows_used);
                if !s.row_errors.is_empty() {
                    line.push_str(&format!(" ({} skipped)", s.row_errors.len()));
                }
                out.push_str(&line);
                out.push('\n');
            }
        }
    }
    out
}

/// Whole number with thousands separators, e.g. `1,234,567`.
pub fn fmt_count(v: f64) -> String {
    if !v.is_finite() {
        return "-".to_string();
    }
    let rounded = v.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0.0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

fn fmt_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
