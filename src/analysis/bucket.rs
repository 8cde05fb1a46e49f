//! Time bucketing for trend charts.
//!
//! Short windows keep daily detail. Longer windows collapse to one bucket per
//! calendar month holding the values of the month's last observed date,
//! summed across the rows sharing that date.
//!
//! The source metrics are running totals. A bucket must not sum the whole
//! month, which would count each day's cumulative total again.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use tracing::debug;

use crate::domain::{AggregatedBucket, Metric, Observation, TrendMetric};

/// Longest window (in days) still shown at daily granularity.
pub const DAILY_DETAIL_MAX_DAYS: i64 = 90;

/// Metrics carried into trend buckets, in [`TrendMetric`] order.
pub const BUCKET_METRICS: [Metric; 4] = [
    TrendMetric::TotalCases.metric(),
    TrendMetric::TotalDeaths.metric(),
    TrendMetric::TotalVaccinations.metric(),
    TrendMetric::HospPatients.metric(),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Daily,
    Monthly,
}

impl Granularity {
    pub fn for_span(span_days: i64) -> Self {
        if span_days <= DAILY_DETAIL_MAX_DAYS {
            Granularity::Daily
        } else {
            Granularity::Monthly
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BucketSeries {
    pub granularity: Granularity,
    pub buckets: Vec<AggregatedBucket>,
}

/// Shape `records` for a window of `span_days`.
///
/// Daily: one point per dated record, in input order. Monthly: one bucket per
/// calendar month present, ascending. Undated records are dropped in both
/// cases since they cannot be placed on a time axis.
pub fn aggregate<'a, I>(records: I, span_days: i64) -> BucketSeries
where
    I: IntoIterator<Item = &'a Observation>,
{
    let granularity = Granularity::for_span(span_days);
    let buckets = match granularity {
        Granularity::Daily => daily(records),
        Granularity::Monthly => monthly(records),
    };
    debug!(span_days, ?granularity, buckets = buckets.len(), "aggregated trend");
    BucketSeries { granularity, buckets }
}

fn daily<'a, I>(records: I) -> Vec<AggregatedBucket>
where
    I: IntoIterator<Item = &'a Observation>,
{
    records
        .into_iter()
        .filter_map(|r| {
            let date = r.date?;
            Some(AggregatedBucket {
                bucket_date: date,
                representative_date: date,
                metrics: BUCKET_METRICS
                    .iter()
                    .map(|&m| (m, r.metrics.summand(m)))
                    .collect(),
            })
        })
        .collect()
}

fn monthly<'a, I>(records: I) -> Vec<AggregatedBucket>
where
    I: IntoIterator<Item = &'a Observation>,
{
    let mut by_month: BTreeMap<(i32, u32), Vec<(NaiveDate, &Observation)>> = BTreeMap::new();
    for r in records {
        if let Some(date) = r.date {
            by_month
                .entry((date.year(), date.month()))
                .or_default()
                .push((date, r));
        }
    }

    by_month
        .into_iter()
        .filter_map(|((year, month), rows)| {
            let last = rows.iter().map(|(d, _)| *d).max()?;
            let bucket_date = NaiveDate::from_ymd_opt(year, month, 1)?;

            let mut metrics: BTreeMap<Metric, f64> = BUCKET_METRICS.iter().map(|&m| (m, 0.0)).collect();
            for (_, r) in rows.iter().filter(|(d, _)| *d == last) {
                for (metric, total) in metrics.iter_mut() {
                    *total += r.metrics.summand(*metric);
                }
            }

            Some(AggregatedBucket {
                bucket_date,
                representative_date: last,
                metrics,
            })
        })
        .collect()
}
