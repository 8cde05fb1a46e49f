//! Yearly join of epidemiological totals with GDP growth.
//!
//! The output always has one row per year of the requested range, in
//! ascending order, so every location shares the same chart axis.

use std::ops::RangeInclusive;

use crate::analysis::{filter, latest};
use crate::domain::{GdpRecord, Metric, Observation, YearlyRow};

/// Default year axis of the GDP chart.
pub const DEFAULT_YEARS: RangeInclusive<i32> = 2015..=2024;

/// Join observations and a GDP record that already belong to one location.
///
/// For each year the latest observation of that year supplies the counts
/// (`0` when there is none) and the stringency index (`None` when there is
/// none). GDP growth is `None` when the record or its cell is missing.
pub fn join_yearly<'a, I>(observations: I, gdp: Option<&GdpRecord>, years: RangeInclusive<i32>) -> Vec<YearlyRow>
where
    I: IntoIterator<Item = &'a Observation>,
{
    let by_year = latest::latest_by_year(observations);

    years
        .map(|year| {
            let obs = by_year.get(&year);
            YearlyRow {
                year,
                total_cases: obs.map_or(0.0, |o| o.metrics.summand(Metric::TotalCases)),
                total_deaths: obs.map_or(0.0, |o| o.metrics.summand(Metric::TotalDeaths)),
                stringency_index: obs.and_then(|o| o.metrics.value(Metric::StringencyIndex)),
                gdp_growth: gdp.and_then(|g| g.growth(year)),
            }
        })
        .collect()
}

/// Restrict both datasets to `location`, then join.
pub fn join_location(
    covid: &[Observation],
    gdp: &[GdpRecord],
    location: &str,
    years: RangeInclusive<i32>,
) -> Vec<YearlyRow> {
    let observations = filter::by_location(covid, Some(location));
    let record = gdp.iter().find(|g| g.location == location);
    join_yearly(observations, record, years)
}
