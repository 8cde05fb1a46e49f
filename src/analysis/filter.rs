//! Record filters.
//!
//! Every filter borrows its input, keeps input order, and returns a new
//! `Vec` of references. An absent (or empty) criterion keeps everything.
//! Filters compose by feeding one result into the next.

use crate::domain::{AgeGroup, DateRange, LaborMeasure, LaborObservation, Metric, Observation, Sex};

pub fn by_continent<'a, I>(records: I, continent: Option<&str>) -> Vec<&'a Observation>
where
    I: IntoIterator<Item = &'a Observation>,
{
    match criterion(continent) {
        Some(c) => records
            .into_iter()
            .filter(|r| r.continent.as_deref() == Some(c))
            .collect(),
        None => records.into_iter().collect(),
    }
}

pub fn by_location<'a, I>(records: I, location: Option<&str>) -> Vec<&'a Observation>
where
    I: IntoIterator<Item = &'a Observation>,
{
    match criterion(location) {
        Some(l) => records.into_iter().filter(|r| r.location == l).collect(),
        None => records.into_iter().collect(),
    }
}

/// Inclusive on both ends, at day granularity. Undated rows never match.
pub fn by_date_range<'a, I>(records: I, range: &DateRange) -> Vec<&'a Observation>
where
    I: IntoIterator<Item = &'a Observation>,
{
    records
        .into_iter()
        .filter(|r| r.date.is_some_and(|d| range.contains(d)))
        .collect()
}

/// Keeps rows where `metric` was actually reported in the source.
pub fn with_metric<'a, I>(records: I, metric: Metric) -> Vec<&'a Observation>
where
    I: IntoIterator<Item = &'a Observation>,
{
    records
        .into_iter()
        .filter(|r| r.metrics.is_reported(metric))
        .collect()
}

/// Conjunction of the observation filters, applied in a single pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservationFilter {
    pub continent: Option<String>,
    pub location: Option<String>,
    pub range: Option<DateRange>,
}

impl ObservationFilter {
    pub fn matches(&self, r: &Observation) -> bool {
        if let Some(c) = criterion(self.continent.as_deref()) {
            if r.continent.as_deref() != Some(c) {
                return false;
            }
        }
        if let Some(l) = criterion(self.location.as_deref()) {
            if r.location != l {
                return false;
            }
        }
        match &self.range {
            Some(range) => r.date.is_some_and(|d| range.contains(d)),
            None => true,
        }
    }

    pub fn apply<'a, I>(&self, records: I) -> Vec<&'a Observation>
    where
        I: IntoIterator<Item = &'a Observation>,
    {
        records.into_iter().filter(|r| self.matches(r)).collect()
    }
}

/// Category selector for labor rows. Empty `age_groups` means all bands.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LaborFilter {
    pub country: Option<String>,
    pub measure: Option<LaborMeasure>,
    pub sex: Option<Sex>,
    pub age_groups: Vec<AgeGroup>,
    pub year: Option<i32>,
}

impl LaborFilter {
    pub fn matches(&self, r: &LaborObservation) -> bool {
        criterion(self.country.as_deref()).is_none_or(|c| r.country == c)
            && self.measure.is_none_or(|m| r.measure == m)
            && self.sex.is_none_or(|s| r.sex == s)
            && (self.age_groups.is_empty() || self.age_groups.contains(&r.age_group))
            && self.year.is_none_or(|y| r.year == y)
    }
}

pub fn by_category<'a, I>(records: I, filter: &LaborFilter) -> Vec<&'a LaborObservation>
where
    I: IntoIterator<Item = &'a LaborObservation>,
{
    records.into_iter().filter(|r| filter.matches(r)).collect()
}

/// Distinct non-empty continents, in first-seen order.
pub fn distinct_continents(records: &[Observation]) -> Vec<String> {
    distinct(records.iter().filter_map(|r| r.continent.as_deref()))
}

/// Distinct locations of one continent, in first-seen order.
pub fn locations_in(records: &[Observation], continent: &str) -> Vec<String> {
    distinct(
        records
            .iter()
            .filter(|r| r.continent.as_deref() == Some(continent))
            .map(|r| r.location.as_str()),
    )
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    values
        .filter(|v| !v.is_empty() && seen.insert(*v))
        .map(str::to_string)
        .collect()
}

fn criterion(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
