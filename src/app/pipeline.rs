//! Shared dashboard pipeline used by every CLI view.
//!
//! Per filter change the dashboard recomputes three things from the same
//! loaded dataset:
//! summary tiles (continent -> location -> period -> latest),
//! the trend series (combined filter -> time buckets),
//! and the map values (period only -> latest per ISO code).

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;

use crate::analysis::bucket::{self, BucketSeries};
use crate::analysis::filter::{self, ObservationFilter};
use crate::analysis::latest;
use crate::analysis::period::PeriodPreset;
use crate::data::{DataHandle, Dataset};
use crate::domain::{DateRange, Observation, Summary};
use crate::error::DataError;

/// Everything the user can pick on the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardQuery {
    pub continent: Option<String>,
    pub location: Option<String>,
    pub period: PeriodPreset,
    pub custom_start: Option<NaiveDate>,
    pub custom_end: Option<NaiveDate>,
    pub today: NaiveDate,
}

impl DashboardQuery {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            continent: None,
            location: None,
            period: PeriodPreset::AllTime,
            custom_start: None,
            custom_end: None,
            today,
        }
    }

    pub fn range(&self) -> Result<DateRange, DataError> {
        self.period.resolve(self.today, self.custom_start, self.custom_end)
    }
}

/// All computed outputs for one query; borrows from the dataset.
#[derive(Debug, Clone)]
pub struct DashboardView<'a> {
    pub range: DateRange,
    pub summary: Summary,
    pub trend: BucketSeries,
    /// Map values: latest observation per ISO code within the period,
    /// ignoring the continent/location selection.
    pub latest_by_iso: BTreeMap<String, &'a Observation>,
    /// `"<location or continent or World> (<period>)"`.
    pub label: String,
}

pub fn build_dashboard<'a>(dataset: &'a Dataset, query: &DashboardQuery) -> Result<DashboardView<'a>, DataError> {
    let range = query.range()?;

    // Summary: filters chained in the dashboard's order.
    let by_continent = filter::by_continent(&dataset.covid, query.continent.as_deref());
    let by_location = filter::by_location(by_continent, query.location.as_deref());
    let windowed = filter::by_date_range(by_location, &range);
    let summary = latest::summarize(windowed);

    // Trend: same selection, one pass.
    let selection = ObservationFilter {
        continent: query.continent.clone(),
        location: query.location.clone(),
        range: Some(range),
    };
    let trend = bucket::aggregate(selection.apply(&dataset.covid), range.span_days());

    let map_rows = filter::by_date_range(&dataset.covid, &range);
    let latest_by_iso = latest::latest_by_iso(map_rows);

    let label = format!("{} ({})", scope_label(query), query.period);
    debug!(%label, start = %range.start(), end = %range.end(), "built dashboard");

    Ok(DashboardView {
        range,
        summary,
        trend,
        latest_by_iso,
        label,
    })
}

/// Same as [`build_dashboard`] but against a handle that may still be loading.
pub fn build_from_handle(handle: &DataHandle, query: &DashboardQuery) -> Result<OwnedDashboard, DataError> {
    let dataset = handle.get()?;
    let view = build_dashboard(&dataset, query)?;
    Ok(OwnedDashboard {
        range: view.range,
        summary: view.summary,
        trend: view.trend,
        latest_by_iso: view
            .latest_by_iso
            .into_iter()
            .map(|(iso, obs)| (iso, obs.clone()))
            .collect(),
        label: view.label,
        dataset: Arc::clone(&dataset),
    })
}

/// A [`DashboardView`] detached from the borrow of the dataset.
#[derive(Debug, Clone)]
pub struct OwnedDashboard {
    pub range: DateRange,
    pub summary: Summary,
    pub trend: BucketSeries,
    pub latest_by_iso: BTreeMap<String, Observation>,
    pub label: String,
    pub dataset: Arc<Dataset>,
}

fn scope_label(query: &DashboardQuery) -> &str {
    fn non_empty(v: &Option<String>) -> Option<&str> {
        v.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
    non_empty(&query.location)
        .or_else(|| non_empty(&query.continent))
        .unwrap_or("World")
}
