//! Labor chart series: age breakdown, measure trends and gender split.

use crate::analysis::filter::{LaborFilter, by_category};
use crate::domain::{AgeGroup, GenderSplit, LaborMeasure, LaborObservation, LaborPoint, LaborSeries, Sex};

/// Bands shown side by side in the age breakdown.
pub const BREAKDOWN_AGE_GROUPS: [AgeGroup; 3] = [AgeGroup::Y15To24, AgeGroup::Y25To54, AgeGroup::Y55To64];

/// One series per age band for `measure`, both sexes combined.
/// Bands without data still get an (empty) series.
pub fn age_breakdown(records: &[LaborObservation], country: &str, measure: LaborMeasure) -> Vec<LaborSeries> {
    let filter = LaborFilter {
        country: Some(country.to_string()),
        measure: Some(measure),
        sex: Some(Sex::Total),
        age_groups: BREAKDOWN_AGE_GROUPS.to_vec(),
        year: None,
    };
    let rows = by_category(records, &filter);

    BREAKDOWN_AGE_GROUPS
        .iter()
        .map(|&band| LaborSeries {
            name: band.display_name().to_string(),
            points: points(rows.iter().copied().filter(|r| r.age_group == band)),
        })
        .collect()
}

/// Employment then unemployment for the whole working-age population.
pub fn measure_trends(records: &[LaborObservation], country: &str) -> Vec<LaborSeries> {
    LaborMeasure::ALL
        .iter()
        .map(|&measure| {
            let filter = LaborFilter {
                country: Some(country.to_string()),
                measure: Some(measure),
                sex: Some(Sex::Total),
                age_groups: vec![AgeGroup::Y15To64],
                year: None,
            };
            LaborSeries {
                name: measure.display_name().to_string(),
                points: points(by_category(records, &filter)),
            }
        })
        .collect()
}

/// Male and female values for one year, or `None` if either is absent.
pub fn gender_split(
    records: &[LaborObservation],
    country: &str,
    year: i32,
    measure: LaborMeasure,
) -> Option<GenderSplit> {
    let filter = LaborFilter {
        country: Some(country.to_string()),
        measure: Some(measure),
        sex: None,
        age_groups: vec![AgeGroup::Y15To64],
        year: Some(year),
    };
    let rows = by_category(records, &filter);
    let value_for = |sex: Sex| rows.iter().find(|r| r.sex == sex).map(|r| r.value);

    Some(GenderSplit {
        year,
        measure,
        male: value_for(Sex::Male)?,
        female: value_for(Sex::Female)?,
    })
}

/// Years with any labor data for `country`, ascending and distinct.
pub fn years_for(records: &[LaborObservation], country: &str) -> Vec<i32> {
    let mut years: Vec<i32> = records.iter().filter(|r| r.country == country).map(|r| r.year).collect();
    years.sort_unstable();
    years.dedup();
    years
}

fn points<'a>(rows: impl IntoIterator<Item = &'a LaborObservation>) -> Vec<LaborPoint> {
    let mut points: Vec<LaborPoint> = rows
        .into_iter()
        .map(|r| LaborPoint { year: r.year, value: r.value })
        .collect();
    // Stable: duplicate years keep source order.
    points.sort_by_key(|p| p.year);
    points
}
