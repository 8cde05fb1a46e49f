//! Country geography features for the map view.
//!
//! Only the join key (`id`, an ISO alpha-3 code) and the display name
//! (`properties.name`) are read; geometry is ignored.

use std::collections::BTreeMap;
use std::path::PathBuf;

use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{info, warn};

use crate::domain::{MapPoint, Metric, Observation};
use crate::error::AppError;

pub const GEO_URL_ENV: &str = "COVID_DASH_GEO_URL";
pub const DEFAULT_GEO_URL: &str =
    "https://raw.githubusercontent.com/holtzy/D3-graph-gallery/master/DATA/world.geojson";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoFeature {
    pub iso_code: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeoSource {
    File(PathBuf),
    Url(String),
}

impl GeoSource {
    /// `.env` / `COVID_DASH_GEO_URL`, falling back to the public world GeoJSON.
    pub fn url_from_env() -> Self {
        dotenvy::dotenv().ok();
        GeoSource::Url(std::env::var(GEO_URL_ENV).unwrap_or_else(|_| DEFAULT_GEO_URL.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<RawFeature>,
}

#[derive(Debug, Deserialize)]
struct RawFeature {
    id: Option<serde_json::Value>,
    #[serde(default)]
    properties: RawProperties,
}

#[derive(Debug, Default, Deserialize)]
struct RawProperties {
    name: Option<String>,
}

/// Parse a GeoJSON feature collection. Features without an `id` are dropped.
pub fn parse_features(json: &str) -> Result<Vec<GeoFeature>, AppError> {
    let collection: FeatureCollection =
        serde_json::from_str(json).map_err(|e| AppError::new(4, format!("Invalid GeoJSON: {e}")))?;

    let mut out = Vec::with_capacity(collection.features.len());
    let mut skipped = 0usize;
    for f in collection.features {
        let iso_code = match f.id {
            Some(serde_json::Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
            _ => {
                skipped += 1;
                continue;
            }
        };
        let name = f.properties.name.unwrap_or_else(|| iso_code.clone());
        out.push(GeoFeature { iso_code, name });
    }
    if skipped > 0 {
        warn!(skipped, "geo features without an id were dropped");
    }
    Ok(out)
}

pub fn load_features(source: &GeoSource) -> Result<Vec<GeoFeature>, AppError> {
    let body = match source {
        GeoSource::File(path) => std::fs::read_to_string(path)
            .map_err(|e| AppError::new(4, format!("Failed to read GeoJSON '{}': {e}", path.display())))?,
        GeoSource::Url(url) => fetch(url)?,
    };
    let features = parse_features(&body)?;
    info!(features = features.len(), "loaded geography");
    Ok(features)
}

fn fetch(url: &str) -> Result<String, AppError> {
    let resp = Client::new()
        .get(url)
        .send()
        .map_err(|e| AppError::new(4, format!("Geography request failed: {e}")))?;

    if !resp.status().is_success() {
        return Err(AppError::new(
            4,
            format!("Geography request failed with status {}.", resp.status()),
        ));
    }

    resp.text()
        .map_err(|e| AppError::new(4, format!("Failed to read geography response: {e}")))
}

/// Attach the latest observation to each feature, in feature order.
/// Features without observations get zeros and no date.
pub fn join_latest(features: &[GeoFeature], latest: &BTreeMap<String, &Observation>) -> Vec<MapPoint> {
    features
        .iter()
        .map(|f| match latest.get(&f.iso_code) {
            Some(obs) => MapPoint {
                iso_code: f.iso_code.clone(),
                name: f.name.clone(),
                total_cases: obs.metrics.summand(Metric::TotalCases),
                total_deaths: obs.metrics.summand(Metric::TotalDeaths),
                date: obs.date,
            },
            None => MapPoint {
                iso_code: f.iso_code.clone(),
                name: f.name.clone(),
                total_cases: 0.0,
                total_deaths: 0.0,
                date: None,
            },
        })
        .collect()
}

/// Map points straight from the latest observations, for when no geography
/// is available. Names come from the observation's location.
pub fn points_without_geo(latest: &BTreeMap<String, &Observation>) -> Vec<MapPoint> {
    latest
        .iter()
        .map(|(iso, obs)| MapPoint {
            iso_code: iso.clone(),
            name: obs.location.clone(),
            total_cases: obs.metrics.summand(Metric::TotalCases),
            total_deaths: obs.metrics.summand(Metric::TotalDeaths),
            date: obs.date,
        })
        .collect()
}

/// Case-insensitive substring match on the country name. An empty query
/// keeps every point.
pub fn search<'a>(points: &'a [MapPoint], query: &str) -> Vec<&'a MapPoint> {
    let needle = query.trim().to_lowercase();
    points
        .iter()
        .filter(|p| needle.is_empty() || p.name.to_lowercase().contains(&needle))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CovidMetrics;
    use chrono::NaiveDate;

    const WORLD: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "id": "FRA", "properties": {"name": "France"}, "geometry": null},
            {"type": "Feature", "id": "ATA", "properties": {"name": "Antarctica"}, "geometry": null},
            {"type": "Feature", "properties": {"name": "No id"}, "geometry": null},
            {"type": "Feature", "id": "ZAF", "properties": {"name": "South Africa"}}
        ]
    }"#;

    fn obs(iso: &str, cases: f64) -> Observation {
        Observation {
            location: format!("Land {iso}"),
            continent: None,
            iso_code: Some(iso.to_string()),
            date: NaiveDate::from_ymd_opt(2022, 5, 1),
            metrics: CovidMetrics::default()
                .with(Metric::TotalCases, Some(cases))
                .with(Metric::TotalDeaths, None),
            extra: Default::default(),
        }
    }

    #[test]
    fn parses_ids_and_names() {
        let features = parse_features(WORLD).unwrap();
        let ids: Vec<&str> = features.iter().map(|f| f.iso_code.as_str()).collect();
        assert_eq!(ids, ["FRA", "ATA", "ZAF"]);
        assert_eq!(features[2].name, "South Africa");

        let err = parse_features("not json").unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn join_fills_missing_countries_with_zeros() {
        let features = parse_features(WORLD).unwrap();
        let france = obs("FRA", 1000.0);
        let latest: BTreeMap<String, &Observation> = [("FRA".to_string(), &france)].into_iter().collect();

        let points = join_latest(&features, &latest);
        assert_eq!(points.len(), 3);
        assert_eq!(points[0].total_cases, 1000.0);
        assert_eq!(points[0].total_deaths, 0.0);
        assert!(points[0].date.is_some());
        assert_eq!(points[1].name, "Antarctica");
        assert_eq!(points[1].total_cases, 0.0);
        assert_eq!(points[1].date, None);

        let bare = points_without_geo(&latest);
        assert_eq!(bare.len(), 1);
        assert_eq!(bare[0].name, "Land FRA");
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let features = parse_features(WORLD).unwrap();
        let points = join_latest(&features, &BTreeMap::new());
        let hits: Vec<&str> = search(&points, "AFR").iter().map(|p| p.name.as_str()).collect();
        assert_eq!(hits, ["South Africa"]);
        assert_eq!(search(&points, "  ").len(), 3);
        assert!(search(&points, "atlantis").is_empty());
    }
}
