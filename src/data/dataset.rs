//! Loaded record sets and the load step that produces them.

use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::domain::{GdpRecord, LaborObservation, Observation, SourceKind};
use crate::error::DataError;
use crate::io::ingest::{self, Ingested, RowError};

pub const DATA_DIR_ENV: &str = "COVID_DASH_DATA_DIR";
const DEFAULT_DATA_DIR: &str = "data";

const COVID_FILE: &str = "owid-covid-data.csv";
const EMPLOYMENT_FILE: &str = "employment.csv";
const UNEMPLOYMENT_FILE: &str = "unemployment.csv";
const GDP_FILE: &str = "gdp.csv";

/// Where the four source files live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    pub covid: PathBuf,
    pub employment: PathBuf,
    pub unemployment: PathBuf,
    pub gdp: PathBuf,
}

impl DataPaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            covid: dir.join(COVID_FILE),
            employment: dir.join(EMPLOYMENT_FILE),
            unemployment: dir.join(UNEMPLOYMENT_FILE),
            gdp: dir.join(GDP_FILE),
        }
    }

    /// Resolve the data directory: explicit override, then `.env` /
    /// `COVID_DASH_DATA_DIR`, then `./data`.
    pub fn from_env(dir_override: Option<&Path>) -> Self {
        if let Some(dir) = dir_override {
            return Self::in_dir(dir);
        }
        dotenvy::dotenv().ok();
        let dir = std::env::var(DATA_DIR_ENV).unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string());
        Self::in_dir(Path::new(&dir))
    }
}

/// Outcome of loading one source file.
#[derive(Debug, Clone)]
pub struct SourceLoad {
    pub kind: SourceKind,
    pub path: PathBuf,
    pub rows_read: usize,
    pub rows_used: usize,
    pub row_errors: Vec<RowError>,
    /// Set when the file could not be read at all; its record set is empty.
    pub failure: Option<DataError>,
}

#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub sources: Vec<SourceLoad>,
}

impl LoadReport {
    pub fn failures(&self) -> impl Iterator<Item = &DataError> {
        self.sources.iter().filter_map(|s| s.failure.as_ref())
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }
}

/// Immutable record sets for one session.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub covid: Vec<Observation>,
    /// Employment and unemployment rows, in that order.
    pub labor: Vec<LaborObservation>,
    pub gdp: Vec<GdpRecord>,
    pub report: LoadReport,
}

impl Dataset {
    pub fn gdp_for(&self, location: &str) -> Option<&GdpRecord> {
        self.gdp.iter().find(|r| r.location == location)
    }
}

/// Load every source. Never fails: a source that cannot be read is logged,
/// recorded in the report, and leaves its record set empty.
pub fn load_dataset(paths: &DataPaths) -> Dataset {
    let mut report = LoadReport::default();

    let mut labor = load_source(&mut report, SourceKind::Employment, &paths.employment, |p| {
        ingest::load_labor(p, SourceKind::Employment)
    });
    labor.extend(load_source(&mut report, SourceKind::Unemployment, &paths.unemployment, |p| {
        ingest::load_labor(p, SourceKind::Unemployment)
    }));
    let covid = load_source(&mut report, SourceKind::Covid, &paths.covid, ingest::load_covid);
    let gdp = load_source(&mut report, SourceKind::Gdp, &paths.gdp, ingest::load_gdp);

    Dataset {
        covid,
        labor,
        gdp,
        report,
    }
}

fn load_source<T, F>(report: &mut LoadReport, kind: SourceKind, path: &Path, load: F) -> Vec<T>
where
    F: FnOnce(&Path) -> Result<Ingested<T>, DataError>,
{
    match load(path) {
        Ok(ingested) => {
            info!(
                source = %kind,
                path = %path.display(),
                rows_read = ingested.rows_read,
                rows_used = ingested.rows_used,
                "loaded source"
            );
            if !ingested.row_errors.is_empty() {
                warn!(
                    source = %kind,
                    skipped = ingested.row_errors.len(),
                    first_line = ingested.row_errors[0].line,
                    first_error = %ingested.row_errors[0].message,
                    "skipped invalid rows"
                );
            }
            report.sources.push(SourceLoad {
                kind,
                path: path.to_path_buf(),
                rows_read: ingested.rows_read,
                rows_used: ingested.rows_used,
                row_errors: ingested.row_errors,
                failure: None,
            });
            ingested.records
        }
        Err(err) => {
            error!(source = %kind, path = %path.display(), "{err}");
            report.sources.push(SourceLoad {
                kind,
                path: path.to_path_buf(),
                rows_read: 0,
                rows_used: 0,
                row_errors: Vec::new(),
                failure: Some(err),
            });
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn failed_sources_leave_empty_sets_and_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(COVID_FILE),
            "location,date,total_cases\nTestland,2021-01-01,10\n",
        )
        .unwrap();

        let dataset = load_dataset(&DataPaths::in_dir(dir.path()));
        assert_eq!(dataset.covid.len(), 1);
        assert!(dataset.labor.is_empty());
        assert!(dataset.gdp.is_empty());

        assert_eq!(dataset.report.sources.len(), 4);
        assert!(dataset.report.has_failures());
        assert_eq!(dataset.report.failures().count(), 3);
        let covid = dataset
            .report
            .sources
            .iter()
            .find(|s| s.kind == SourceKind::Covid)
            .unwrap();
        assert!(covid.failure.is_none());
        assert_eq!(covid.rows_used, 1);
    }

    #[test]
    fn explicit_dir_wins_over_environment() {
        let paths = DataPaths::from_env(Some(Path::new("/srv/dash")));
        assert_eq!(paths.gdp, PathBuf::from("/srv/dash/gdp.csv"));
        assert_eq!(paths.covid, PathBuf::from("/srv/dash/owid-covid-data.csv"));
    }
}
