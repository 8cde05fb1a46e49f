//! CSV ingest and normalization.
//!
//! Turns the three source families into typed records:
//!
//! - epidemiological rows (OWID layout) -> `Observation`
//! - employment / unemployment rows (OECD layout) -> `LaborObservation`
//! - GDP growth rows (World Bank wide layout) -> `GdpRecord`
//!
//! Design goals:
//! - **Strict schema** for the columns each source needs (a missing column is a
//!   load failure)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Documented coercion**: numeric cells go through the per-metric
//!   `MissingPolicy` instead of ad hoc defaults

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;

use crate::domain::{
    AgeGroup, CovidMetrics, GdpRecord, LaborMeasure, LaborObservation, Metric, Observation, Sex, SourceKind,
    parse_gdp_year_column,
};
use crate::error::DataError;

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub id: Option<String>,
    pub message: String,
}

/// Ingest output: parsed records + counters + row errors.
#[derive(Debug, Clone)]
pub struct Ingested<T> {
    pub records: Vec<T>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
}

impl<T> Ingested<T> {
    fn new() -> Self {
        Self {
            records: Vec::new(),
            row_errors: Vec::new(),
            rows_read: 0,
            rows_used: 0,
        }
    }
}

const COVID_LOCATION: &str = "location";
const COVID_CONTINENT: &str = "continent";
const COVID_ISO_CODE: &str = "iso_code";
const COVID_DATE: &str = "date";

const LABOR_COUNTRY: &str = "Reference area";
const LABOR_SEX: &str = "Sex";
const LABOR_AGE: &str = "AGE";
const LABOR_MEASURE: &str = "MEASURE";
const LABOR_TIME: &str = "TIME_PERIOD";
const LABOR_VALUE: &str = "OBS_VALUE";

const GDP_NAME: &str = "Country Name";
const GDP_CODE: &str = "Country Code";

pub fn load_covid(path: &Path) -> Result<Ingested<Observation>, DataError> {
    let file = open_source(path, SourceKind::Covid)?;
    parse_covid(file).map_err(|message| load_error(SourceKind::Covid, path, message))
}

pub fn load_labor(path: &Path, kind: SourceKind) -> Result<Ingested<LaborObservation>, DataError> {
    let file = open_source(path, kind)?;
    parse_labor(file).map_err(|message| load_error(kind, path, message))
}

pub fn load_gdp(path: &Path) -> Result<Ingested<GdpRecord>, DataError> {
    let file = open_source(path, SourceKind::Gdp)?;
    parse_gdp(file).map_err(|message| load_error(SourceKind::Gdp, path, message))
}

/// Parse epidemiological rows.
///
/// Rows without a location are skipped. Rows with an unparsable date are kept
/// with `date = None`; the date-range filter never matches them.
pub fn parse_covid<R: Read>(input: R) -> Result<Ingested<Observation>, String> {
    let mut reader = csv_reader(input);
    let headers = read_headers(&mut reader)?;
    let header_map = HeaderMap::new(&headers);

    header_map.require(&[COVID_LOCATION, COVID_DATE])?;

    // Every column that is not mapped to a typed field is passed through.
    let mut mapped: HashSet<usize> = Metric::ALL
        .iter()
        .filter_map(|m| header_map.index(m.column()))
        .collect();
    for name in [COVID_LOCATION, COVID_CONTINENT, COVID_ISO_CODE, COVID_DATE] {
        if let Some(idx) = header_map.index(name) {
            mapped.insert(idx);
        }
    }

    let mut out = Ingested::new();
    for (idx, result) in reader.records().enumerate() {
        // +2: records() starts after the header, and lines are 1-based.
        let line = idx + 2;
        out.rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                out.row_errors.push(RowError {
                    line,
                    id: None,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        let Some(location) = header_map.get(&record, COVID_LOCATION) else {
            out.row_errors.push(RowError {
                line,
                id: None,
                message: "Missing required value: `location`".to_string(),
            });
            continue;
        };

        let mut metrics = CovidMetrics::default();
        for metric in Metric::ALL {
            metrics.set_raw(metric, parse_number(header_map.get(&record, metric.column())));
        }

        let extra = headers
            .iter()
            .enumerate()
            .filter(|(i, _)| !mapped.contains(i))
            .map(|(i, name)| {
                (
                    clean_header(name).to_string(),
                    record.get(i).map(str::trim).unwrap_or("").to_string(),
                )
            })
            .collect();

        out.records.push(Observation {
            location: location.to_string(),
            continent: header_map.get(&record, COVID_CONTINENT).map(str::to_string),
            iso_code: header_map.get(&record, COVID_ISO_CODE).map(str::to_string),
            date: header_map.get(&record, COVID_DATE).and_then(parse_observation_date),
            metrics,
            extra,
        });
    }

    out.rows_used = out.records.len();
    Ok(out)
}

/// Parse employment or unemployment rows.
pub fn parse_labor<R: Read>(input: R) -> Result<Ingested<LaborObservation>, String> {
    let mut reader = csv_reader(input);
    let headers = read_headers(&mut reader)?;
    let header_map = HeaderMap::new(&headers);

    header_map.require(&[LABOR_COUNTRY, LABOR_SEX, LABOR_AGE, LABOR_MEASURE, LABOR_TIME, LABOR_VALUE])?;

    let mut out = Ingested::new();
    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        out.rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                out.row_errors.push(RowError {
                    line,
                    id: None,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_labor_row(&record, &header_map) {
            Ok(row) => out.records.push(row),
            Err(message) => out.row_errors.push(RowError {
                line,
                id: header_map.get(&record, LABOR_COUNTRY).map(str::to_string),
                message,
            }),
        }
    }

    out.rows_used = out.records.len();
    Ok(out)
}

fn parse_labor_row(record: &StringRecord, header_map: &HeaderMap) -> Result<LaborObservation, String> {
    let country = header_map.get_required(record, LABOR_COUNTRY)?;

    let sex_raw = header_map.get_required(record, LABOR_SEX)?;
    let sex = Sex::parse(sex_raw).ok_or_else(|| format!("Unknown sex '{sex_raw}'."))?;

    let age_raw = header_map.get_required(record, LABOR_AGE)?;
    let age_group = AgeGroup::parse(age_raw).ok_or_else(|| format!("Unsupported age band '{age_raw}'."))?;

    let measure_raw = header_map.get_required(record, LABOR_MEASURE)?;
    let measure = LaborMeasure::parse(measure_raw).ok_or_else(|| format!("Unsupported measure '{measure_raw}'."))?;

    let time_raw = header_map.get_required(record, LABOR_TIME)?;
    let year = parse_year(time_raw).ok_or_else(|| format!("Invalid year '{time_raw}'."))?;

    let value = parse_number(header_map.get(record, LABOR_VALUE))
        .ok_or_else(|| format!("Missing/invalid `{LABOR_VALUE}` value."))?;

    Ok(LaborObservation {
        country: country.to_string(),
        sex,
        age_group,
        measure,
        year,
        value,
    })
}

/// Parse wide-format GDP rows into one record per location.
pub fn parse_gdp<R: Read>(input: R) -> Result<Ingested<GdpRecord>, String> {
    let mut reader = csv_reader(input);
    let headers = read_headers(&mut reader)?;
    let header_map = HeaderMap::new(&headers);

    header_map.require(&[GDP_NAME, GDP_CODE])?;

    // Resolve the year columns once; lookups later go through the map.
    let year_columns: Vec<(usize, i32)> = headers
        .iter()
        .enumerate()
        .filter_map(|(idx, name)| parse_gdp_year_column(clean_header(name)).map(|year| (idx, year)))
        .collect();

    if year_columns.is_empty() {
        return Err("No `YYYY [YRYYYY]` year columns found.".to_string());
    }

    let mut seen = HashSet::new();
    let mut out = Ingested::new();
    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        out.rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                out.row_errors.push(RowError {
                    line,
                    id: None,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        let location = match header_map.get_required(&record, GDP_NAME) {
            Ok(v) => v,
            Err(message) => {
                out.row_errors.push(RowError { line, id: None, message });
                continue;
            }
        };

        // World Bank exports end with footer lines that only fill the name.
        let country_code = match header_map.get_required(&record, GDP_CODE) {
            Ok(v) => v,
            Err(message) => {
                out.row_errors.push(RowError {
                    line,
                    id: Some(location.to_string()),
                    message,
                });
                continue;
            }
        };

        if !seen.insert(location.to_string()) {
            out.row_errors.push(RowError {
                line,
                id: Some(location.to_string()),
                message: "Duplicate location; keeping the first row.".to_string(),
            });
            continue;
        }

        let growth_by_year: BTreeMap<i32, Option<f64>> = year_columns
            .iter()
            .map(|&(col, year)| (year, parse_number(record.get(col).map(str::trim))))
            .collect();

        out.records.push(GdpRecord {
            country_code: country_code.to_string(),
            location: location.to_string(),
            growth_by_year,
        });
    }

    out.rows_used = out.records.len();
    Ok(out)
}

fn open_source(path: &Path, kind: SourceKind) -> Result<File, DataError> {
    File::open(path).map_err(|e| load_error(kind, path, format!("Failed to open file: {e}")))
}

fn load_error(kind: SourceKind, path: &Path, message: String) -> DataError {
    DataError::Load {
        source_kind: kind,
        path: path.to_path_buf(),
        message,
    }
}

fn csv_reader<R: Read>(input: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input)
}

fn read_headers<R: Read>(reader: &mut csv::Reader<R>) -> Result<StringRecord, String> {
    reader
        .headers()
        .map(|h| h.clone())
        .map_err(|e| format!("Failed to read CSV headers: {e}"))
}

/// Header lookup: exact name first, then case-insensitive.
///
/// OECD exports carry both a code column and a label column whose names only
/// differ in case (`AGE` vs `Age`), so exact matches must win. For the folded
/// lookup the first occurrence wins.
struct HeaderMap {
    exact: HashMap<String, usize>,
    folded: HashMap<String, usize>,
}

impl HeaderMap {
    fn new(headers: &StringRecord) -> Self {
        let mut exact = HashMap::new();
        let mut folded = HashMap::new();
        for (idx, name) in headers.iter().enumerate() {
            let name = clean_header(name);
            exact.entry(name.to_string()).or_insert(idx);
            folded.entry(name.to_ascii_lowercase()).or_insert(idx);
        }
        Self { exact, folded }
    }

    fn index(&self, name: &str) -> Option<usize> {
        self.exact
            .get(name)
            .or_else(|| self.folded.get(&name.to_ascii_lowercase()))
            .copied()
    }

    fn require(&self, names: &[&str]) -> Result<(), String> {
        match names.iter().find(|name| self.index(name).is_none()) {
            Some(name) => Err(format!("Missing required column: `{name}`")),
            None => Ok(()),
        }
    }

    /// Trimmed, non-empty cell value.
    fn get<'a>(&self, record: &'a StringRecord, name: &str) -> Option<&'a str> {
        let idx = self.index(name)?;
        record.get(idx).map(str::trim).filter(|s| !s.is_empty())
    }

    fn get_required<'a>(&self, record: &'a StringRecord, name: &str) -> Result<&'a str, String> {
        self.get(record, name)
            .ok_or_else(|| format!("Missing required value: `{name}`"))
    }
}

fn clean_header(name: &str) -> &str {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header. If we don't strip it, schema validation will incorrectly
    // report missing columns.
    name.trim().trim_start_matches('\u{feff}')
}

/// `YYYY-MM-DD`, ignoring any time-of-day suffix.
fn parse_observation_date(s: &str) -> Option<NaiveDate> {
    let day = s.split('T').next().unwrap_or(s).trim();
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

fn parse_year(s: &str) -> Option<i32> {
    let s = s.trim();
    if s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit()) {
        s.parse().ok()
    } else {
        None
    }
}

/// Blank, `..` and other non-numeric cells are `None`.
fn parse_number(s: Option<&str>) -> Option<f64> {
    let v = s?.trim().parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}
