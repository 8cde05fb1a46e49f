//! Shared domain types.
//!
//! Everything here is a plain value: records are produced once per load and
//! never mutated afterwards, and every pipeline stage returns fresh values.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// What to do when a numeric source cell is blank or non-numeric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingPolicy {
    /// Substitute `0`: the value takes part in sums, where "missing" must
    /// contribute nothing.
    Zero,
    /// Keep it missing: the value is only displayed, and a chart must skip the
    /// point rather than plot a false zero.
    Null,
}

impl MissingPolicy {
    pub fn apply(self, raw: Option<f64>) -> Option<f64> {
        match (self, raw) {
            (_, Some(v)) => Some(v),
            (MissingPolicy::Zero, None) => Some(0.0),
            (MissingPolicy::Null, None) => None,
        }
    }
}

/// Numeric epidemiological columns understood by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    TotalCases,
    TotalDeaths,
    TotalVaccinations,
    HospPatients,
    TotalCasesPerMillion,
    TotalDeathsPerMillion,
    GdpPerCapita,
    StringencyIndex,
    HandwashingFacilities,
}

impl Metric {
    pub const COUNT: usize = 9;

    pub const ALL: [Metric; Metric::COUNT] = [
        Metric::TotalCases,
        Metric::TotalDeaths,
        Metric::TotalVaccinations,
        Metric::HospPatients,
        Metric::TotalCasesPerMillion,
        Metric::TotalDeathsPerMillion,
        Metric::GdpPerCapita,
        Metric::StringencyIndex,
        Metric::HandwashingFacilities,
    ];

    /// Source column name (OWID layout).
    pub fn column(self) -> &'static str {
        match self {
            Metric::TotalCases => "total_cases",
            Metric::TotalDeaths => "total_deaths",
            Metric::TotalVaccinations => "total_vaccinations",
            Metric::HospPatients => "hosp_patients",
            Metric::TotalCasesPerMillion => "total_cases_per_million",
            Metric::TotalDeathsPerMillion => "total_deaths_per_million",
            Metric::GdpPerCapita => "gdp_per_capita",
            Metric::StringencyIndex => "stringency_index",
            Metric::HandwashingFacilities => "handwashing_facilities",
        }
    }

    pub fn policy(self) -> MissingPolicy {
        match self {
            Metric::TotalCases
            | Metric::TotalDeaths
            | Metric::TotalVaccinations
            | Metric::HospPatients
            | Metric::TotalCasesPerMillion
            | Metric::TotalDeathsPerMillion => MissingPolicy::Zero,
            Metric::GdpPerCapita | Metric::StringencyIndex | Metric::HandwashingFacilities => MissingPolicy::Null,
        }
    }

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            Metric::TotalCases => "Cases",
            Metric::TotalDeaths => "Deaths",
            Metric::TotalVaccinations => "Vaccinations",
            Metric::HospPatients => "Hospitalized",
            Metric::TotalCasesPerMillion => "Cases / 1M",
            Metric::TotalDeathsPerMillion => "Deaths / 1M",
            Metric::GdpPerCapita => "GDP per capita",
            Metric::StringencyIndex => "Stringency",
            Metric::HandwashingFacilities => "Handwashing",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Metrics that trend buckets carry; the only ones a trend can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum TrendMetric {
    TotalCases,
    TotalDeaths,
    TotalVaccinations,
    HospPatients,
}

impl TrendMetric {
    pub const ALL: [TrendMetric; 4] = [
        TrendMetric::TotalCases,
        TrendMetric::TotalDeaths,
        TrendMetric::TotalVaccinations,
        TrendMetric::HospPatients,
    ];

    pub const fn metric(self) -> Metric {
        match self {
            TrendMetric::TotalCases => Metric::TotalCases,
            TrendMetric::TotalDeaths => Metric::TotalDeaths,
            TrendMetric::TotalVaccinations => Metric::TotalVaccinations,
            TrendMetric::HospPatients => Metric::HospPatients,
        }
    }
}

/// Parsed numeric values of one epidemiological row.
///
/// The raw parse result is kept (so "was this metric reported?" stays
/// answerable) and the per-metric [`MissingPolicy`] is applied on read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CovidMetrics {
    raw: [Option<f64>; Metric::COUNT],
}

impl CovidMetrics {
    pub fn with(mut self, metric: Metric, raw: Option<f64>) -> Self {
        self.set_raw(metric, raw);
        self
    }

    pub fn set_raw(&mut self, metric: Metric, raw: Option<f64>) {
        self.raw[metric.index()] = raw.filter(|v| v.is_finite());
    }

    /// The value as parsed, before any substitution.
    pub fn raw(&self, metric: Metric) -> Option<f64> {
        self.raw[metric.index()]
    }

    pub fn is_reported(&self, metric: Metric) -> bool {
        self.raw(metric).is_some()
    }

    /// The value after applying the metric's missing policy.
    pub fn value(&self, metric: Metric) -> Option<f64> {
        metric.policy().apply(self.raw(metric))
    }

    /// The value as a summand: missing always contributes `0`.
    pub fn summand(&self, metric: Metric) -> f64 {
        self.value(metric).unwrap_or(0.0)
    }
}

/// One epidemiological row after parsing.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub location: String,
    pub continent: Option<String>,
    /// ISO-3166 alpha-3 code (OWID also uses `OWID_*` codes for aggregates).
    pub iso_code: Option<String>,
    /// `None` when the source date did not parse; such rows never match a
    /// date range.
    pub date: Option<NaiveDate>,
    pub metrics: CovidMetrics,
    /// Source columns without a typed mapping, kept verbatim.
    pub extra: BTreeMap<String, String>,
}

impl Observation {
    pub fn year(&self) -> Option<i32> {
        self.date.map(|d| d.year())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Sex {
    Male,
    Female,
    Total,
}

impl Sex {
    /// Accepts both the SDMX codes (`M`, `F`, `_T`) and the labels.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "M" | "Male" | "male" => Some(Sex::Male),
            "F" | "Female" | "female" => Some(Sex::Female),
            "_T" | "T" | "Total" | "total" => Some(Sex::Total),
            _ => None,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Sex::Male => "Male",
            Sex::Female => "Female",
            Sex::Total => "Total",
        }
    }
}

/// Age bands published in the labor tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AgeGroup {
    Y15To24,
    Y25To54,
    Y55To64,
    Y15To64,
}

impl AgeGroup {
    pub const ALL: [AgeGroup; 4] = [AgeGroup::Y15To24, AgeGroup::Y25To54, AgeGroup::Y55To64, AgeGroup::Y15To64];

    pub fn code(self) -> &'static str {
        match self {
            AgeGroup::Y15To24 => "Y15T24",
            AgeGroup::Y25To54 => "Y25T54",
            AgeGroup::Y55To64 => "Y55T64",
            AgeGroup::Y15To64 => "Y15T64",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            AgeGroup::Y15To24 => "15-24",
            AgeGroup::Y25To54 => "25-54",
            AgeGroup::Y55To64 => "55-64",
            AgeGroup::Y15To64 => "15-64",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        AgeGroup::ALL
            .into_iter()
            .find(|g| g.code() == s || s.eq_ignore_ascii_case(&g.label()))
    }

    /// Long label as written in the OECD label columns.
    fn label(self) -> String {
        let (lo, hi) = match self {
            AgeGroup::Y15To24 => (15, 24),
            AgeGroup::Y25To54 => (25, 54),
            AgeGroup::Y55To64 => (55, 64),
            AgeGroup::Y15To64 => (15, 64),
        };
        format!("From {lo} to {hi} years")
    }
}

/// Which labor table a value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum)]
pub enum LaborMeasure {
    /// Employment rate of the working-age population (`EMP_WAP`).
    #[value(name = "employment")]
    EmploymentRate,
    /// Unemployment rate of the labour force (`UNE_LF`).
    #[value(name = "unemployment")]
    UnemploymentRate,
}

impl LaborMeasure {
    pub const ALL: [LaborMeasure; 2] = [LaborMeasure::EmploymentRate, LaborMeasure::UnemploymentRate];

    pub fn code(self) -> &'static str {
        match self {
            LaborMeasure::EmploymentRate => "EMP_WAP",
            LaborMeasure::UnemploymentRate => "UNE_LF",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            LaborMeasure::EmploymentRate => "Employment rate",
            LaborMeasure::UnemploymentRate => "Unemployment rate",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        LaborMeasure::ALL.into_iter().find(|m| m.code() == s)
    }
}

/// One row of the employment/unemployment tables.
///
/// `value` is a percentage and only means something together with the full
/// `(sex, age_group, measure, year)` tuple.
#[derive(Debug, Clone, PartialEq)]
pub struct LaborObservation {
    pub country: String,
    pub sex: Sex,
    pub age_group: AgeGroup,
    pub measure: LaborMeasure,
    pub year: i32,
    pub value: f64,
}

/// GDP growth per year for one country (wide source format).
#[derive(Debug, Clone, PartialEq)]
pub struct GdpRecord {
    pub country_code: String,
    pub location: String,
    /// `None` when the source cell was blank or non-numeric.
    pub growth_by_year: BTreeMap<i32, Option<f64>>,
}

impl GdpRecord {
    pub fn growth(&self, year: i32) -> Option<f64> {
        self.growth_by_year.get(&year).copied().flatten()
    }
}

/// Column header of a year in the GDP source, e.g. `2020 [YR2020]`.
pub fn gdp_year_column(year: i32) -> String {
    format!("{year:04} [YR{year:04}]")
}

/// Inverse of [`gdp_year_column`]; case-insensitive on the `YR` marker.
pub fn parse_gdp_year_column(header: &str) -> Option<i32> {
    let header = header.trim();
    let (year, rest) = header.split_once(' ')?;
    if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let inner = rest.trim().strip_prefix('[')?.strip_suffix(']')?;
    let tagged = inner.get(2..)?;
    if !inner.get(..2)?.eq_ignore_ascii_case("yr") || tagged != year {
        return None;
    }
    year.parse().ok()
}

/// Inclusive calendar-day range, always `start <= end`.
///
/// Fields are private so the ordering can only be established by [`DateRange::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Builds a range, swapping reversed bounds.
    pub fn new(a: NaiveDate, b: NaiveDate) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Whole days between the bounds.
    pub fn span_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

/// One point of a (possibly bucketed) time series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedBucket {
    /// Day for daily points; first day of the month for monthly buckets.
    pub bucket_date: NaiveDate,
    /// Latest observation date actually folded into the bucket.
    pub representative_date: NaiveDate,
    pub metrics: BTreeMap<Metric, f64>,
}

impl AggregatedBucket {
    /// `YYYY-MM` key of the bucket's month.
    pub fn month_key(&self) -> String {
        self.bucket_date.format("%Y-%m").to_string()
    }

    /// `None` for a metric the bucket does not carry.
    pub fn metric(&self, metric: Metric) -> Option<f64> {
        self.metrics.get(&metric).copied()
    }
}

/// Headline numbers for a filtered window ("summary tiles").
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    /// Date of the observation the numbers come from; `None` for empty input.
    pub date: Option<NaiveDate>,
    pub total_cases: f64,
    pub total_deaths: f64,
    pub total_vaccinations: f64,
    pub hosp_patients: f64,
}

impl Summary {
    pub fn from_observation(obs: &Observation) -> Self {
        Self {
            date: obs.date,
            total_cases: obs.metrics.summand(Metric::TotalCases),
            total_deaths: obs.metrics.summand(Metric::TotalDeaths),
            total_vaccinations: obs.metrics.summand(Metric::TotalVaccinations),
            hosp_patients: obs.metrics.summand(Metric::HospPatients),
        }
    }
}

/// Secondary (line) series drawn on top of the yearly bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum SecondarySeries {
    GdpGrowth,
    Stringency,
}

impl SecondarySeries {
    pub fn display_name(self) -> &'static str {
        match self {
            SecondarySeries::GdpGrowth => "GDP growth (%)",
            SecondarySeries::Stringency => "Stringency index",
        }
    }
}

/// One year of the epidemiological/GDP join.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearlyRow {
    pub year: i32,
    pub total_cases: f64,
    pub total_deaths: f64,
    pub stringency_index: Option<f64>,
    pub gdp_growth: Option<f64>,
}

impl YearlyRow {
    pub fn secondary(&self, series: SecondarySeries) -> Option<f64> {
        match series {
            SecondarySeries::GdpGrowth => self.gdp_growth,
            SecondarySeries::Stringency => self.stringency_index,
        }
    }
}

/// Map metric toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum MapMetric {
    Cases,
    Deaths,
}

/// Latest known values for one country on the map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapPoint {
    pub iso_code: String,
    pub name: String,
    pub total_cases: f64,
    pub total_deaths: f64,
    /// `None` when the country has no observation in the window.
    pub date: Option<NaiveDate>,
}

impl MapPoint {
    pub fn value(&self, metric: MapMetric) -> f64 {
        match metric {
            MapMetric::Cases => self.total_cases,
            MapMetric::Deaths => self.total_deaths,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LaborPoint {
    pub year: i32,
    pub value: f64,
}

/// A named labor series (one line of a chart).
#[derive(Debug, Clone, PartialEq)]
pub struct LaborSeries {
    pub name: String,
    pub points: Vec<LaborPoint>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenderSplit {
    pub year: i32,
    pub measure: LaborMeasure,
    pub male: f64,
    pub female: f64,
}

/// Which source file a record set comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Covid,
    Employment,
    Unemployment,
    Gdp,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SourceKind::Covid => "epidemiological",
            SourceKind::Employment => "employment",
            SourceKind::Unemployment => "unemployment",
            SourceKind::Gdp => "GDP",
        };
        f.write_str(name)
    }
}
