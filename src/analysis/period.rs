//! Named time periods and their date ranges.

use std::str::FromStr;

use chrono::{Datelike, NaiveDate, TimeDelta};

use crate::domain::DateRange;
use crate::error::DataError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodPreset {
    Last7Days,
    Last15Days,
    Last30Days,
    /// The previous calendar month.
    LastMonth,
    AllTime,
    /// Explicit bounds supplied by the caller.
    Custom,
    /// January 1st through December 31st of the year.
    Year(i32),
}

impl FromStr for PeriodPreset {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let preset = match s {
            "last7days" => PeriodPreset::Last7Days,
            "last15days" => PeriodPreset::Last15Days,
            "last30days" => PeriodPreset::Last30Days,
            "lastMonth" => PeriodPreset::LastMonth,
            "all-time" => PeriodPreset::AllTime,
            "custom" => PeriodPreset::Custom,
            _ if s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit()) => {
                PeriodPreset::Year(s.parse().map_err(|_| DataError::UnknownPeriod(s.to_string()))?)
            }
            _ => return Err(DataError::UnknownPeriod(s.to_string())),
        };
        Ok(preset)
    }
}

impl std::fmt::Display for PeriodPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PeriodPreset::Last7Days => f.write_str("last7days"),
            PeriodPreset::Last15Days => f.write_str("last15days"),
            PeriodPreset::Last30Days => f.write_str("last30days"),
            PeriodPreset::LastMonth => f.write_str("lastMonth"),
            PeriodPreset::AllTime => f.write_str("all-time"),
            PeriodPreset::Custom => f.write_str("custom"),
            PeriodPreset::Year(y) => write!(f, "{y:04}"),
        }
    }
}

impl PeriodPreset {
    /// Resolve to a concrete range relative to `today`.
    ///
    /// `custom_start`/`custom_end` are only read for `Custom`, which needs both.
    pub fn resolve(
        self,
        today: NaiveDate,
        custom_start: Option<NaiveDate>,
        custom_end: Option<NaiveDate>,
    ) -> Result<DateRange, DataError> {
        let range = match self {
            PeriodPreset::Last7Days => DateRange::new(today - TimeDelta::days(7), today),
            PeriodPreset::Last15Days => DateRange::new(today - TimeDelta::days(15), today),
            PeriodPreset::Last30Days => DateRange::new(today - TimeDelta::days(30), today),
            PeriodPreset::LastMonth => {
                let first_this = today - TimeDelta::days(i64::from(today.day0()));
                let last_prev = first_this - TimeDelta::days(1);
                let first_prev = last_prev - TimeDelta::days(i64::from(last_prev.day0()));
                DateRange::new(first_prev, last_prev)
            }
            // NaiveDate's default is 1970-01-01.
            PeriodPreset::AllTime => DateRange::new(NaiveDate::default(), today),
            PeriodPreset::Custom => match (custom_start, custom_end) {
                (Some(start), Some(end)) => DateRange::new(start, end),
                _ => return Err(DataError::IncompleteCustomRange),
            },
            PeriodPreset::Year(year) => {
                let start = NaiveDate::from_ymd_opt(year, 1, 1);
                let end = NaiveDate::from_ymd_opt(year, 12, 31);
                match (start, end) {
                    (Some(start), Some(end)) => DateRange::new(start, end),
                    _ => return Err(DataError::UnknownPeriod(self.to_string())),
                }
            }
        };
        Ok(range)
    }
}

/// Parse a user-supplied bound: `YYYY-MM-DD`, `MM-DD-YYYY` or `MM/DD/YYYY`.
pub fn parse_bound(s: &str) -> Result<NaiveDate, DataError> {
    const FMTS: [&str; 3] = ["%Y-%m-%d", "%m-%d-%Y", "%m/%d/%Y"];
    let s = s.trim();
    FMTS.iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .ok_or_else(|| DataError::InvalidDate(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn identifiers_parse() {
        assert_eq!("last7days".parse::<PeriodPreset>().unwrap(), PeriodPreset::Last7Days);
        assert_eq!("lastMonth".parse::<PeriodPreset>().unwrap(), PeriodPreset::LastMonth);
        assert_eq!("all-time".parse::<PeriodPreset>().unwrap(), PeriodPreset::AllTime);
        assert_eq!("2021".parse::<PeriodPreset>().unwrap(), PeriodPreset::Year(2021));
        assert_eq!(
            "yesterday".parse::<PeriodPreset>().unwrap_err(),
            DataError::UnknownPeriod("yesterday".to_string())
        );
        assert!("202".parse::<PeriodPreset>().is_err());
    }

    #[test]
    fn relative_presets_end_today() {
        let today = day(2024, 3, 15);
        let r = PeriodPreset::Last30Days.resolve(today, None, None).unwrap();
        assert_eq!(r.start(), day(2024, 2, 14));
        assert_eq!(r.end(), today);
        assert_eq!(r.span_days(), 30);

        let r = PeriodPreset::Last7Days.resolve(today, None, None).unwrap();
        assert_eq!(r.start(), day(2024, 3, 8));
    }

    #[test]
    fn last_month_covers_previous_calendar_month() {
        let r = PeriodPreset::LastMonth.resolve(day(2024, 3, 15), None, None).unwrap();
        assert_eq!(r.start(), day(2024, 2, 1));
        assert_eq!(r.end(), day(2024, 2, 29));

        let r = PeriodPreset::LastMonth.resolve(day(2024, 1, 1), None, None).unwrap();
        assert_eq!(r.start(), day(2023, 12, 1));
        assert_eq!(r.end(), day(2023, 12, 31));
    }

    #[test]
    fn year_and_all_time() {
        let r = PeriodPreset::Year(2021).resolve(day(2024, 3, 15), None, None).unwrap();
        assert_eq!((r.start(), r.end()), (day(2021, 1, 1), day(2021, 12, 31)));

        let r = PeriodPreset::AllTime.resolve(day(2024, 3, 15), None, None).unwrap();
        assert_eq!(r.start(), day(1970, 1, 1));
    }

    #[test]
    fn custom_requires_both_bounds_and_normalizes_order() {
        let today = day(2024, 3, 15);
        assert_eq!(
            PeriodPreset::Custom.resolve(today, Some(day(2021, 1, 1)), None).unwrap_err(),
            DataError::IncompleteCustomRange
        );
        let r = PeriodPreset::Custom
            .resolve(today, Some(day(2021, 5, 1)), Some(day(2021, 1, 1)))
            .unwrap();
        assert_eq!((r.start(), r.end()), (day(2021, 1, 1), day(2021, 5, 1)));
    }

    #[test]
    fn bounds_accept_iso_and_us_formats() {
        assert_eq!(parse_bound("2021-03-10").unwrap(), day(2021, 3, 10));
        assert_eq!(parse_bound("03-10-2021").unwrap(), day(2021, 3, 10));
        assert_eq!(parse_bound("03/10/2021").unwrap(), day(2021, 3, 10));
        assert!(matches!(parse_bound("10.03.2021"), Err(DataError::InvalidDate(_))));
    }
}
