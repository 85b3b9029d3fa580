//! Mapping between calendar dates and storage directory names
//!
//! A [`NamingConvention`] holds one strftime pattern per [`Granularity`] and
//! the granularity at which directories actually exist in storage (the
//! *layout*). Patterns are validated once at construction, so formatting is
//! infallible afterwards.

use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write};
use thiserror::Error;

use crate::config::NamingConfig;

#[derive(Debug, Error)]
pub enum NamingError {
    #[error("invalid {granularity} pattern '{pattern}': {reason}")]
    InvalidPattern {
        granularity: Granularity,
        pattern: String,
        reason: String,
    },

    #[error("directory name '{0}' does not match the naming convention")]
    Unparseable(String),
}

pub type Result<T> = std::result::Result<T, NamingError>;

/// Time granularity of a directory, ordered coarse to fine
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Year,
    Month,
    #[default]
    Day,
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Granularity::Year => "year",
            Granularity::Month => "month",
            Granularity::Day => "day",
        };
        f.write_str(name)
    }
}

// Joins a pattern with the fields its granularity leaves out, so chrono can
// build a complete date from a month or year name.
const FILL_SEPARATOR: char = '|';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingConvention {
    layout: Granularity,
    year: String,
    month: String,
    day: String,
}

impl NamingConvention {
    pub fn new(
        layout: Granularity,
        year: impl Into<String>,
        month: impl Into<String>,
        day: impl Into<String>,
    ) -> Result<Self> {
        let convention = Self {
            layout,
            year: year.into(),
            month: month.into(),
            day: day.into(),
        };

        for granularity in [Granularity::Year, Granularity::Month, Granularity::Day] {
            convention.check_pattern(granularity)?;
        }

        Ok(convention)
    }

    pub fn from_config(config: &NamingConfig) -> Result<Self> {
        Self::new(config.granularity, &config.year, &config.month, &config.day)
    }

    /// Zero-padded `YYYY`, `YYYY-MM`, `YYYY-MM-DD` names with a daily layout
    pub fn iso() -> Self {
        Self {
            layout: Granularity::Day,
            year: "%Y".to_string(),
            month: "%Y-%m".to_string(),
            day: "%Y-%m-%d".to_string(),
        }
    }

    pub fn layout(&self) -> Granularity {
        self.layout
    }

    pub fn pattern(&self, granularity: Granularity) -> &str {
        match granularity {
            Granularity::Year => &self.year,
            Granularity::Month => &self.month,
            Granularity::Day => &self.day,
        }
    }

    pub fn to_directory_name(&self, date: NaiveDate, granularity: Granularity) -> String {
        date.format(self.pattern(granularity)).to_string()
    }

    /// Name of the layout directory that holds `date`
    pub fn directory_for(&self, date: NaiveDate) -> String {
        self.to_directory_name(date, self.layout)
    }

    /// Parse a directory name back into the first day it covers.
    ///
    /// Day patterns are tried first, then month, then year.
    pub fn from_directory_name(&self, name: &str) -> Result<NaiveDate> {
        [Granularity::Day, Granularity::Month, Granularity::Year]
            .into_iter()
            .find_map(|granularity| self.parse_as(name, granularity))
            .ok_or_else(|| NamingError::Unparseable(name.to_string()))
    }

    fn parse_as(&self, name: &str, granularity: Granularity) -> Option<NaiveDate> {
        let pattern = self.pattern(granularity);
        let (input, format) = match granularity {
            Granularity::Day => (name.to_string(), pattern.to_string()),
            Granularity::Month => (
                format!("{name}{FILL_SEPARATOR}01"),
                format!("{pattern}{FILL_SEPARATOR}%d"),
            ),
            Granularity::Year => (
                format!("{name}{FILL_SEPARATOR}01{FILL_SEPARATOR}01"),
                format!("{pattern}{FILL_SEPARATOR}%m{FILL_SEPARATOR}%d"),
            ),
        };

        NaiveDate::parse_from_str(&input, &format).ok()
    }

    fn check_pattern(&self, granularity: Granularity) -> Result<()> {
        let pattern = self.pattern(granularity);
        let invalid = |reason: &str| NamingError::InvalidPattern {
            granularity,
            pattern: pattern.to_string(),
            reason: reason.to_string(),
        };

        if pattern.is_empty() {
            return Err(invalid("pattern is empty"));
        }
        if pattern.contains(FILL_SEPARATOR) {
            return Err(invalid("pattern may not contain '|'"));
        }
        if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
            return Err(invalid("unrecognized format specifier"));
        }

        // Last day of a leap February exercises both width and range.
        let sample = match granularity {
            Granularity::Year => NaiveDate::from_ymd_opt(2016, 1, 1),
            Granularity::Month => NaiveDate::from_ymd_opt(2016, 2, 1),
            Granularity::Day => NaiveDate::from_ymd_opt(2016, 2, 29),
        }
        .ok_or_else(|| invalid("sample date out of range"))?;

        // Time fields (%H, %M, %s) have nothing to read from a date
        let mut name = String::new();
        write!(name, "{}", sample.format(pattern))
            .map_err(|_| invalid("pattern uses time fields a calendar date does not have"))?;

        match self.parse_as(&name, granularity) {
            Some(parsed) if parsed == sample => Ok(()),
            _ => Err(invalid(&format!(
                "'{name}' does not parse back to {sample} (pattern must identify the whole {granularity})"
            ))),
        }
    }
}

impl Default for NamingConvention {
    fn default() -> Self {
        Self::iso()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn camus() -> NamingConvention {
        NamingConvention::new(Granularity::Day, "d_%Y", "d_%Y%m", "d_%Y%m%d").unwrap()
    }

    #[test]
    fn test_iso_names() {
        let convention = NamingConvention::iso();
        let d = date(2016, 3, 9);

        assert_eq!(convention.to_directory_name(d, Granularity::Year), "2016");
        assert_eq!(convention.to_directory_name(d, Granularity::Month), "2016-03");
        assert_eq!(convention.to_directory_name(d, Granularity::Day), "2016-03-09");
        assert_eq!(convention.directory_for(d), "2016-03-09");
    }

    #[test]
    fn test_day_names_round_trip() {
        for convention in [NamingConvention::iso(), camus()] {
            let mut d = date(2015, 12, 25);
            let end = date(2016, 3, 5);
            while d <= end {
                let name = convention.to_directory_name(d, Granularity::Day);
                assert_eq!(convention.from_directory_name(&name).unwrap(), d);
                d = d.succ_opt().unwrap();
            }
        }
    }

    #[test]
    fn test_coarse_names_parse_to_period_start() {
        let convention = camus();
        assert_eq!(convention.from_directory_name("d_201602").unwrap(), date(2016, 2, 1));
        assert_eq!(convention.from_directory_name("d_2016").unwrap(), date(2016, 1, 1));

        let iso = NamingConvention::iso();
        assert_eq!(iso.from_directory_name("2016-02").unwrap(), date(2016, 2, 1));
        assert_eq!(iso.from_directory_name("2016").unwrap(), date(2016, 1, 1));
    }

    #[test]
    fn test_unparseable_names() {
        let convention = NamingConvention::iso();
        for name in ["", "bar", "2016-13-01", "2015-02-29", "2016-03-09-extra", "d_20160309"] {
            assert!(
                matches!(
                    convention.from_directory_name(name),
                    Err(NamingError::Unparseable(_))
                ),
                "expected '{name}' to be rejected"
            );
        }
    }

    #[test]
    fn test_month_layout_collapses_days() {
        let convention =
            NamingConvention::new(Granularity::Month, "%Y", "%Y-%m", "%Y-%m-%d").unwrap();
        assert_eq!(convention.directory_for(date(2016, 2, 19)), "2016-02");
        assert_eq!(convention.directory_for(date(2016, 2, 29)), "2016-02");
    }

    #[test]
    fn test_invalid_specifier_rejected() {
        let result = NamingConvention::new(Granularity::Day, "%Y", "%Y-%m", "%Y-%Q");
        assert!(matches!(
            result,
            Err(NamingError::InvalidPattern {
                granularity: Granularity::Day,
                ..
            })
        ));
    }

    #[test]
    fn test_pattern_missing_field_rejected() {
        // A day pattern without %d cannot identify a day
        let result = NamingConvention::new(Granularity::Day, "%Y", "%Y-%m", "%Y-%m");
        assert!(matches!(result, Err(NamingError::InvalidPattern { .. })));

        let result = NamingConvention::new(Granularity::Day, "", "%Y-%m", "%Y-%m-%d");
        assert!(matches!(result, Err(NamingError::InvalidPattern { .. })));
    }

    #[test]
    fn test_time_fields_rejected() {
        let result = NamingConvention::new(Granularity::Day, "%Y", "%Y%m", "d_%Y%m%d-%H");
        assert!(matches!(
            result,
            Err(NamingError::InvalidPattern {
                granularity: Granularity::Day,
                ..
            })
        ));

        let result = NamingConvention::new(Granularity::Day, "%Y", "%Y-%m-%M", "%Y-%m-%d");
        assert!(matches!(
            result,
            Err(NamingError::InvalidPattern {
                granularity: Granularity::Month,
                ..
            })
        ));
    }
}
