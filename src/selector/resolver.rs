use chrono::{Days, NaiveDate};
use tracing::debug;

use super::manifest::read_manifest;
use super::{DirectorySet, Result, Selector, SelectorError};
use crate::naming::NamingConvention;

/// Resolve a selector into the ordered set of directories to merge.
///
/// Date-based selectors enumerate calendar days and name each through the
/// convention's layout, so a coarser layout collapses neighbouring days into
/// one directory. Nothing here checks whether a directory exists.
pub fn resolve(selector: &Selector, convention: &NamingConvention) -> Result<DirectorySet> {
    let mut set = DirectorySet::new(selector.kind());

    match selector {
        Selector::Calendar { year, month, day } => {
            let (start, end) = calendar_range(*year, *month, *day)?;
            insert_days(&mut set, convention, start, end);
        }
        Selector::Directory { name } => {
            set.insert(name.clone());
        }
        Selector::Manifest { path } => {
            for name in read_manifest(path)? {
                set.insert(name);
            }
        }
        Selector::Window {
            window_days,
            reference_date,
        } => {
            let start = days_before(*reference_date, *window_days)?;
            let end = days_before(*reference_date, 1)?;
            insert_days(&mut set, convention, start, end);
        }
        Selector::Lookback {
            lookback_days,
            reference_date,
        } => {
            let day = days_before(*reference_date, *lookback_days)?;
            set.insert(convention.directory_for(day));
        }
    }

    debug!(kind = %set.kind(), directories = set.len(), "Selector resolved");
    Ok(set)
}

/// First and last day (inclusive) covered by a calendar selector
fn calendar_range(
    year: i32,
    month: Option<u32>,
    day: Option<u32>,
) -> Result<(NaiveDate, NaiveDate)> {
    let invalid = || SelectorError::InvalidCalendar(format!("{year}/{month:?}/{day:?}"));

    match (month, day) {
        (Some(month), Some(day)) => {
            let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)?;
            Ok((date, date))
        }
        (Some(month), None) => {
            let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
            let next_month = start.checked_add_months(chrono::Months::new(1)).ok_or_else(invalid)?;
            let end = next_month.pred_opt().ok_or_else(invalid)?;
            Ok((start, end))
        }
        (None, None) => {
            let start = NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(invalid)?;
            let end = NaiveDate::from_ymd_opt(year, 12, 31).ok_or_else(invalid)?;
            Ok((start, end))
        }
        (None, Some(_)) => Err(SelectorError::InvalidCalendar(
            "day requires a month".to_string(),
        )),
    }
}

fn days_before(reference: NaiveDate, days: u64) -> Result<NaiveDate> {
    reference
        .checked_sub_days(Days::new(days))
        .ok_or(SelectorError::DateOutOfRange { days, reference })
}

fn insert_days(
    set: &mut DirectorySet,
    convention: &NamingConvention,
    start: NaiveDate,
    end: NaiveDate,
) {
    for day in start.iter_days().take_while(|day| *day <= end) {
        set.insert(convention.directory_for(day));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::Granularity;
    use crate::selector::SelectorKind;
    use std::fs;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn camus() -> NamingConvention {
        NamingConvention::new(Granularity::Day, "d_%Y", "d_%Y%m", "d_%Y%m%d").unwrap()
    }

    fn monthly() -> NamingConvention {
        NamingConvention::new(Granularity::Month, "%Y", "%Y-%m", "%Y-%m-%d").unwrap()
    }

    fn calendar(year: i32, month: Option<u32>, day: Option<u32>) -> Selector {
        Selector::Calendar { year, month, day }
    }

    #[test]
    fn test_single_day() {
        let convention = NamingConvention::iso();
        let set = resolve(&calendar(2015, Some(2), Some(12)), &convention).unwrap();

        assert_eq!(set.names(), ["2015-02-12"]);
        assert_eq!(
            convention.from_directory_name(&set.names()[0]).unwrap(),
            date(2015, 2, 12)
        );
    }

    #[test]
    fn test_month_enumerates_every_day() {
        let set = resolve(&calendar(2015, Some(2), None), &camus()).unwrap();
        let expected: Vec<String> = (1..=28).map(|d| format!("d_201502{d:02}")).collect();
        assert_eq!(set.names(), expected.as_slice());

        let leap = resolve(&calendar(2016, Some(2), None), &camus()).unwrap();
        assert_eq!(leap.len(), 29);
        assert_eq!(leap.names().last().unwrap(), "d_20160229");
    }

    #[test]
    fn test_year_is_chronological_and_leap_aware() {
        let convention = NamingConvention::iso();
        for (year, days) in [(2015, 365), (2016, 366), (1900, 365), (2000, 366)] {
            let set = resolve(&calendar(year, None, None), &convention).unwrap();
            assert_eq!(set.len(), days, "year {year}");

            let dates: Vec<NaiveDate> = set
                .iter()
                .map(|name| convention.from_directory_name(name).unwrap())
                .collect();
            assert!(dates.windows(2).all(|pair| pair[0] < pair[1]));
            assert_eq!(dates[0], date(year, 1, 1));
            assert_eq!(*dates.last().unwrap(), date(year, 12, 31));
        }
    }

    #[test]
    fn test_year_with_monthly_layout() {
        let set = resolve(&calendar(2016, None, None), &monthly()).unwrap();
        let expected: Vec<String> = (1..=12).map(|m| format!("2016-{m:02}")).collect();
        assert_eq!(set.names(), expected.as_slice());

        let month = resolve(&calendar(2016, Some(2), None), &monthly()).unwrap();
        assert_eq!(month.names(), ["2016-02"]);
    }

    #[test]
    fn test_window_excludes_reference_date() {
        let selector = Selector::Window {
            window_days: 20,
            reference_date: date(2016, 3, 10),
        };
        let set = resolve(&selector, &NamingConvention::iso()).unwrap();

        let mut expected: Vec<String> = (19..=29).map(|d| format!("2016-02-{d:02}")).collect();
        expected.extend((1..=9).map(|d| format!("2016-03-{d:02}")));

        assert_eq!(set.len(), 20);
        assert_eq!(set.names(), expected.as_slice());
        assert!(!set.names().contains(&"2016-03-10".to_string()));
    }

    #[test]
    fn test_window_across_months_with_monthly_layout() {
        let selector = Selector::Window {
            window_days: 20,
            reference_date: date(2016, 3, 10),
        };
        let set = resolve(&selector, &monthly()).unwrap();
        assert_eq!(set.names(), ["2016-02", "2016-03"]);
    }

    #[test]
    fn test_lookback_single_day() {
        let selector = Selector::Lookback {
            lookback_days: 20,
            reference_date: date(2016, 3, 10),
        };
        let set = resolve(&selector, &NamingConvention::iso()).unwrap();
        assert_eq!(set.names(), ["2016-02-19"]);

        let today = Selector::Lookback {
            lookback_days: 0,
            reference_date: date(2016, 3, 10),
        };
        let set = resolve(&today, &NamingConvention::iso()).unwrap();
        assert_eq!(set.names(), ["2016-03-10"]);
    }

    #[test]
    fn test_lookback_out_of_range() {
        let selector = Selector::Lookback {
            lookback_days: u64::MAX,
            reference_date: date(2016, 3, 10),
        };
        let result = resolve(&selector, &NamingConvention::iso());
        assert!(matches!(result, Err(SelectorError::DateOutOfRange { .. })));
    }

    #[test]
    fn test_directory_is_verbatim() {
        let selector = Selector::Directory {
            name: "not-a-date".to_string(),
        };
        let set = resolve(&selector, &NamingConvention::iso()).unwrap();
        assert_eq!(set.names(), ["not-a-date"]);
        assert_eq!(set.kind(), SelectorKind::Directory);
    }

    #[test]
    fn test_manifest_order_preserved() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("dirs.txt");
        fs::write(&path, "d_20150225\nd_20160309\nd_20150728\n").unwrap();

        let set = resolve(&Selector::Manifest { path }, &camus()).unwrap();
        assert_eq!(set.names(), ["d_20150225", "d_20160309", "d_20150728"]);
    }

    #[test]
    fn test_manifest_duplicates_collapse() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("dirs.txt");
        fs::write(&path, "b\na\n\nb\nc\na\n").unwrap();

        let set = resolve(&Selector::Manifest { path }, &camus()).unwrap();
        assert_eq!(set.names(), ["b", "a", "c"]);
    }

    #[test]
    fn test_missing_manifest() {
        let selector = Selector::Manifest {
            path: "/nonexistent/filemerge/dirs.txt".into(),
        };
        let result = resolve(&selector, &camus());
        assert!(matches!(result, Err(SelectorError::ManifestRead { .. })));
    }

    #[test]
    fn test_resolution_is_repeatable() {
        let selector = Selector::Window {
            window_days: 45,
            reference_date: date(2016, 1, 15),
        };
        let first = resolve(&selector, &camus()).unwrap();
        let second = resolve(&selector, &camus()).unwrap();
        assert_eq!(first, second);
    }
}
