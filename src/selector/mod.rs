//! Selectors: which directories a merge covers
//!
//! A [`Selector`] is built from the raw front-end fields in
//! [`SelectorParams`]. Exactly one selector group may be populated; the
//! resolver then turns the selector into an ordered [`DirectorySet`].

mod manifest;
mod resolver;

pub use manifest::read_manifest;
pub use resolver::resolve;

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SelectorError {
    #[error("selector groups are mutually exclusive, got: {}", join_kinds(.0))]
    Ambiguous(Vec<SelectorKind>),

    #[error("no selector given; exactly one of year, directory, file, window or lookback is required")]
    Insufficient,

    #[error("invalid calendar selector: {0}")]
    InvalidCalendar(String),

    #[error("window must be a positive number of days, got {0}")]
    InvalidWindow(i64),

    #[error("lookback must be a non-negative number of days, got {0}")]
    InvalidLookback(i64),

    #[error("{days} days before {reference} is outside the supported calendar")]
    DateOutOfRange { days: u64, reference: NaiveDate },

    #[error("failed to read manifest {}: {source}", .path.display())]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, SelectorError>;

/// Selector group names, used for diagnostics and to pick input globs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectorKind {
    Calendar,
    Directory,
    Manifest,
    Window,
    Lookback,
}

impl SelectorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectorKind::Calendar => "calendar",
            SelectorKind::Directory => "directory",
            SelectorKind::Manifest => "manifest",
            SelectorKind::Window => "window",
            SelectorKind::Lookback => "lookback",
        }
    }
}

impl fmt::Display for SelectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn join_kinds(kinds: &[SelectorKind]) -> String {
    kinds
        .iter()
        .map(SelectorKind::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Raw selector fields as typed by the front end
#[derive(Debug, Clone, Default)]
pub struct SelectorParams {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
    pub directory: Option<String>,
    pub manifest: Option<PathBuf>,
    pub window: Option<i64>,
    pub lookback: Option<i64>,
}

impl SelectorParams {
    fn present_groups(&self) -> Vec<SelectorKind> {
        let mut groups = Vec::new();
        if self.year.is_some() {
            groups.push(SelectorKind::Calendar);
        }
        if self.directory.as_deref().is_some_and(|d| !d.is_empty()) {
            groups.push(SelectorKind::Directory);
        }
        if self.manifest.is_some() {
            groups.push(SelectorKind::Manifest);
        }
        if self.window.is_some() {
            groups.push(SelectorKind::Window);
        }
        if self.lookback.is_some() {
            groups.push(SelectorKind::Lookback);
        }
        groups
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Calendar {
        year: i32,
        month: Option<u32>,
        day: Option<u32>,
    },
    Directory {
        name: String,
    },
    Manifest {
        path: PathBuf,
    },
    /// `window_days` days ending the day before `reference_date`
    Window {
        window_days: u64,
        reference_date: NaiveDate,
    },
    /// The single day `lookback_days` before `reference_date`
    Lookback {
        lookback_days: u64,
        reference_date: NaiveDate,
    },
}

impl Selector {
    /// Build the one selector described by `params`.
    ///
    /// `reference_date` anchors window and lookback selectors and is ignored
    /// by the other kinds.
    pub fn from_params(params: SelectorParams, reference_date: NaiveDate) -> Result<Self> {
        let groups = params.present_groups();
        let kind = match groups.as_slice() {
            [] if params.month.is_some() || params.day.is_some() => {
                return Err(SelectorError::InvalidCalendar(
                    "month and day require a year".to_string(),
                ));
            }
            [] => return Err(SelectorError::Insufficient),
            [kind] => *kind,
            _ => return Err(SelectorError::Ambiguous(groups)),
        };

        if kind != SelectorKind::Calendar && (params.month.is_some() || params.day.is_some()) {
            return Err(SelectorError::InvalidCalendar(
                "month and day require a year".to_string(),
            ));
        }

        let selector = match kind {
            SelectorKind::Calendar => {
                let year = params.year.ok_or(SelectorError::Insufficient)?;
                validate_calendar(year, params.month, params.day)?;
                Selector::Calendar {
                    year,
                    month: params.month,
                    day: params.day,
                }
            }
            SelectorKind::Directory => Selector::Directory {
                name: params.directory.unwrap_or_default(),
            },
            SelectorKind::Manifest => Selector::Manifest {
                path: params.manifest.unwrap_or_default(),
            },
            SelectorKind::Window => {
                let window = params.window.unwrap_or_default();
                if window <= 0 {
                    return Err(SelectorError::InvalidWindow(window));
                }
                Selector::Window {
                    window_days: window.unsigned_abs(),
                    reference_date,
                }
            }
            SelectorKind::Lookback => {
                let lookback = params.lookback.unwrap_or_default();
                if lookback < 0 {
                    return Err(SelectorError::InvalidLookback(lookback));
                }
                Selector::Lookback {
                    lookback_days: lookback.unsigned_abs(),
                    reference_date,
                }
            }
        };

        Ok(selector)
    }

    pub fn kind(&self) -> SelectorKind {
        match self {
            Selector::Calendar { .. } => SelectorKind::Calendar,
            Selector::Directory { .. } => SelectorKind::Directory,
            Selector::Manifest { .. } => SelectorKind::Manifest,
            Selector::Window { .. } => SelectorKind::Window,
            Selector::Lookback { .. } => SelectorKind::Lookback,
        }
    }

    /// Whether the selector names directories literally rather than by date
    pub fn is_literal(&self) -> bool {
        matches!(self, Selector::Directory { .. } | Selector::Manifest { .. })
    }
}

fn validate_calendar(year: i32, month: Option<u32>, day: Option<u32>) -> Result<()> {
    match (month, day) {
        (None, Some(_)) => Err(SelectorError::InvalidCalendar(
            "day requires a month".to_string(),
        )),
        (None, None) => NaiveDate::from_ymd_opt(year, 1, 1)
            .map(|_| ())
            .ok_or_else(|| SelectorError::InvalidCalendar(format!("year {year} out of range"))),
        (Some(month), None) => NaiveDate::from_ymd_opt(year, month, 1)
            .map(|_| ())
            .ok_or_else(|| {
                SelectorError::InvalidCalendar(format!("{year}-{month:02} is not a valid month"))
            }),
        (Some(month), Some(day)) => NaiveDate::from_ymd_opt(year, month, day)
            .map(|_| ())
            .ok_or_else(|| {
                SelectorError::InvalidCalendar(format!(
                    "{year}-{month:02}-{day:02} is not a valid date"
                ))
            }),
    }
}

/// Ordered, duplicate-free directory names produced by one selector
#[derive(Debug, Clone, Serialize)]
pub struct DirectorySet {
    kind: SelectorKind,
    names: Vec<String>,
    #[serde(skip)]
    seen: HashSet<String>,
}

impl DirectorySet {
    pub fn new(kind: SelectorKind) -> Self {
        Self {
            kind,
            names: Vec::new(),
            seen: HashSet::new(),
        }
    }

    /// Append `name` unless already present; the first occurrence keeps its place
    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.seen.contains(&name) {
            return false;
        }
        self.seen.insert(name.clone());
        self.names.push(name);
        true
    }

    pub fn kind(&self) -> SelectorKind {
        self.kind
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.names.iter()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl PartialEq for DirectorySet {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.names == other.names
    }
}

impl Eq for DirectorySet {}

impl<'a> IntoIterator for &'a DirectorySet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.names.iter()
    }
}
