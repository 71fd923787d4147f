// src/record.rs

use chrono::{Datelike, Local, NaiveDate};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};

/// One extracted row: bed capacity of a facility for a bed type/specialty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BedRecord {
    pub cnes: String,
    pub facility_name: String,
    pub uf: String,
    pub municipality: String,
    pub bed_type: String,
    pub specialty: String,
    pub existing: u32,
    pub sus: u32,
    pub non_sus: u32,
    pub period: Period,
}

impl BedRecord {
    /// Column order shared by every output format.
    pub const COLUMNS: [&'static str; 10] = [
        "cnes",
        "facility_name",
        "uf",
        "municipality",
        "bed_type",
        "specialty",
        "existing",
        "sus",
        "non_sus",
        "period",
    ];
}

/// A reference year-month, stored as the first day of the month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period(NaiveDate);

impl Period {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(Period)
    }

    pub fn current() -> Self {
        let today = Local::now().date_naive();
        Period(today.with_day(1).unwrap_or(today))
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// Compact `YYYYMM` form used in registry query strings.
    pub fn compact(&self) -> String {
        self.0.format("%Y%m").to_string()
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m"))
    }
}

impl FromStr for Period {
    type Err = String;

    /// Accepts `YYYY-MM` or `YYYYMM`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if !s.is_ascii() {
            return Err(format!("invalid period `{s}`, expected YYYY-MM"));
        }
        let (y, m) = match s.len() {
            7 if &s[4..5] == "-" => (&s[0..4], &s[5..7]),
            6 => (&s[0..4], &s[4..6]),
            _ => return Err(format!("invalid period `{s}`, expected YYYY-MM")),
        };
        if !(y.chars().all(|c| c.is_ascii_digit()) && m.chars().all(|c| c.is_ascii_digit())) {
            return Err(format!("invalid period `{s}`, expected YYYY-MM"));
        }
        let year: i32 = y.parse().map_err(|_| format!("invalid year in `{s}`"))?;
        let month: u32 = m.parse().map_err(|_| format!("invalid month in `{s}`"))?;
        Period::new(year, month).ok_or_else(|| format!("month out of range in `{s}`"))
    }
}

impl Serialize for Period {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Period {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
