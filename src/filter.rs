//! Release date resolution and release filtering.
//!
//! Spotify reports release dates only as precisely as it knows them
//! (`"2024"`, `"2024-03"` or `"2024-03-15"`) together with a precision tag.
//! A [`PartialDate`] keeps exactly the known components and resolves to the
//! earliest instant it could denote, so a release known only by year counts
//! as released on January 1 of that year.

use std::fmt;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Res, types::Album};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatePrecision {
    Year,
    Month,
    Day,
    /// Anything Spotify might add later; the date string's shape decides.
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartialDate {
    Year(i32),
    Month(i32, u32),
    Day(NaiveDate),
}

impl PartialDate {
    /// Parses a provider date string using only the components `precision`
    /// says are known. Returns `None` for malformed or impossible dates.
    pub fn parse(value: &str, precision: DatePrecision) -> Option<Self> {
        let parts: Vec<&str> = value.trim().split('-').collect();
        let known = match precision {
            DatePrecision::Year => 1,
            DatePrecision::Month => 2,
            DatePrecision::Day => 3,
            DatePrecision::Unknown => parts.len().min(3),
        };
        if parts.len() < known {
            return None;
        }

        let year: i32 = parts[0].parse().ok()?;
        match known {
            1 => NaiveDate::from_ymd_opt(year, 1, 1).map(|_| PartialDate::Year(year)),
            2 => {
                let month: u32 = parts[1].parse().ok()?;
                NaiveDate::from_ymd_opt(year, month, 1).map(|_| PartialDate::Month(year, month))
            }
            _ => {
                let month: u32 = parts[1].parse().ok()?;
                let day: u32 = parts[2].parse().ok()?;
                NaiveDate::from_ymd_opt(year, month, day).map(PartialDate::Day)
            }
        }
    }

    pub fn first_day(&self) -> NaiveDate {
        match *self {
            PartialDate::Year(y) => NaiveDate::from_ymd_opt(y, 1, 1).unwrap_or(NaiveDate::MIN),
            PartialDate::Month(y, m) => {
                NaiveDate::from_ymd_opt(y, m, 1).unwrap_or(NaiveDate::MIN)
            }
            PartialDate::Day(d) => d,
        }
    }

    /// Earliest instant (UTC midnight) the date can denote.
    pub fn resolve(&self) -> DateTime<Utc> {
        start_of_day(self.first_day())
    }
}

/// Resolves a provider date string and precision tag to a comparable
/// instant.
pub fn resolve(value: &str, precision: DatePrecision) -> Option<DateTime<Utc>> {
    PartialDate::parse(value, precision).map(|d| d.resolve())
}

/// Inclusive range check; an absent bound is unbounded.
pub fn in_range(
    instant: DateTime<Utc>,
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
) -> bool {
    from.is_none_or(|f| instant >= f) && to.is_none_or(|t| instant <= t)
}

impl Album {
    pub fn resolved_date(&self) -> Option<DateTime<Utc>> {
        resolve(&self.release_date, self.release_date_precision)
    }
}

/// Which release groups a full-catalog add covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ReleaseType {
    /// Albums, singles and EPs
    #[default]
    Everything,
    /// Albums only
    Albums,
    /// Singles and EPs only
    Singles,
}

impl ReleaseType {
    /// Value for the `include_groups` query parameter.
    pub fn include_groups(&self) -> &'static str {
        match self {
            ReleaseType::Everything => "album,single",
            ReleaseType::Albums => "album",
            ReleaseType::Singles => "single",
        }
    }
}

impl fmt::Display for ReleaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ReleaseType::Everything => "all releases",
            ReleaseType::Albums => "albums",
            ReleaseType::Singles => "singles",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseFilter {
    pub release_type: ReleaseType,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
}

impl ReleaseFilter {
    /// The unfiltered catalog, used by playlist sync.
    pub fn everything() -> Self {
        Self::default()
    }

    /// Builds a filter from manual `YYYY-MM-DD` input.
    ///
    /// # Errors
    ///
    /// [`Error::Precondition`] for malformed dates or an inverted range.
    pub fn from_input(
        release_type: ReleaseType,
        from: Option<&str>,
        to: Option<&str>,
    ) -> Res<Self> {
        let date_from = from.map(parse_date_input).transpose()?.flatten();
        let date_to = to.map(parse_date_input).transpose()?.flatten();

        if let (Some(f), Some(t)) = (date_from, date_to) {
            if f > t {
                return Err(Error::precondition(format!(
                    "date range is inverted: {} is after {}",
                    f.date_naive(),
                    t.date_naive()
                )));
            }
        }

        Ok(Self {
            release_type,
            date_from,
            date_to,
        })
    }

    pub fn has_date_bounds(&self) -> bool {
        self.date_from.is_some() || self.date_to.is_some()
    }

    /// Whether a release passes the date bounds. Releases with an
    /// unreadable date only pass when no bound is set.
    pub fn matches(&self, album: &Album) -> bool {
        if !self.has_date_bounds() {
            return true;
        }
        album
            .resolved_date()
            .is_some_and(|d| in_range(d, self.date_from, self.date_to))
    }

    pub fn describe(&self) -> String {
        if !self.has_date_bounds() {
            return self.release_type.to_string();
        }
        let bound = |d: Option<DateTime<Utc>>| {
            d.map(|d| d.date_naive().to_string())
                .unwrap_or_else(|| "...".to_string())
        };
        format!(
            "{} from {} to {}",
            self.release_type,
            bound(self.date_from),
            bound(self.date_to)
        )
    }
}

/// Parses a manual `YYYY-MM-DD` date. Blank input means "no bound".
pub fn parse_date_input(input: &str) -> Res<Option<DateTime<Utc>>> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .map(|d| Some(start_of_day(d)))
        .map_err(|_| Error::precondition(format!("invalid date `{input}`, expected YYYY-MM-DD")))
}

/// Parses a stored checkpoint: RFC 3339, or a bare `YYYY-MM-DD`.
pub fn parse_checkpoint(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    DateTime::parse_from_rfc3339(value)
        .map(|d| d.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .map(start_of_day)
        })
}

pub fn format_checkpoint(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}
