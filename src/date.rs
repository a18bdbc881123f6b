use anyhow::{anyhow, Context, Result};
use std::fmt;
use std::str::FromStr;
use time::format_description::well_known::Rfc3339;
use time::{Date, Month, OffsetDateTime};

/// Half-open publish-date window `[after, before)` in UTC, used to restrict video search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PublishWindow {
    pub after: OffsetDateTime,
    pub before: OffsetDateTime,
}

impl PublishWindow {
    /// January 1st of `year` up to January 1st of the following year.
    pub fn calendar_year(year: i32) -> Result<Self> {
        let start = Date::from_calendar_date(year, Month::January, 1)
            .with_context(|| format!("invalid year {year}"))?;
        let end = Date::from_calendar_date(year + 1, Month::January, 1)
            .with_context(|| format!("invalid year {}", year + 1))?;
        Ok(Self {
            after: start.midnight().assume_utc(),
            before: end.midnight().assume_utc(),
        })
    }

    /// The calendar year we are currently in (UTC).
    pub fn current_year() -> Self {
        let now = OffsetDateTime::now_utc();
        let start = Date::from_calendar_date(now.year(), Month::January, 1).unwrap_or(now.date());
        let end = Date::from_calendar_date(now.year() + 1, Month::January, 1).unwrap_or(now.date());
        Self {
            after: start.midnight().assume_utc(),
            before: end.midnight().assume_utc(),
        }
    }

    pub fn year(&self) -> i32 {
        self.after.year()
    }

    /// RFC 3339 with a `Z` suffix, as the search endpoint expects.
    pub fn after_rfc3339(&self) -> String {
        format_utc(self.after)
    }
    pub fn before_rfc3339(&self) -> String {
        format_utc(self.before)
    }
}

fn format_utc(ts: OffsetDateTime) -> String {
    ts.format(&Rfc3339).unwrap_or_else(|_| ts.unix_timestamp().to_string())
}

impl fmt::Display for PublishWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.after_rfc3339(), self.before_rfc3339())
    }
}

impl FromStr for PublishWindow {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self> {
        let year: i32 = s.trim().parse().map_err(|_| anyhow!("expected a year like 2025, got {s:?}"))?;
        if !(2005..=9998).contains(&year) {
            return Err(anyhow!("year {year} is outside the range YouTube can have published videos in"));
        }
        Self::calendar_year(year)
    }
}
