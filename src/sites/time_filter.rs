use crate::ConfigError;
use chrono::NaiveDate;

/// Optional publication window embedded in search URLs
///
/// Either bound may be absent; an absent bound renders as an empty string so
/// templates like `sort=date:r:{begin}:{end}` stay well-formed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeFilter {
    pub begin: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl TimeFilter {
    /// A filter with no bounds
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Parses optional `YYYY-MM-DD` / `YYYYMMDD` bounds
    ///
    /// Blank strings are treated as absent. Fails if a bound is malformed or
    /// the window is inverted.
    pub fn parse(begin: Option<&str>, end: Option<&str>) -> Result<Self, ConfigError> {
        let begin = begin.map(str::trim).filter(|s| !s.is_empty()).map(parse_date).transpose()?;
        let end = end.map(str::trim).filter(|s| !s.is_empty()).map(parse_date).transpose()?;

        if let (Some(b), Some(e)) = (begin, end) {
            if b > e {
                return Err(ConfigError::Validation(format!(
                    "time filter begin {} is after end {}",
                    b, e
                )));
            }
        }

        Ok(Self { begin, end })
    }

    pub fn is_unbounded(&self) -> bool {
        self.begin.is_none() && self.end.is_none()
    }

    /// The begin bound as an 8-digit date, or empty
    pub fn begin_param(&self) -> String {
        format_bound(self.begin)
    }

    /// The end bound as an 8-digit date, or empty
    pub fn end_param(&self) -> String {
        format_bound(self.end)
    }
}

fn format_bound(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y%m%d").to_string()).unwrap_or_default()
}

fn parse_date(s: &str) -> Result<NaiveDate, ConfigError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y%m%d"))
        .map_err(|_| ConfigError::InvalidDate(s.to_string()))
}
