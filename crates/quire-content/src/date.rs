//! Publication dates from front matter.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Display format used on post and listing pages ("January 05, 2020").
const DISPLAY_FORMAT: &str = "%B %d, %Y";

/// Publication date of a post, normalised to UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PublishDate(DateTime<Utc>);

/// Error returned when a front matter date cannot be understood.
#[derive(Debug, thiserror::Error)]
#[error("Invalid date '{0}': expected YYYY-MM-DD, YYYY-MM-DD HH:MM:SS or RFC 3339")]
pub struct DateError(pub String);

impl PublishDate {
    /// Build a date at midnight UTC. Returns `None` for impossible dates.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| Self(dt.and_utc()))
    }

    /// Underlying UTC timestamp.
    pub fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }

    /// Human readable form used in templates.
    pub fn display(&self) -> String {
        self.0.format(DISPLAY_FORMAT).to_string()
    }

    /// RFC 2822 form used by the RSS feed.
    pub fn to_rfc2822(&self) -> String {
        self.0.to_rfc2822()
    }

    /// RFC 3339 form used by the sitemap and Open Graph tags.
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339()
    }
}

impl FromStr for PublishDate {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(Self(dt.with_timezone(&Utc)));
        }

        if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
            return Ok(Self(dt.and_utc()));
        }

        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| Self(dt.and_utc()))
            .ok_or_else(|| DateError(s.to_string()))
    }
}

impl fmt::Display for PublishDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

impl<'de> Deserialize<'de> for PublishDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

impl Serialize for PublishDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_date() {
        let date: PublishDate = "2020-01-03".parse().unwrap();
        assert_eq!(date, PublishDate::from_ymd(2020, 1, 3).unwrap());
    }

    #[test]
    fn parses_rfc3339_with_offset() {
        let date: PublishDate = "2019-11-20T22:12:03.284Z".parse().unwrap();
        assert_eq!(date.display(), "November 20, 2019");

        let shifted: PublishDate = "2020-01-01T01:00:00+02:00".parse().unwrap();
        assert_eq!(shifted.display(), "December 31, 2019");
    }

    #[test]
    fn parses_date_with_time() {
        let date: PublishDate = "2020-05-04 10:30:00".parse().unwrap();
        assert!(date > PublishDate::from_ymd(2020, 5, 4).unwrap());
    }

    #[test]
    fn rejects_garbage() {
        assert!("yesterday".parse::<PublishDate>().is_err());
        assert!("2020-13-01".parse::<PublishDate>().is_err());
    }

    #[test]
    fn formats_for_feeds() {
        let date = PublishDate::from_ymd(2020, 1, 3).unwrap();
        assert_eq!(date.to_rfc2822(), "Fri, 3 Jan 2020 00:00:00 +0000");
        assert_eq!(date.to_rfc3339(), "2020-01-03T00:00:00+00:00");
    }
}
