//! Request parameter resolution
//!
//! Turns partially specified caller input into complete parameter sets:
//! date ranges with per-endpoint lookback windows, zero-based pagination,
//! request-time timestamps and the enumerated filters accepted by the
//! provider operations. Everything here is a pure function of its input and,
//! where a default needs it, the wall clock at call time.

use std::fmt;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::{Error, Result};

/// Date format used on the wire in both directions
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Lookback for daily series, grades, signals, indices and market metrics
pub const DEFAULT_LOOKBACK_DAYS: i64 = 30;

/// Lookback for hourly OHLCV
pub const HOURLY_LOOKBACK_DAYS: i64 = 7;

/// Default page size for sentiment listings
pub const SENTIMENT_DEFAULT_LIMIT: u32 = 1000;

/// Default number of rows for launch-analytics listings
pub const LAUNCH_DEFAULT_LIMIT: u32 = 10;

/// Default and maximum number of OHLCV candles
pub const OHLCV_DEFAULT_LIMIT: u32 = 100;
/// Upper bound accepted for OHLCV candles
pub const OHLCV_MAX_LIMIT: u32 = 1000;

/// Inclusive calendar date range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    /// First day
    pub start: NaiveDate,
    /// Last day
    pub end: NaiveDate,
}

impl DateRange {
    /// Start date as `YYYY-MM-DD`
    #[must_use]
    pub fn start_str(&self) -> String {
        self.start.format(DATE_FORMAT).to_string()
    }

    /// End date as `YYYY-MM-DD`
    #[must_use]
    pub fn end_str(&self) -> String {
        self.end.format(DATE_FORMAT).to_string()
    }
}

/// Today's date (UTC), evaluated on every call
#[must_use]
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Resolve a date range against the current date.
///
/// Missing `start` becomes `today - lookback_days`, missing `end` becomes
/// `today`. Supplied dates must be `YYYY-MM-DD`, and the resolved range must
/// not be inverted.
pub fn resolve_date_range(
    start: Option<&str>,
    end: Option<&str>,
    lookback_days: i64,
) -> Result<DateRange> {
    resolve_date_range_at(today(), start, end, lookback_days)
}

/// Same as [`resolve_date_range`] with an explicit "today"
pub fn resolve_date_range_at(
    today: NaiveDate,
    start: Option<&str>,
    end: Option<&str>,
    lookback_days: i64,
) -> Result<DateRange> {
    let start = match non_empty(start) {
        Some(s) => parse_date("start_date", s)?,
        None => today - Duration::days(lookback_days),
    };
    let end = match non_empty(end) {
        Some(s) => parse_date("end_date", s)?,
        None => today,
    };

    if start > end {
        return Err(Error::validation(format!(
            "start_date {} is after end_date {}",
            start.format(DATE_FORMAT),
            end.format(DATE_FORMAT)
        )));
    }

    Ok(DateRange { start, end })
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

fn parse_date(field: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| {
        Error::validation(format!(
            "{field} must be a date in YYYY-MM-DD format, got '{value}'"
        ))
    })
}

/// Zero-based pagination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Page size
    pub limit: u32,
    /// Zero-based page index
    pub page: u32,
}

/// Resolve pagination with `page` defaulting to 0 and `limit` to `default_limit`
pub fn resolve_pagination(
    limit: Option<u32>,
    page: Option<u32>,
    default_limit: u32,
) -> Result<Pagination> {
    let limit = resolve_limit(limit, default_limit, None)?;
    Ok(Pagination {
        limit,
        page: page.unwrap_or(0),
    })
}

/// Resolve a row limit, enforcing `limit >= 1` and an optional upper bound
pub fn resolve_limit(limit: Option<u32>, default_limit: u32, max: Option<u32>) -> Result<u32> {
    let limit = limit.unwrap_or(default_limit);
    if limit == 0 {
        return Err(Error::validation("limit must be at least 1"));
    }
    if let Some(max) = max {
        if limit > max {
            return Err(Error::validation(format!("limit must be at most {max}")));
        }
    }
    Ok(limit)
}

/// Current unix time in seconds
#[must_use]
pub fn now_timestamp() -> i64 {
    Utc::now().timestamp()
}

/// Validate a comma-separated symbol list and normalize whitespace around commas
pub fn require_symbols(symbols: &str) -> Result<String> {
    let parts: Vec<&str> = symbols
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    if parts.is_empty() {
        return Err(Error::validation("symbols must not be empty"));
    }
    Ok(parts.join(","))
}

/// Validate a required identifier (address, mint, network)
pub fn require_identifier(field: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::validation(format!("{field} must not be empty")));
    }
    Ok(value.to_string())
}

/// A point in time given either as RFC 3339 or unix seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Timestamp(pub DateTime<Utc>);

impl Timestamp {
    /// RFC 3339 rendering with second precision, as GraphQL `DateTime` expects
    #[must_use]
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
    }

    fn parse(raw: &str) -> std::result::Result<Self, String> {
        let raw = raw.trim();
        if let Ok(secs) = raw.parse::<i64>() {
            return DateTime::from_timestamp(secs, 0)
                .map(Self)
                .ok_or_else(|| format!("timestamp out of range: {secs}"));
        }
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| Self(dt.with_timezone(&Utc)))
            .or_else(|_| {
                // "2024-05-01T12:00:00" without offset is read as UTC
                chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
                    .map(|naive| Self(naive.and_utc()))
            })
            .map_err(|_| format!("expected RFC 3339 or unix seconds, got '{raw}'"))
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Implements lowercase `Display` and `as_str` for a filter enum
macro_rules! wire_enum {
    ($name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        impl $name {
            /// Value forwarded upstream
            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

/// Trading side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Buy side
    #[default]
    Buy,
    /// Sell side
    Sell,
}
wire_enum!(Side { Buy => "buy", Sell => "sell" });

/// Candle timeframe for pool OHLCV
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    /// One-minute candles
    Minute,
    /// Hourly candles
    #[default]
    Hour,
    /// Daily candles
    Day,
}
wire_enum!(Timeframe { Minute => "minute", Hour => "hour", Day => "day" });

/// Price denomination for pool OHLCV
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    /// US dollars
    #[default]
    Usd,
    /// Quote token units
    #[serde(alias = "quote")]
    Token,
}
wire_enum!(Currency { Usd => "usd", Token => "token" });

/// Which token of the pair the OHLCV series follows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenSide {
    /// Base token
    #[default]
    Base,
    /// Quote token
    Quote,
}
wire_enum!(TokenSide { Base => "base", Quote => "quote" });

/// Trading signal polarity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// `1`
    Bullish,
    /// `-1`
    Bearish,
}
wire_enum!(Signal { Bullish => "1", Bearish => "-1" });

impl std::str::FromStr for Signal {
    type Err = String;

    fn from_str(raw: &str) -> std::result::Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "bullish" => Ok(Self::Bullish),
            "-1" | "bearish" => Ok(Self::Bearish),
            other => Err(format!(
                "signal must be 1 (bullish) or -1 (bearish), got '{other}'"
            )),
        }
    }
}

impl<'de> Deserialize<'de> for Signal {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer)?
            .parse()
            .map_err(serde::de::Error::custom)
    }
}

/// Optional signal filter where a blank value means no filter
pub fn optional_signal<'de, D>(deserializer: D) -> std::result::Result<Option<Signal>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    non_empty(raw.as_deref())
        .map(str::parse)
        .transpose()
        .map_err(serde::de::Error::custom)
}

/// Aggregation unit for the historical price/volume series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interval {
    /// Minutes
    Minute,
    /// Hours
    #[default]
    Hour,
    /// Days
    Day,
    /// Weeks
    Week,
}
wire_enum!(Interval { Minute => "minutes", Hour => "hours", Day => "days", Week => "weeks" });

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    #[test]
    fn missing_dates_use_lookback() {
        let range = resolve_date_range_at(day("2024-03-10"), None, None, 30).unwrap();
        assert_eq!(range.start_str(), "2024-02-09");
        assert_eq!(range.end_str(), "2024-03-10");

        let range = resolve_date_range_at(day("2024-03-10"), None, None, 7).unwrap();
        assert_eq!(range.start_str(), "2024-03-03");
    }

    #[test]
    fn blank_dates_count_as_missing() {
        let range = resolve_date_range_at(day("2024-01-05"), Some(""), Some("  "), 7).unwrap();
        assert_eq!(range.start_str(), "2023-12-29");
        assert_eq!(range.end_str(), "2024-01-05");
    }

    #[test]
    fn supplied_dates_are_kept() {
        let range = resolve_date_range_at(
            day("2024-03-10"),
            Some("2023-01-01"),
            Some("2023-02-01"),
            30,
        )
        .unwrap();
        assert_eq!(range.start, day("2023-01-01"));
        assert_eq!(range.end, day("2023-02-01"));
    }

    #[test]
    fn only_one_bound_supplied() {
        let range =
            resolve_date_range_at(day("2024-03-10"), Some("2024-03-01"), None, 30).unwrap();
        assert_eq!(range.start_str(), "2024-03-01");
        assert_eq!(range.end_str(), "2024-03-10");
    }

    #[test]
    fn inverted_range_rejected() {
        let err = resolve_date_range_at(
            day("2024-03-10"),
            Some("2024-03-05"),
            Some("2024-03-01"),
            30,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn future_start_without_end_is_inverted() {
        let err =
            resolve_date_range_at(day("2024-03-10"), Some("2024-04-01"), None, 30).unwrap_err();
        assert!(err.to_string().contains("after end_date"));
    }

    #[test]
    fn malformed_date_rejected() {
        let err = resolve_date_range_at(day("2024-03-10"), Some("03/01/2024"), None, 30)
            .unwrap_err();
        assert!(err.to_string().contains("start_date"));
    }

    #[test]
    fn live_today_is_used() {
        let range = resolve_date_range(None, None, HOURLY_LOOKBACK_DAYS).unwrap();
        assert_eq!(range.end - range.start, Duration::days(7));
    }

    #[test]
    fn pagination_defaults() {
        let p = resolve_pagination(None, None, SENTIMENT_DEFAULT_LIMIT).unwrap();
        assert_eq!(p, Pagination { limit: 1000, page: 0 });

        let p = resolve_pagination(Some(50), Some(3), SENTIMENT_DEFAULT_LIMIT).unwrap();
        assert_eq!(p, Pagination { limit: 50, page: 3 });

        assert!(resolve_pagination(Some(0), None, 10).is_err());
    }

    #[test]
    fn limit_bounds() {
        assert_eq!(resolve_limit(None, 100, Some(1000)).unwrap(), 100);
        assert_eq!(resolve_limit(Some(1000), 100, Some(1000)).unwrap(), 1000);
        assert!(resolve_limit(Some(1001), 100, Some(1000)).is_err());
    }

    #[test]
    fn symbols_normalized() {
        assert_eq!(require_symbols("BTC, ETH ,").unwrap(), "BTC,ETH");
        assert!(require_symbols(" , ").is_err());
        assert!(require_identifier("token_address", "  ").is_err());
    }

    #[test]
    fn timestamps_accept_both_forms() {
        let a = Timestamp::parse("1700000000").unwrap();
        let b = Timestamp::parse("2023-11-14T22:13:20Z").unwrap();
        let c = Timestamp::parse("2023-11-14T22:13:20").unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(a.to_rfc3339(), "2023-11-14T22:13:20Z");
        assert!(Timestamp::parse("yesterday").is_err());
    }

    #[test]
    fn signal_accepts_numbers_and_names() {
        let s: Signal = serde_json::from_str("\"-1\"").unwrap();
        assert_eq!(s, Signal::Bearish);
        let s: Signal = serde_json::from_str("\"Bullish\"").unwrap();
        assert_eq!(s.as_str(), "1");
        assert!(serde_json::from_str::<Signal>("\"0\"").is_err());
    }

    #[derive(Debug, Deserialize)]
    struct Filter {
        #[serde(default, deserialize_with = "optional_signal")]
        signal: Option<Signal>,
    }

    #[test]
    fn blank_signal_means_no_filter() {
        let f: Filter = serde_json::from_str(r#"{"signal": "  "}"#).unwrap();
        assert_eq!(f.signal, None);
        let f: Filter = serde_json::from_str("{}").unwrap();
        assert_eq!(f.signal, None);
        let f: Filter = serde_json::from_str(r#"{"signal": "-1"}"#).unwrap();
        assert_eq!(f.signal, Some(Signal::Bearish));
        assert!(serde_json::from_str::<Filter>(r#"{"signal": "flat"}"#).is_err());
    }

    #[test]
    fn currency_quote_alias() {
        let c: Currency = serde_json::from_str("\"quote\"").unwrap();
        assert_eq!(c, Currency::Token);
        let s: Side = serde_json::from_str("\"sell\"").unwrap();
        assert_eq!(s.to_string(), "sell");
    }
}
