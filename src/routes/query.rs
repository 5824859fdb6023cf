//! Query-string parameters and list options

use bson::DateTime;
use chrono::{NaiveDate, Utc};
use std::collections::HashMap;

use crate::config::Args;
use crate::repository::{DateRange, ListFilter, PageRequest};
use crate::routes::error::ApiError;

/// Decoded query-string parameters (last value wins on repeats)
#[derive(Debug, Clone, Default)]
pub struct Params(HashMap<String, String>);

impl Params {
    /// Decode a raw query string; undecodable input yields no parameters
    pub fn parse(query: Option<&str>) -> Self {
        let pairs: Vec<(String, String)> = query
            .and_then(|q| serde_urlencoded::from_str(q).ok())
            .unwrap_or_default();
        Self(pairs.into_iter().collect())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    fn number(&self, key: &str) -> Option<u32> {
        self.get(key).and_then(|v| v.trim().parse().ok())
    }
}

/// Page sizing limits from configuration
#[derive(Debug, Clone, Copy)]
pub struct PageLimits {
    pub default_size: u32,
    pub max_size: u32,
}

impl From<&Args> for PageLimits {
    fn from(args: &Args) -> Self {
        Self {
            default_size: args.default_page_size,
            max_size: args.max_page_size,
        }
    }
}

/// Build the filter and page for a list endpoint
pub fn list_options(
    params: &Params,
    limits: PageLimits,
) -> Result<(ListFilter, PageRequest), ApiError> {
    let page = params.number("page").unwrap_or(1);
    let limit = params
        .number("limit")
        .unwrap_or(limits.default_size)
        .clamp(1, limits.max_size.max(1));

    let start = optional_date(params.get("startDate"), "Invalid startDate")?;
    let end = optional_date(params.get("endDate"), "Invalid endDate")?;

    let keywords = params
        .get("keywords")
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string);

    Ok((
        ListFilter {
            keywords,
            created: DateRange { start, end },
        },
        PageRequest::new(page, limit),
    ))
}

fn optional_date(raw: Option<&str>, error: &'static str) -> Result<Option<DateTime>, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => parse_date(raw).map(Some).ok_or(ApiError::BadRequest(error)),
        None => Ok(None),
    }
}

/// RFC 3339 timestamp or `YYYY-MM-DD` (midnight UTC)
///
/// A `+` offset arrives as a space when the client did not percent-encode it.
pub fn parse_date(raw: &str) -> Option<DateTime> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        let midnight = date.and_hms_opt(0, 0, 0)?.and_utc();
        return Some(DateTime::from_chrono(midnight));
    }

    chrono::DateTime::parse_from_rfc3339(raw)
        .or_else(|_| chrono::DateTime::parse_from_rfc3339(&raw.replace(' ', "+")))
        .ok()
        .map(|dt| DateTime::from_chrono(dt.with_timezone(&Utc)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIMITS: PageLimits = PageLimits {
        default_size: 10,
        max_size: 100,
    };

    #[test]
    fn test_params_decode() {
        let params = Params::parse(Some("userId=abc&keywords=hello%20world&x=1&x=2"));
        assert_eq!(params.get("userId"), Some("abc"));
        assert_eq!(params.get("keywords"), Some("hello world"));
        assert_eq!(params.get("x"), Some("2"));
        assert_eq!(params.get("missing"), None);
        assert!(Params::parse(None).get("userId").is_none());
    }

    #[test]
    fn test_list_defaults() {
        let (filter, page) = list_options(&Params::default(), LIMITS).unwrap();
        assert_eq!(page, PageRequest::new(1, 10));
        assert_eq!(filter, ListFilter::default());
    }

    #[test]
    fn test_page_and_limit_clamped() {
        let params = Params::parse(Some("page=0&limit=5000"));
        let (_, page) = list_options(&params, LIMITS).unwrap();
        assert_eq!(page.page, 1);
        assert_eq!(page.limit, 100);

        let params = Params::parse(Some("page=abc&limit=-3"));
        let (_, page) = list_options(&params, LIMITS).unwrap();
        assert_eq!(page, PageRequest::new(1, 10));

        let params = Params::parse(Some("page=3&limit=0"));
        let (_, page) = list_options(&params, LIMITS).unwrap();
        assert_eq!(page, PageRequest::new(3, 1));
    }

    #[test]
    fn test_blank_keywords_ignored() {
        let params = Params::parse(Some("keywords=%20%20"));
        let (filter, _) = list_options(&params, LIMITS).unwrap();
        assert!(filter.keywords.is_none());
    }

    #[test]
    fn test_date_formats() {
        let day = parse_date("2024-03-01").unwrap();
        assert_eq!(day.try_to_rfc3339_string().unwrap(), "2024-03-01T00:00:00Z");

        let ts = parse_date("2024-03-01T12:30:00Z").unwrap();
        assert_eq!(ts.timestamp_millis() - day.timestamp_millis(), 45_000_000);

        let offset = parse_date("2024-03-01T14:30:00 02:00").unwrap();
        assert_eq!(offset, ts);

        assert!(parse_date("yesterday").is_none());
        assert!(parse_date("2024-13-01").is_none());
    }

    #[test]
    fn test_invalid_dates_rejected() {
        let params = Params::parse(Some("startDate=nope"));
        let err = list_options(&params, LIMITS).unwrap_err();
        assert_eq!(err.message(), "Invalid startDate");

        let params = Params::parse(Some("startDate=2024-01-01&endDate=soon"));
        let err = list_options(&params, LIMITS).unwrap_err();
        assert_eq!(err.message(), "Invalid endDate");
    }

    #[test]
    fn test_date_range_built() {
        let params = Params::parse(Some("startDate=2024-01-01&endDate=2024-02-01"));
        let (filter, _) = list_options(&params, LIMITS).unwrap();
        assert_eq!(filter.created.start, parse_date("2024-01-01"));
        assert_eq!(filter.created.end, parse_date("2024-02-01"));
    }
}
