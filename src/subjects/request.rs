//! Validation of caller-supplied subject request parameters
//!
//! Everything here arrives as untrusted strings. Malformed optional values are
//! replaced by defaults; the only hard failure is a `limit` above the cap.

use crate::subjects::error::SubjectError;
use crate::subjects::query::SortOption;
use serde::{Deserialize, Serialize};

/// Works returned when no limit is given
pub const DEFAULT_LIMIT: usize = 12;

/// Largest accepted limit
pub const MAX_LIMIT: usize = 1000;

/// Raw query parameters as received from the routing layer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawSubjectParams {
    pub offset: Option<String>,
    pub limit: Option<String>,
    pub details: Option<String>,
    pub has_fulltext: Option<String>,
    pub sort: Option<String>,
    pub published_in: Option<String>,
}

/// Publish year restriction
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum PublishYearFilter {
    #[default]
    NoFilter,
    SingleYear(i32),
    YearRange(i32, i32),
}

impl PublishYearFilter {
    /// Parse a `published_in` value: `"1950"` or `"1950-1960"`.
    ///
    /// Anything that does not parse yields [`PublishYearFilter::NoFilter`].
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() {
            return Self::NoFilter;
        }

        match value.split_once('-') {
            Some((begin, end)) => match (parse_int::<i32>(begin), parse_int::<i32>(end)) {
                (Some(begin), Some(end)) => Self::YearRange(begin, end),
                _ => Self::NoFilter,
            },
            None => parse_int::<i32>(value).map_or(Self::NoFilter, Self::SingleYear),
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, Self::NoFilter)
    }
}

/// Optional refinements of a subject query
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubjectFilters {
    /// Only works with full text available
    pub has_fulltext: bool,

    /// Publish year restriction
    pub publish_year: PublishYearFilter,
}

/// Page window
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pagination {
    pub offset: usize,
    pub limit: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// A validated subject request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubjectRequest {
    pub key: String,
    pub details: bool,
    pub pagination: Pagination,
    pub sort: SortOption,
    pub filters: SubjectFilters,
}

impl SubjectRequest {
    /// Request with default pagination, sort and no filters
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            details: false,
            pagination: Pagination::default(),
            sort: SortOption::default(),
            filters: SubjectFilters::default(),
        }
    }

    pub fn with_details(mut self, details: bool) -> Self {
        self.details = details;
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.pagination.offset = offset;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.pagination.limit = limit;
        self
    }

    pub fn with_sort(mut self, sort: SortOption) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_filters(mut self, filters: SubjectFilters) -> Self {
        self.filters = filters;
        self
    }
}

/// Turns raw parameters into a [`SubjectRequest`]
#[derive(Debug, Clone)]
pub struct RequestValidator {
    default_limit: usize,
    max_limit: usize,
}

impl RequestValidator {
    pub fn new(default_limit: usize, max_limit: usize) -> Self {
        Self {
            default_limit,
            max_limit,
        }
    }

    /// Validate raw parameters for `key`
    pub fn validate(&self, key: &str, params: &RawSubjectParams) -> Result<SubjectRequest, SubjectError> {
        let pagination = self.pagination(params.offset.as_deref(), params.limit.as_deref())?;

        Ok(SubjectRequest {
            key: key.to_string(),
            details: params
                .details
                .as_deref()
                .is_some_and(|d| d.trim().eq_ignore_ascii_case("true")),
            pagination,
            sort: params
                .sort
                .as_deref()
                .map(SortOption::from_name)
                .unwrap_or_default(),
            filters: SubjectFilters {
                has_fulltext: params.has_fulltext.as_deref() == Some("true"),
                publish_year: params
                    .published_in
                    .as_deref()
                    .map(PublishYearFilter::parse)
                    .unwrap_or_default(),
            },
        })
    }

    /// Parse offset and limit, defaulting garbage and rejecting oversized limits
    pub fn pagination(&self, offset: Option<&str>, limit: Option<&str>) -> Result<Pagination, SubjectError> {
        let offset = offset.and_then(parse_non_negative).unwrap_or(0);
        let limit = limit
            .and_then(parse_non_negative)
            .unwrap_or(self.default_limit);

        if limit > self.max_limit {
            return Err(SubjectError::LimitExceeded {
                limit,
                max: self.max_limit,
            });
        }

        Ok(Pagination { offset, limit })
    }
}

impl Default for RequestValidator {
    fn default() -> Self {
        Self::new(DEFAULT_LIMIT, MAX_LIMIT)
    }
}

fn parse_int<T: std::str::FromStr>(value: &str) -> Option<T> {
    value.trim().parse().ok()
}

/// Non-negative integer, or `None` for negative or malformed input
fn parse_non_negative(value: &str) -> Option<usize> {
    // Huge values must still trip the cap rather than fall back to the default.
    match parse_int::<i128>(value)? {
        n if n < 0 => None,
        n => Some(usize::try_from(n).unwrap_or(usize::MAX)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> RawSubjectParams {
        let mut p = RawSubjectParams::default();
        for (k, v) in pairs {
            let v = Some(v.to_string());
            match *k {
                "offset" => p.offset = v,
                "limit" => p.limit = v,
                "details" => p.details = v,
                "has_fulltext" => p.has_fulltext = v,
                "sort" => p.sort = v,
                "published_in" => p.published_in = v,
                other => panic!("unknown param {other}"),
            }
        }
        p
    }

    #[test]
    fn test_defaults() {
        let req = RequestValidator::default()
            .validate("/subjects/love", &RawSubjectParams::default())
            .unwrap();

        assert_eq!(req.pagination, Pagination { offset: 0, limit: 12 });
        assert!(!req.details);
        assert_eq!(req.sort, SortOption::Editions);
        assert_eq!(req.filters, SubjectFilters::default());
    }

    #[test]
    fn test_garbage_numbers_default() {
        let v = RequestValidator::default();
        let req = v
            .validate("/subjects/love", &params(&[("offset", "abc"), ("limit", "-5")]))
            .unwrap();
        assert_eq!(req.pagination, Pagination { offset: 0, limit: 12 });

        let req = v
            .validate("/subjects/love", &params(&[("offset", " 24 "), ("limit", "2.5")]))
            .unwrap();
        assert_eq!(req.pagination, Pagination { offset: 24, limit: 12 });
    }

    #[test]
    fn test_limit_cap() {
        let v = RequestValidator::default();
        let err = v
            .validate("/subjects/love", &params(&[("limit", "5000")]))
            .unwrap_err();
        assert!(matches!(err, SubjectError::LimitExceeded { limit: 5000, max: 1000 }));

        let err = v
            .validate("/subjects/love", &params(&[("limit", "99999999999999999999999")]))
            .unwrap_err();
        assert!(matches!(err, SubjectError::LimitExceeded { .. }));

        let req = v
            .validate("/subjects/love", &params(&[("limit", "1000")]))
            .unwrap();
        assert_eq!(req.pagination.limit, 1000);
    }

    #[test]
    fn test_published_in() {
        assert_eq!(PublishYearFilter::parse("1950-1960"), PublishYearFilter::YearRange(1950, 1960));
        assert_eq!(PublishYearFilter::parse("1950"), PublishYearFilter::SingleYear(1950));
        assert_eq!(PublishYearFilter::parse("1950-abc"), PublishYearFilter::NoFilter);
        assert_eq!(PublishYearFilter::parse("-1960"), PublishYearFilter::NoFilter);
        assert_eq!(PublishYearFilter::parse("nineteen"), PublishYearFilter::NoFilter);
        assert_eq!(PublishYearFilter::parse(""), PublishYearFilter::NoFilter);
    }

    #[test]
    fn test_has_fulltext_exact_true() {
        let v = RequestValidator::default();
        for (value, expected) in [("true", true), ("True", false), ("false", false), ("1", false)] {
            let req = v
                .validate("/subjects/love", &params(&[("has_fulltext", value)]))
                .unwrap();
            assert_eq!(req.filters.has_fulltext, expected, "has_fulltext={value}");
        }
    }

    #[test]
    fn test_details_and_sort() {
        let req = RequestValidator::default()
            .validate(
                "/subjects/love",
                &params(&[("details", "TRUE"), ("sort", "new"), ("published_in", "1990")]),
            )
            .unwrap();

        assert!(req.details);
        assert_eq!(req.sort, SortOption::New);
        assert_eq!(req.filters.publish_year, PublishYearFilter::SingleYear(1990));
    }
}
