//! Search query construction for subject lookups

use crate::subjects::facets::FacetKind;
use crate::subjects::request::{PublishYearFilter, SubjectRequest};
use crate::subjects::schema::SubjectKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::{Display, EnumString};

/// Per-facet cardinality cap used in details mode
pub const DEFAULT_FACET_LIMIT: usize = 25;

/// Minimum count for a facet value to be returned
pub const DEFAULT_FACET_MIN_COUNT: u64 = 1;

/// Sort order for search results
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "asc",
            SortOrder::Descending => "desc",
        }
    }
}

/// Named sort options accepted from callers
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, EnumString, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SortOption {
    /// Most editions first
    #[default]
    Editions,

    /// Most recently first published first
    New,
}

impl SortOption {
    /// Parse a sort name; unrecognized names fall back to `editions`
    pub fn from_name(name: &str) -> Self {
        name.parse().unwrap_or_default()
    }

    /// Backend sort expression for this option
    pub fn expression(&self) -> SortExpression {
        match self {
            SortOption::Editions => SortExpression::new("edition_count", SortOrder::Descending),
            SortOption::New => SortExpression::new("first_publish_year", SortOrder::Descending),
        }
    }
}

/// A field plus direction, rendered as `"<field> <asc|desc>"`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SortExpression {
    pub field: String,
    pub order: SortOrder,
}

impl SortExpression {
    pub fn new(field: impl Into<String>, order: SortOrder) -> Self {
        Self {
            field: field.into(),
            order,
        }
    }
}

impl std::fmt::Display for SortExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.field, self.order.as_str())
    }
}

/// How many distinct values of a facet to return
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FacetLimit {
    /// Use the request-wide cap
    Default,
    /// Explicit cap for this facet
    Bounded(usize),
    /// Every distinct value
    Unlimited,
}

/// How facet values are ordered
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FacetSort {
    /// Highest count first
    Count,
    /// Index (value) order
    Index,
}

/// One facet requested from the backend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FacetRequest {
    pub kind: FacetKind,
    pub limit: FacetLimit,
    pub sort: Option<FacetSort>,
}

impl FacetRequest {
    pub fn new(kind: FacetKind) -> Self {
        Self {
            kind,
            limit: FacetLimit::Default,
            sort: None,
        }
    }

    pub fn with_limit(mut self, limit: FacetLimit) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_sort(mut self, sort: FacetSort) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Backend field name
    pub fn name(&self) -> &'static str {
        self.kind.field_name()
    }
}

/// Facet section of a query
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FacetOptions {
    pub facets: Vec<FacetRequest>,
    pub min_count: u64,
    pub limit: usize,
}

impl FacetOptions {
    /// Effective value cap for a requested facet; `None` means unlimited
    pub fn effective_limit(&self, request: &FacetRequest) -> Option<usize> {
        match request.limit {
            FacetLimit::Default => Some(self.limit),
            FacetLimit::Bounded(n) => Some(n),
            FacetLimit::Unlimited => None,
        }
    }

    /// Effective ordering for a requested facet
    pub fn effective_sort(&self, request: &FacetRequest) -> FacetSort {
        match (request.sort, request.limit) {
            (Some(sort), _) => sort,
            (None, FacetLimit::Unlimited) => FacetSort::Index,
            (None, _) => FacetSort::Count,
        }
    }
}

/// Backend-neutral description of one subject search
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuerySpec {
    /// Equality filters, field -> normalized value
    pub filters: BTreeMap<String, String>,

    /// Publish year range filter
    pub publish_year: PublishYearFilter,

    /// Result ordering
    pub sort: SortExpression,

    /// Offset for pagination
    pub offset: usize,

    /// Number of documents to return
    pub limit: usize,

    /// Facets to compute, when details are wanted
    pub facets: Option<FacetOptions>,
}

impl QuerySpec {
    /// Whether facet histograms were requested
    pub fn wants_facets(&self) -> bool {
        self.facets.is_some()
    }
}

/// Builds [`QuerySpec`]s from resolved keys and validated requests
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    facet_limit: usize,
    facet_min_count: u64,
}

impl QueryBuilder {
    pub fn new(facet_limit: usize, facet_min_count: u64) -> Self {
        Self {
            facet_limit,
            facet_min_count,
        }
    }

    /// Build the query for a subject
    pub fn build(&self, subject: &SubjectKey, request: &SubjectRequest) -> QuerySpec {
        let mut filters = BTreeMap::new();
        filters.insert(
            subject.descriptor.facet_key.to_string(),
            subject.normalized_path(),
        );

        if request.filters.has_fulltext {
            filters.insert(FacetKind::HasFulltext.field_name().to_string(), "true".to_string());
        }

        QuerySpec {
            filters,
            publish_year: request.filters.publish_year,
            sort: request.sort.expression(),
            offset: request.pagination.offset,
            limit: request.pagination.limit,
            facets: request.details.then(|| self.details_facets()),
        }
    }

    /// Facet section requested in details mode
    pub fn details_facets(&self) -> FacetOptions {
        FacetOptions {
            facets: vec![
                FacetRequest::new(FacetKind::Author).with_sort(FacetSort::Count),
                FacetRequest::new(FacetKind::Language),
                FacetRequest::new(FacetKind::Publisher),
                FacetRequest::new(FacetKind::PublishYear).with_limit(FacetLimit::Unlimited),
                FacetRequest::new(FacetKind::Subject),
                FacetRequest::new(FacetKind::Person),
                FacetRequest::new(FacetKind::Place),
                FacetRequest::new(FacetKind::Time),
                FacetRequest::new(FacetKind::HasFulltext),
            ],
            min_count: self.facet_min_count,
            limit: self.facet_limit,
        }
    }
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_FACET_LIMIT, DEFAULT_FACET_MIN_COUNT)
    }
}
