//! Search backend contract used by the subject engine

use crate::search::document::WorkDocument;
use crate::search::error::SearchResult;
use crate::subjects::QuerySpec;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Raw `(value, count)` facet histogram, in backend order
pub type FacetCounts = Vec<(String, u64)>;

/// Result of one backend search
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SearchHits {
    /// Matching documents for the requested page, in result order
    pub documents: Vec<WorkDocument>,

    /// Total number of matches, independent of the page size
    pub total_count: u64,

    /// Facet histograms keyed by facet name
    pub facets: HashMap<String, FacetCounts>,
}

impl SearchHits {
    /// Histogram for a facet, empty when the backend returned none
    pub fn facet(&self, name: &str) -> &[(String, u64)] {
        self.facets.get(name).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// A search backend able to answer [`QuerySpec`]s.
///
/// Implementations must preserve the backend's facet ordering and must not
/// retry internally; a failed call returns an error.
#[async_trait]
pub trait SearchGateway: Send + Sync {
    /// Short backend name, used in logs and metrics
    fn name(&self) -> &str;

    /// Execute a query
    async fn search(&self, query: &QuerySpec) -> SearchResult<SearchHits>;
}
