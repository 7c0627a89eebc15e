//! Embedded search service over a Tantivy work index

use crate::search::config::SearchConfig;
use crate::search::document::{WorkDocument, FACETS_FIELD, SOURCE_FIELD};
use crate::search::error::{SearchError, SearchResult};
use crate::search::gateway::{FacetCounts, SearchGateway, SearchHits};
use crate::search::index::{IndexManager, IndexStats};
use crate::subjects::{FacetOptions, FacetSort, PublishYearFilter, QuerySpec, SortOrder};
use async_trait::async_trait;
use std::collections::HashMap;
use std::ops::Bound;
use std::sync::Arc;
use tantivy::collector::{Count, FacetCollector, TopDocs};
use tantivy::query::{AllQuery, BooleanQuery, Occur, Query, RangeQuery, TermQuery};
use tantivy::schema::{Facet, IndexRecordOption, Value};
use tantivy::{DocAddress, Order, Searcher, TantivyDocument, Term};
use tracing::{debug, warn};

/// Main search service
pub struct SearchService {
    /// Index manager
    index_manager: Arc<IndexManager>,
}

impl SearchService {
    /// Create a new search service
    pub async fn new(config: SearchConfig) -> SearchResult<Self> {
        let index_manager = Arc::new(IndexManager::new(config).await?);

        Ok(Self { index_manager })
    }

    /// Build the Tantivy query for a spec
    fn build_query(&self, spec: &QuerySpec) -> SearchResult<Box<dyn Query>> {
        let schema = self.index_manager.schema();
        let mut subqueries: Vec<(Occur, Box<dyn Query>)> = Vec::new();

        for (field_name, value) in &spec.filters {
            let field = schema
                .get_field(field_name)
                .map_err(|_| SearchError::InvalidQuery(format!("Unknown filter field: {}", field_name)))?;

            subqueries.push((
                Occur::Must,
                Box::new(TermQuery::new(
                    Term::from_field_text(field, value),
                    IndexRecordOption::Basic,
                )),
            ));
        }

        let year_bounds = match spec.publish_year {
            PublishYearFilter::NoFilter => None,
            PublishYearFilter::SingleYear(year) => Some((year, year)),
            PublishYearFilter::YearRange(begin, end) => Some((begin, end)),
        };

        if let Some((begin, end)) = year_bounds {
            subqueries.push((
                Occur::Must,
                Box::new(RangeQuery::new_i64_bounds(
                    "publish_year".to_string(),
                    Bound::Included(begin as i64),
                    Bound::Included(end as i64),
                )),
            ));
        }

        if subqueries.is_empty() {
            Ok(Box::new(AllQuery))
        } else {
            Ok(Box::new(BooleanQuery::new(subqueries)))
        }
    }

    /// Collect the requested page of documents in sort order
    fn top_documents(
        &self,
        searcher: &Searcher,
        query: &dyn Query,
        spec: &QuerySpec,
        total_count: usize,
    ) -> SearchResult<Vec<DocAddress>> {
        // TopDocs rejects a zero limit and sizes its heap by limit + offset,
        // so the window is clamped to the matching documents.
        if spec.limit == 0 || spec.offset >= total_count {
            return Ok(Vec::new());
        }
        let limit = spec.limit.min(total_count - spec.offset);

        let order = match spec.sort.order {
            SortOrder::Ascending => Order::Asc,
            SortOrder::Descending => Order::Desc,
        };
        let top_docs = TopDocs::with_limit(limit).and_offset(spec.offset);

        let addresses = match spec.sort.field.as_str() {
            "edition_count" => searcher
                .search(query, &top_docs.order_by_fast_field::<u64>("edition_count", order))?
                .into_iter()
                .map(|(_, address)| address)
                .collect(),
            "first_publish_year" => searcher
                .search(query, &top_docs.order_by_fast_field::<i64>("first_publish_year", order))?
                .into_iter()
                .map(|(_, address)| address)
                .collect(),
            other => {
                warn!(sort_field = other, "Unsupported sort field, using relevance");
                searcher
                    .search(query, &top_docs)?
                    .into_iter()
                    .map(|(_, address)| address)
                    .collect()
            }
        };

        Ok(addresses)
    }

    /// Read a stored work document back
    fn load_document(&self, searcher: &Searcher, address: DocAddress) -> SearchResult<WorkDocument> {
        let retrieved: TantivyDocument = searcher
            .doc(address)
            .map_err(|e| SearchError::SearchFailed(format!("Failed to retrieve doc: {}", e)))?;

        let field = self
            .index_manager
            .schema()
            .get_field(SOURCE_FIELD)
            .map_err(|e| SearchError::SearchFailed(e.to_string()))?;

        let source = retrieved
            .get_first(field)
            .and_then(|v| v.as_str())
            .ok_or_else(|| SearchError::SearchFailed("Stored document missing source".to_string()))?;

        serde_json::from_str(source).map_err(|e| SearchError::MalformedResponse(e.to_string()))
    }

    /// Compute facet histograms for the query
    fn compute_facets(
        &self,
        searcher: &Searcher,
        query: &dyn Query,
        options: &FacetOptions,
    ) -> SearchResult<HashMap<String, FacetCounts>> {
        let mut results = HashMap::new();
        if options.facets.is_empty() {
            return Ok(results);
        }

        let mut facet_collector = FacetCollector::for_field(FACETS_FIELD);
        for request in &options.facets {
            facet_collector.add_facet(Facet::from_path([request.name()]));
        }

        let facet_counts = searcher
            .search(query, &facet_collector)
            .map_err(|e| SearchError::SearchFailed(format!("Facet aggregation failed: {}", e)))?;

        for request in &options.facets {
            let root = Facet::from_path([request.name()]);

            let raw: Vec<(&Facet, u64)> = match (
                options.effective_sort(request),
                options.effective_limit(request),
            ) {
                (FacetSort::Count, Some(limit)) => facet_counts.top_k(root, limit),
                (FacetSort::Count, None) => {
                    let mut all: Vec<_> = facet_counts.get(root).collect();
                    all.sort_by(|a, b| b.1.cmp(&a.1));
                    all
                }
                (FacetSort::Index, limit) => facet_counts
                    .get(root)
                    .take(limit.unwrap_or(usize::MAX))
                    .collect(),
            };

            let counts: FacetCounts = raw
                .into_iter()
                .filter(|(_, count)| *count >= options.min_count)
                .filter_map(|(facet, count)| {
                    facet
                        .to_path()
                        .last()
                        .map(|value| (value.to_string(), count))
                })
                .collect();

            results.insert(request.name().to_string(), counts);
        }

        Ok(results)
    }

    /// Index a single work
    pub async fn index_work(&self, work: &WorkDocument) -> SearchResult<()> {
        self.index_manager.index_document(work).await
    }

    /// Index multiple works
    pub async fn index_works(&self, works: &[WorkDocument]) -> SearchResult<usize> {
        self.index_manager.index_documents(works).await
    }

    /// Delete a work from the index
    pub async fn delete_work(&self, key: &str) -> SearchResult<()> {
        self.index_manager.delete_document(key).await
    }

    /// Get index statistics
    pub async fn get_stats(&self) -> SearchResult<IndexStats> {
        self.index_manager.get_stats().await
    }

    /// Commit pending changes
    pub async fn commit(&self) -> SearchResult<()> {
        self.index_manager.commit().await
    }

    /// Clear the entire index
    pub async fn clear_index(&self) -> SearchResult<()> {
        self.index_manager.clear_index().await
    }
}

#[async_trait]
impl SearchGateway for SearchService {
    fn name(&self) -> &str {
        "tantivy"
    }

    async fn search(&self, spec: &QuerySpec) -> SearchResult<SearchHits> {
        let start_time = std::time::Instant::now();

        let query = self.build_query(spec)?;
        let searcher = self.index_manager.reader().searcher();

        let total_count = searcher
            .search(&*query, &Count)
            .map_err(|e| SearchError::SearchFailed(format!("Count failed: {}", e)))?;

        let documents = self
            .top_documents(&searcher, &*query, spec, total_count)?
            .into_iter()
            .map(|address| self.load_document(&searcher, address))
            .collect::<SearchResult<Vec<_>>>()?;

        let facets = match &spec.facets {
            Some(options) => self.compute_facets(&searcher, &*query, options)?,
            None => HashMap::new(),
        };

        debug!(
            total_count,
            returned = documents.len(),
            facets = facets.len(),
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "Embedded search completed"
        );

        Ok(SearchHits {
            documents,
            total_count: total_count as u64,
            facets,
        })
    }
}
