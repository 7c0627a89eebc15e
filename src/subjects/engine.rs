//! Subject lookup pipeline
//!
//! validate -> resolve key -> build query -> search -> map facets -> assemble -> enrich

use crate::config::SubjectsConfig;
use crate::metrics::{SEARCH_DURATION_SECONDS, SEARCH_ERRORS_TOTAL, SUBJECT_REQUESTS_TOTAL};
use crate::search::{SearchError, SearchGateway, SearchHits, SearchResult};
use crate::subjects::assembler::{ResultAssembler, Subject, WorkSummary};
use crate::subjects::availability::{AvailabilityEnricher, NoAvailability};
use crate::subjects::error::SubjectResult;
use crate::subjects::facets::{AuthorFacetDecoder, FacetMapper};
use crate::subjects::query::{QueryBuilder, QuerySpec};
use crate::subjects::request::{RawSubjectParams, RequestValidator, SubjectRequest};
use crate::subjects::schema::resolve;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Default bound on a single search gateway call
pub const DEFAULT_SEARCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Answers subject lookups against a search gateway.
///
/// Holds no per-request state; one engine serves concurrent requests.
#[derive(Clone)]
pub struct SubjectEngine {
    gateway: Arc<dyn SearchGateway>,
    enricher: Arc<dyn AvailabilityEnricher>,
    query_builder: QueryBuilder,
    validator: RequestValidator,
    assembler: ResultAssembler,
    search_timeout: Duration,
}

impl SubjectEngine {
    /// Engine with default limits, the space-delimited author decoder and no enrichment
    pub fn new(gateway: Arc<dyn SearchGateway>) -> Self {
        Self {
            gateway,
            enricher: Arc::new(NoAvailability),
            query_builder: QueryBuilder::default(),
            validator: RequestValidator::default(),
            assembler: ResultAssembler::default(),
            search_timeout: DEFAULT_SEARCH_TIMEOUT,
        }
    }

    /// Engine configured from the `subjects` config section
    pub fn from_config(gateway: Arc<dyn SearchGateway>, config: &SubjectsConfig) -> Self {
        Self::new(gateway)
            .with_validator(RequestValidator::new(config.default_limit, config.max_limit))
            .with_query_builder(QueryBuilder::new(config.facet_limit, config.facet_min_count))
            .with_search_timeout(Duration::from_secs(config.search_timeout_secs))
    }

    pub fn with_author_decoder(mut self, decoder: Arc<dyn AuthorFacetDecoder>) -> Self {
        self.assembler = ResultAssembler::new(FacetMapper::new(decoder));
        self
    }

    pub fn with_assembler(mut self, assembler: ResultAssembler) -> Self {
        self.assembler = assembler;
        self
    }

    pub fn with_enricher(mut self, enricher: Arc<dyn AvailabilityEnricher>) -> Self {
        self.enricher = enricher;
        self
    }

    pub fn with_query_builder(mut self, query_builder: QueryBuilder) -> Self {
        self.query_builder = query_builder;
        self
    }

    pub fn with_validator(mut self, validator: RequestValidator) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_search_timeout(mut self, timeout: Duration) -> Self {
        self.search_timeout = timeout;
        self
    }

    pub fn validator(&self) -> &RequestValidator {
        &self.validator
    }

    /// Name of the backing search gateway
    pub fn backend(&self) -> &str {
        self.gateway.name()
    }

    /// Validate raw parameters and look the subject up.
    ///
    /// Fails only when the parameters are rejected; an unreachable backend or
    /// zero matches yield `Ok(None)`.
    pub async fn lookup(&self, key: &str, params: &RawSubjectParams) -> SubjectResult<Option<Subject>> {
        let request = self.validator.validate(key, params).map_err(|e| {
            let subject_type = resolve(key).subject_type().to_string();
            SUBJECT_REQUESTS_TOTAL
                .with_label_values(&[&subject_type, "rejected"])
                .inc();
            warn!(subject_key = key, error = %e, "Rejected subject request");
            e
        })?;

        Ok(self.get_subject(&request).await)
    }

    /// Look up a subject.
    ///
    /// Returns `None` when the backend finds no matching works or cannot be reached.
    pub async fn get_subject(&self, request: &SubjectRequest) -> Option<Subject> {
        let subject_key = resolve(&request.key);
        let subject_type = subject_key.subject_type().to_string();
        let spec = self.query_builder.build(&subject_key, request);

        let hits = match self.execute(&spec).await {
            Ok(hits) => hits,
            Err(e) => {
                error!(
                    subject_key = %request.key,
                    backend = self.gateway.name(),
                    error = %e,
                    "Subject search failed"
                );
                SUBJECT_REQUESTS_TOTAL
                    .with_label_values(&[&subject_type, "unavailable"])
                    .inc();
                return None;
            }
        };

        if hits.total_count == 0 {
            debug!(subject_key = %request.key, "No works for subject");
            SUBJECT_REQUESTS_TOTAL
                .with_label_values(&[&subject_type, "empty"])
                .inc();
            return None;
        }

        let mut subject = self.assembler.assemble(&subject_key, hits, request.details);
        self.enrich(&mut subject.works).await;

        SUBJECT_REQUESTS_TOTAL
            .with_label_values(&[&subject_type, "found"])
            .inc();
        info!(
            subject_key = %request.key,
            subject_type = %subject_type,
            total_count = subject.work_count,
            returned = subject.works.len(),
            details = request.details,
            "Subject assembled"
        );

        Some(subject)
    }

    /// Run one bounded gateway call
    async fn execute(&self, spec: &QuerySpec) -> SearchResult<SearchHits> {
        let backend = self.gateway.name().to_string();
        let start = Instant::now();

        let result = match tokio::time::timeout(self.search_timeout, self.gateway.search(spec)).await {
            Ok(result) => result,
            Err(_) => Err(SearchError::Unavailable(format!(
                "Search timed out after {:?}",
                self.search_timeout
            ))),
        };

        SEARCH_DURATION_SECONDS
            .with_label_values(&[&backend])
            .observe(start.elapsed().as_secs_f64());

        if let Err(e) = &result {
            SEARCH_ERRORS_TOTAL
                .with_label_values(&[&backend, e.error_type()])
                .inc();
        }

        result
    }

    /// Apply availability, serving plain works if enrichment fails
    async fn enrich(&self, works: &mut [WorkSummary]) {
        if let Err(e) = self.enricher.enrich(works).await {
            warn!(enricher = self.enricher.name(), error = %e, "Availability enrichment failed");
            for work in works.iter_mut() {
                work.availability = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::WorkDocument;
    use crate::subjects::availability::IndexFlagAvailability;
    use crate::subjects::error::SubjectError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Gateway returning canned hits and recording the last query
    struct CannedGateway {
        hits: SearchResult<SearchHits>,
        last_query: Mutex<Option<QuerySpec>>,
    }

    impl CannedGateway {
        fn new(hits: SearchResult<SearchHits>) -> Arc<Self> {
            Arc::new(Self {
                hits,
                last_query: Mutex::new(None),
            })
        }
    }

    #[async_trait]
    impl SearchGateway for CannedGateway {
        fn name(&self) -> &str {
            "canned"
        }

        async fn search(&self, query: &QuerySpec) -> SearchResult<SearchHits> {
            *self.last_query.lock().unwrap() = Some(query.clone());
            match &self.hits {
                Ok(hits) => Ok(hits.clone()),
                Err(e) => Err(SearchError::Unavailable(e.to_string())),
            }
        }
    }

    struct SlowGateway;

    #[async_trait]
    impl SearchGateway for SlowGateway {
        fn name(&self) -> &str {
            "slow"
        }

        async fn search(&self, _query: &QuerySpec) -> SearchResult<SearchHits> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(SearchHits::default())
        }
    }

    /// Enricher that marks the first work and then fails
    struct FailingEnricher;

    #[async_trait]
    impl AvailabilityEnricher for FailingEnricher {
        fn name(&self) -> &str {
            "failing"
        }

        async fn enrich(&self, works: &mut [WorkSummary]) -> SubjectResult<()> {
            IndexFlagAvailability.enrich(&mut works[..1]).await?;
            Err(SubjectError::Enrichment("status service down".to_string()))
        }
    }

    fn two_works() -> SearchHits {
        SearchHits {
            documents: vec![
                WorkDocument {
                    public_scan_b: true,
                    ..WorkDocument::new("/works/OL1W", "Symposium")
                },
                WorkDocument::new("/works/OL2W", "Phaedrus"),
            ],
            total_count: 57,
            facets: HashMap::new(),
        }
    }

    #[tokio::test]
    async fn test_found() {
        let gateway = CannedGateway::new(Ok(two_works()));
        let engine = SubjectEngine::new(gateway.clone());

        let subject = engine
            .get_subject(&SubjectRequest::new("/subjects/love").with_limit(2))
            .await
            .unwrap();

        assert_eq!(subject.work_count, 57);
        assert_eq!(subject.works.len(), 2);

        let query = gateway.last_query.lock().unwrap().clone().unwrap();
        assert_eq!(query.limit, 2);
        assert_eq!(query.filters.get("subject_key").map(String::as_str), Some("love"));
        assert!(query.facets.is_none());
    }

    #[tokio::test]
    async fn test_empty_and_unavailable() {
        let engine = SubjectEngine::new(CannedGateway::new(Ok(SearchHits::default())));
        assert!(engine.get_subject(&SubjectRequest::new("/subjects/none")).await.is_none());

        let engine = SubjectEngine::new(CannedGateway::new(Err(SearchError::Unavailable(
            "connection refused".to_string(),
        ))));
        assert!(engine.get_subject(&SubjectRequest::new("/subjects/love")).await.is_none());
    }

    #[tokio::test]
    async fn test_timeout_is_unavailable() {
        let engine = SubjectEngine::new(Arc::new(SlowGateway))
            .with_search_timeout(Duration::from_millis(20));

        assert!(engine.get_subject(&SubjectRequest::new("/subjects/love")).await.is_none());
    }

    #[tokio::test]
    async fn test_lookup_rejects_large_limit() {
        let engine = SubjectEngine::new(CannedGateway::new(Ok(two_works())));
        let params = RawSubjectParams {
            limit: Some("5000".to_string()),
            ..Default::default()
        };

        let err = engine.lookup("/subjects/love", &params).await.unwrap_err();
        assert!(matches!(err, SubjectError::LimitExceeded { limit: 5000, max: 1000 }));
        assert_eq!(err.to_string(), "Specified limit exceeds maximum of 1000.");
    }

    #[tokio::test]
    async fn test_lookup_defaults_bad_limit() {
        let gateway = CannedGateway::new(Ok(two_works()));
        let engine = SubjectEngine::new(gateway.clone());
        let params = RawSubjectParams {
            limit: Some("-5".to_string()),
            ..Default::default()
        };

        assert!(engine.lookup("/subjects/love", &params).await.unwrap().is_some());
        let query = gateway.last_query.lock().unwrap().clone().unwrap();
        assert_eq!(query.limit, 12);
    }

    #[tokio::test]
    async fn test_enrichment() {
        let engine = SubjectEngine::new(CannedGateway::new(Ok(two_works())))
            .with_enricher(Arc::new(IndexFlagAvailability));
        let subject = engine.get_subject(&SubjectRequest::new("/subjects/love")).await.unwrap();
        assert!(subject.works[0].availability.is_some());
        assert!(subject.works[1].availability.is_none());

        let engine = SubjectEngine::new(CannedGateway::new(Ok(two_works())))
            .with_enricher(Arc::new(FailingEnricher));
        let subject = engine.get_subject(&SubjectRequest::new("/subjects/love")).await.unwrap();
        assert_eq!(subject.works.len(), 2);
        assert!(subject.works.iter().all(|w| w.availability.is_none()));
    }
}
