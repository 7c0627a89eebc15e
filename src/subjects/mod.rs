//! Subject query and aggregation engine
//!
//! A subject key such as `/subjects/person:plato` is resolved to a subject
//! type, turned into a backend-neutral [`QuerySpec`], run against a
//! [`SearchGateway`](crate::search::SearchGateway), and the raw documents and
//! facet histograms are reshaped into a [`Subject`] summary.
//!
//! ```text
//! RawSubjectParams ─▶ RequestValidator ─▶ SubjectRequest
//!                                              │
//!                       schema::resolve ◀──────┘
//!                              │
//!                        QueryBuilder ─▶ QuerySpec ─▶ SearchGateway
//!                                                          │
//!                 Subject ◀─ ResultAssembler ◀─ FacetMapper ◀┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use subject_engine::search::{SearchConfig, SearchService};
//! use subject_engine::subjects::{SubjectEngine, SubjectRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let search = Arc::new(SearchService::new(SearchConfig::default()).await?);
//!     let engine = SubjectEngine::new(search);
//!
//!     let request = SubjectRequest::new("/subjects/person:plato").with_details(true);
//!     if let Some(subject) = engine.get_subject(&request).await {
//!         println!("{}: {} works", subject.name, subject.work_count);
//!     }
//!
//!     Ok(())
//! }
//! ```

mod assembler;
mod availability;
mod engine;
mod error;
mod facets;
mod query;
mod request;
mod schema;

pub use assembler::{fix_work_key, AuthorRef, ResultAssembler, Subject, WorkSummary};
pub use availability::{
    Availability, AvailabilityEnricher, AvailabilityStatus, IndexFlagAvailability, NoAvailability,
};
pub use engine::{SubjectEngine, DEFAULT_SEARCH_TIMEOUT};
pub use error::{SubjectError, SubjectResult};
pub use facets::{
    AuthorFacetDecoder, AuthorToken, FacetEntry, FacetError, FacetKind, FacetMapper, KeyedCount,
    NamedCount, SpaceDelimitedAuthorDecoder,
};
pub use query::{
    FacetLimit, FacetOptions, FacetRequest, FacetSort, QueryBuilder, QuerySpec, SortExpression,
    SortOption, SortOrder, DEFAULT_FACET_LIMIT, DEFAULT_FACET_MIN_COUNT,
};
pub use request::{
    Pagination, PublishYearFilter, RawSubjectParams, RequestValidator, SubjectFilters,
    SubjectRequest, DEFAULT_LIMIT, MAX_LIMIT,
};
pub use schema::{
    canonical_key, descriptor_for_facet, descriptor_for_type, generic_descriptor, normalize_path,
    resolve, SubjectKey, SubjectType, SubjectTypeDescriptor, SUBJECT_TYPES,
};
