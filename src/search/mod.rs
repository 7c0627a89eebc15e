//! Search backends for subject queries
//!
//! Two backends implement [`SearchGateway`]:
//!
//! - [`SearchService`]: an embedded Tantivy index holding [`WorkDocument`]s,
//!   with subject facets stored in one hierarchical facet field
//! - [`SolrGateway`]: a remote Solr-compatible `select` endpoint
//!
//! ```text
//!   SubjectEngine ──▶ SearchGateway ──┬──▶ SearchService ──▶ IndexManager ──▶ Tantivy
//!                                     └──▶ SolrGateway   ──▶ HTTP select
//! ```
//!
//! # Example
//!
//! ```no_run
//! use subject_engine::search::{SearchConfig, SearchGateway, SearchService, WorkDocument};
//! use subject_engine::subjects::{resolve, QueryBuilder, SubjectRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let search = SearchService::new(SearchConfig::default()).await?;
//!     search.index_work(&WorkDocument::new("/works/OL1W", "Symposium")).await?;
//!
//!     let request = SubjectRequest::new("/subjects/love");
//!     let spec = QueryBuilder::default().build(&resolve("/subjects/love"), &request);
//!     let hits = search.search(&spec).await?;
//!     println!("Found {} works", hits.total_count);
//!
//!     Ok(())
//! }
//! ```

mod config;
mod document;
mod error;
mod factory;
mod gateway;
mod index;
mod service;
mod solr;

pub use config::{SearchBackend, SearchConfig, SearchConfigBuilder};
pub use document::{build_work_schema, SearchDocument, WorkDocument, FACETS_FIELD, SOURCE_FIELD};
pub use error::{SearchError, SearchResult};
pub use factory::create_gateway;
pub use gateway::{FacetCounts, SearchGateway, SearchHits};
pub use index::{IndexManager, IndexStats};
pub use service::SearchService;
pub use solr::{escape_lucene, parse_response, render_params, render_query, SolrGateway};
