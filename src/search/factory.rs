use crate::search::config::{SearchBackend, SearchConfig};
use crate::search::error::SearchResult;
use crate::search::gateway::SearchGateway;
use crate::search::service::SearchService;
use crate::search::solr::SolrGateway;
use std::sync::Arc;

/// Create a search gateway based on configuration
pub async fn create_gateway(config: &SearchConfig) -> SearchResult<Arc<dyn SearchGateway>> {
    match config.backend {
        SearchBackend::Tantivy => {
            match &config.index_path {
                Some(path) => tracing::info!(path = ?path, "Initializing embedded search index"),
                None => tracing::warn!("No index_path configured, using an empty in-memory index"),
            }

            let service = SearchService::new(config.clone()).await?;
            Ok(Arc::new(service))
        }

        SearchBackend::Solr => {
            let gateway = SolrGateway::from_config(config)?;
            tracing::info!(url = %gateway.select_url(), "Initializing Solr search gateway");
            Ok(Arc::new(gateway))
        }
    }
}
