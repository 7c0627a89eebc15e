//! Error types for search operations

use crate::error::AppError;

/// Result type for search operations
pub type SearchResult<T> = std::result::Result<T, SearchError>;

/// Errors that can occur during search operations
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// Backend could not be reached or did not answer in time
    #[error("Search backend unavailable: {0}")]
    Unavailable(String),

    /// Index initialization failed
    #[error("Index initialization failed: {0}")]
    IndexInitFailed(String),

    /// Query could not be expressed against the backend
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Search execution failed
    #[error("Search execution failed: {0}")]
    SearchFailed(String),

    /// Backend answered with something we cannot read
    #[error("Malformed search response: {0}")]
    MalformedResponse(String),

    /// Document indexing failed
    #[error("Document indexing failed: {0}")]
    IndexingFailed(String),

    /// Document deletion failed
    #[error("Document deletion failed: {0}")]
    DeletionFailed(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Tantivy error
    #[error("Tantivy error: {0}")]
    TantivyError(String),
}

impl SearchError {
    /// Short error label for metrics
    pub fn error_type(&self) -> &'static str {
        match self {
            SearchError::Unavailable(_) => "unavailable",
            SearchError::IndexInitFailed(_) => "index_init",
            SearchError::InvalidQuery(_) => "invalid_query",
            SearchError::SearchFailed(_) => "search_failed",
            SearchError::MalformedResponse(_) => "malformed_response",
            SearchError::IndexingFailed(_) => "indexing",
            SearchError::DeletionFailed(_) => "deletion",
            SearchError::IoError(_) => "io",
            SearchError::InvalidConfiguration(_) => "configuration",
            SearchError::TantivyError(_) => "tantivy",
        }
    }
}

impl From<tantivy::TantivyError> for SearchError {
    fn from(err: tantivy::TantivyError) -> Self {
        SearchError::TantivyError(err.to_string())
    }
}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SearchError::MalformedResponse(err.to_string())
        } else {
            SearchError::Unavailable(err.to_string())
        }
    }
}

impl From<SearchError> for AppError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::InvalidConfiguration(msg) => AppError::Configuration(msg),
            SearchError::Unavailable(msg) => AppError::Network(msg),
            SearchError::IoError(err) => AppError::Internal(err.to_string()),
            _ => AppError::Internal(err.to_string()),
        }
    }
}
