//! Search configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Which search backend serves subject queries
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SearchBackend {
    /// Embedded Tantivy index
    #[default]
    Tantivy,
    /// Remote Solr-compatible select endpoint
    Solr,
}

/// Search service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Backend to use
    #[serde(default)]
    pub backend: SearchBackend,

    /// Path to the search index directory; `None` keeps the index in memory
    #[serde(default)]
    pub index_path: Option<PathBuf>,

    /// Index writer heap size in bytes (default: 50MB)
    #[serde(default = "default_writer_heap_size")]
    pub writer_heap_size: usize,

    /// Commit after every single-document write
    #[serde(default = "default_true")]
    pub realtime_indexing: bool,

    /// Base URL of the Solr core, e.g. `http://localhost:8983/solr/works`
    #[serde(default)]
    pub solr_url: Option<String>,

    /// HTTP timeout for remote backends (seconds)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            backend: SearchBackend::default(),
            index_path: None,
            writer_heap_size: default_writer_heap_size(),
            realtime_indexing: true,
            solr_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_writer_heap_size() -> usize {
    50_000_000 // 50MB
}

fn default_true() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    10
}

/// Builder for SearchConfig
pub struct SearchConfigBuilder {
    config: SearchConfig,
}

impl SearchConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: SearchConfig::default(),
        }
    }

    pub fn backend(mut self, backend: SearchBackend) -> Self {
        self.config.backend = backend;
        self
    }

    pub fn index_path(mut self, path: PathBuf) -> Self {
        self.config.index_path = Some(path);
        self
    }

    pub fn writer_heap_size(mut self, size: usize) -> Self {
        self.config.writer_heap_size = size;
        self
    }

    pub fn realtime_indexing(mut self, enabled: bool) -> Self {
        self.config.realtime_indexing = enabled;
        self
    }

    pub fn solr_url(mut self, url: impl Into<String>) -> Self {
        self.config.solr_url = Some(url.into());
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = secs;
        self
    }

    pub fn build(self) -> SearchConfig {
        self.config
    }
}

impl Default for SearchConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
