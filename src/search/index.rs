//! Search index management

use crate::search::config::SearchConfig;
use crate::search::document::{build_work_schema, SearchDocument, WorkDocument};
use crate::search::error::{SearchError, SearchResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tantivy::collector::Count;
use tantivy::schema::Schema;
use tantivy::{Index, IndexReader, IndexWriter, ReloadPolicy};
use tokio::sync::RwLock;
use tracing::debug;

/// Index statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexStats {
    /// Total number of documents in the index
    pub total_documents: u64,

    /// Index size in bytes (0 for in-memory indexes)
    pub index_size_bytes: u64,

    /// Number of segments
    pub num_segments: usize,

    /// Last commit timestamp
    pub last_commit: Option<chrono::DateTime<chrono::Utc>>,
}

/// Manages the Tantivy work index
pub struct IndexManager {
    /// The schema
    schema: Schema,

    /// Index writer (wrapped in RwLock for thread-safety)
    writer: Arc<RwLock<IndexWriter>>,

    /// Index reader
    reader: IndexReader,

    /// Time of the last successful commit
    last_commit: Arc<RwLock<Option<chrono::DateTime<chrono::Utc>>>>,

    /// Configuration
    config: SearchConfig,
}

impl IndexManager {
    /// Create a new IndexManager
    pub async fn new(config: SearchConfig) -> SearchResult<Self> {
        let schema = build_work_schema();

        let index = match &config.index_path {
            Some(path) => {
                std::fs::create_dir_all(path).map_err(|e| {
                    SearchError::IndexInitFailed(format!("Failed to create index directory: {}", e))
                })?;

                if Self::index_exists(path) {
                    Index::open_in_dir(path).map_err(|e| {
                        SearchError::IndexInitFailed(format!("Failed to open existing index: {}", e))
                    })?
                } else {
                    Index::create_in_dir(path, schema.clone()).map_err(|e| {
                        SearchError::IndexInitFailed(format!("Failed to create new index: {}", e))
                    })?
                }
            }
            None => Index::create_in_ram(schema.clone()),
        };

        let writer: IndexWriter = index
            .writer(config.writer_heap_size)
            .map_err(|e| SearchError::IndexInitFailed(format!("Failed to create writer: {}", e)))?;

        // Reloaded explicitly after each commit so writes are visible immediately
        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()
            .map_err(|e| SearchError::IndexInitFailed(format!("Failed to create reader: {}", e)))?;

        Ok(Self {
            schema: index.schema(),
            writer: Arc::new(RwLock::new(writer)),
            reader,
            last_commit: Arc::new(RwLock::new(None)),
            config,
        })
    }

    /// Check if an index exists at the given path
    fn index_exists(path: &Path) -> bool {
        path.join("meta.json").exists()
    }

    /// Get the schema
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Get the reader
    pub fn reader(&self) -> &IndexReader {
        &self.reader
    }

    fn delete_existing(&self, writer: &IndexWriter, key: &str) {
        if let Ok(key_field) = self.schema.get_field("key") {
            writer.delete_term(tantivy::Term::from_field_text(key_field, key));
        }
    }

    /// Index a single work document, replacing any document with the same key
    pub async fn index_document(&self, document: &WorkDocument) -> SearchResult<()> {
        let tantivy_doc = document.to_tantivy_doc(&self.schema);

        let mut writer = self.writer.write().await;
        self.delete_existing(&writer, &document.document_id());

        writer
            .add_document(tantivy_doc)
            .map_err(|e| SearchError::IndexingFailed(format!("Failed to add document: {}", e)))?;

        if self.config.realtime_indexing {
            self.commit_locked(&mut writer).await?;
        }

        Ok(())
    }

    /// Index multiple work documents and commit
    pub async fn index_documents(&self, documents: &[WorkDocument]) -> SearchResult<usize> {
        let mut writer = self.writer.write().await;
        let mut indexed = 0;

        for document in documents {
            self.delete_existing(&writer, &document.document_id());

            writer.add_document(document.to_tantivy_doc(&self.schema)).map_err(|e| {
                SearchError::IndexingFailed(format!("Failed to add document {}: {}", indexed, e))
            })?;

            indexed += 1;
        }

        self.commit_locked(&mut writer).await?;
        debug!(indexed, "Indexed work documents");

        Ok(indexed)
    }

    /// Delete a document by work key
    pub async fn delete_document(&self, key: &str) -> SearchResult<()> {
        let mut writer = self.writer.write().await;
        self.delete_existing(&writer, key);

        if self.config.realtime_indexing {
            self.commit_locked(&mut writer)
                .await
                .map_err(|e| SearchError::DeletionFailed(e.to_string()))?;
        }

        Ok(())
    }

    /// Commit pending changes
    pub async fn commit(&self) -> SearchResult<()> {
        let mut writer = self.writer.write().await;
        self.commit_locked(&mut writer).await
    }

    async fn commit_locked(&self, writer: &mut IndexWriter) -> SearchResult<()> {
        writer
            .commit()
            .map_err(|e| SearchError::IndexingFailed(format!("Failed to commit: {}", e)))?;
        self.reader.reload()?;
        *self.last_commit.write().await = Some(chrono::Utc::now());
        Ok(())
    }

    /// Clear the entire index
    pub async fn clear_index(&self) -> SearchResult<()> {
        let mut writer = self.writer.write().await;
        writer.delete_all_documents().map_err(|e| {
            SearchError::IndexingFailed(format!("Failed to clear index: {}", e))
        })?;
        self.commit_locked(&mut writer).await
    }

    /// Get index statistics
    pub async fn get_stats(&self) -> SearchResult<IndexStats> {
        let searcher = self.reader.searcher();

        let total_documents = searcher
            .search(&tantivy::query::AllQuery, &Count)
            .map_err(|e| SearchError::SearchFailed(format!("Failed to count documents: {}", e)))?
            as u64;

        let num_segments = searcher.segment_readers().len();

        let index_size_bytes = self
            .config
            .index_path
            .as_ref()
            .and_then(|path| std::fs::read_dir(path).ok())
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .filter_map(|e| e.metadata().ok())
                    .map(|m| m.len())
                    .sum()
            })
            .unwrap_or(0);

        Ok(IndexStats {
            total_documents,
            index_size_bytes,
            num_segments,
            last_commit: *self.last_commit.read().await,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_index_creation_on_disk() {
        let temp_dir = TempDir::new().unwrap();
        let config = SearchConfig {
            index_path: Some(temp_dir.path().to_path_buf()),
            ..Default::default()
        };

        let manager = IndexManager::new(config).await;
        assert!(manager.is_ok());
        assert!(temp_dir.path().join("meta.json").exists());
    }

    #[tokio::test]
    async fn test_replace_by_key() {
        let manager = IndexManager::new(SearchConfig::default()).await.unwrap();

        manager
            .index_document(&WorkDocument::new("/works/OL1W", "First title"))
            .await
            .unwrap();
        manager
            .index_document(&WorkDocument::new("/works/OL1W", "Second title"))
            .await
            .unwrap();

        let stats = manager.get_stats().await.unwrap();
        assert_eq!(stats.total_documents, 1);
        assert!(stats.last_commit.is_some());
    }

    #[tokio::test]
    async fn test_delete_and_clear() {
        let manager = IndexManager::new(SearchConfig::default()).await.unwrap();
        let docs = vec![
            WorkDocument::new("/works/OL1W", "One"),
            WorkDocument::new("/works/OL2W", "Two"),
            WorkDocument::new("/works/OL3W", "Three"),
        ];
        assert_eq!(manager.index_documents(&docs).await.unwrap(), 3);

        manager.delete_document("/works/OL2W").await.unwrap();
        assert_eq!(manager.get_stats().await.unwrap().total_documents, 2);

        manager.clear_index().await.unwrap();
        assert_eq!(manager.get_stats().await.unwrap().total_documents, 0);
    }
}
