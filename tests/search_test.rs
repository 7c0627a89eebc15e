//! Tests for the embedded search index

mod common;

use subject_engine::search::*;
use subject_engine::subjects::{resolve, QueryBuilder, SubjectRequest};
use tempfile::TempDir;

fn spec_for(key: &str) -> subject_engine::subjects::QuerySpec {
    QueryBuilder::default().build(&resolve(key), &SubjectRequest::new(key))
}

#[tokio::test]
async fn test_search_service_creation() {
    let (service, _dir) = common::on_disk_service().await;
    let stats = service.get_stats().await.unwrap();

    assert_eq!(stats.total_documents, 0);
    assert!(stats.index_size_bytes > 0); // Index directory exists
}

#[tokio::test]
async fn test_index_persists_across_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let config = SearchConfigBuilder::new()
        .index_path(temp_dir.path().to_path_buf())
        .build();

    {
        let service = SearchService::new(config.clone()).await.unwrap();
        assert_eq!(service.index_works(&common::corpus()).await.unwrap(), 5);
    }

    let reopened = SearchService::new(config).await.unwrap();
    let hits = reopened.search(&spec_for("/subjects/person:plato")).await.unwrap();
    assert_eq!(hits.total_count, 3);
}

#[tokio::test]
async fn test_reindex_replaces_by_key() {
    let (service, _dir) = common::on_disk_service().await;
    service.index_works(&common::corpus()).await.unwrap();

    let mut symposium = common::corpus().remove(0);
    symposium.subject = vec!["Friendship".to_string()];
    service.index_work(&symposium).await.unwrap();

    assert_eq!(service.get_stats().await.unwrap().total_documents, 5);
    assert_eq!(service.search(&spec_for("/subjects/love")).await.unwrap().total_count, 2);
    assert_eq!(
        service.search(&spec_for("/subjects/friendship")).await.unwrap().total_count,
        1
    );
}

#[tokio::test]
async fn test_delete_work() {
    let service = common::loaded_service().await;

    service.delete_work("/works/OL4W").await.unwrap();

    let hits = service.search(&spec_for("/subjects/love")).await.unwrap();
    assert_eq!(hits.total_count, 2);
    assert!(hits.documents.iter().all(|d| d.key != "/works/OL4W"));
}

#[tokio::test]
async fn test_documents_round_trip_through_store() {
    let service = common::loaded_service().await;

    let hits = service.search(&spec_for("/subjects/history")).await.unwrap();
    assert_eq!(hits.documents.len(), 1);
    assert_eq!(hits.documents[0], common::corpus()[4]);
}

#[tokio::test]
async fn test_deferred_commit() {
    let temp_dir = TempDir::new().unwrap();
    let config = SearchConfigBuilder::new()
        .index_path(temp_dir.path().to_path_buf())
        .realtime_indexing(false)
        .build();
    let service = SearchService::new(config).await.unwrap();

    service.index_work(&common::corpus()[0]).await.unwrap();
    assert_eq!(service.get_stats().await.unwrap().total_documents, 0);

    service.commit().await.unwrap();
    assert_eq!(service.get_stats().await.unwrap().total_documents, 1);
}

#[tokio::test]
async fn test_clear_index() {
    let service = common::loaded_service().await;
    service.clear_index().await.unwrap();

    let hits = service.search(&spec_for("/subjects/love")).await.unwrap();
    assert_eq!(hits.total_count, 0);
    assert!(hits.documents.is_empty());
}
