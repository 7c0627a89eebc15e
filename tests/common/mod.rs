//! Shared fixtures for integration tests
#![allow(dead_code)]

use std::sync::Arc;
use subject_engine::search::{SearchConfig, SearchService, WorkDocument};
use tempfile::TempDir;

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// A small work corpus around love and Plato
pub fn corpus() -> Vec<WorkDocument> {
    vec![
        WorkDocument {
            edition_count: 120,
            first_publish_year: Some(1951),
            ia: strings(&["symposium00plat", "symposium01plat"]),
            author_key: strings(&["/authors/OL12823A"]),
            author_name: strings(&["Plato"]),
            has_fulltext: true,
            public_scan_b: true,
            subject: strings(&["Love", "Philosophy"]),
            person: strings(&["Plato", "Socrates"]),
            place: strings(&["Athens"]),
            publisher: strings(&["Penguin Books"]),
            language: strings(&["eng"]),
            publish_year: vec![1951, 1999],
            ..WorkDocument::new("/works/OL1W", "Symposium")
        },
        WorkDocument {
            edition_count: 80,
            first_publish_year: Some(1973),
            author_key: strings(&["/authors/OL12823A"]),
            author_name: strings(&["Plato"]),
            subject: strings(&["Love", "Rhetoric"]),
            person: strings(&["Plato", "Socrates"]),
            publisher: strings(&["Penguin Books", "Hackett"]),
            language: strings(&["eng"]),
            publish_year: vec![999, 1973],
            ..WorkDocument::new("/works/OL2W", "Phaedrus")
        },
        WorkDocument {
            edition_count: 300,
            first_publish_year: Some(1992),
            author_key: strings(&["/authors/OL12823A"]),
            author_name: strings(&["Plato"]),
            has_fulltext: true,
            lending_edition_s: Some("OL5M".to_string()),
            subject: strings(&["Justice", "Philosophy"]),
            person: strings(&["Plato", "Socrates"]),
            place: strings(&["Athens"]),
            publisher: strings(&["Hackett"]),
            language: strings(&["eng"]),
            publish_year: vec![1992, 2500],
            ..WorkDocument::new("/works/OL3W", "Republic")
        },
        WorkDocument {
            edition_count: 90,
            first_publish_year: Some(1985),
            author_key: strings(&["/authors/OL1A"]),
            author_name: strings(&["Gabriel García Márquez"]),
            subject: strings(&["Love", "Fiction"]),
            place: strings(&["Colombia"]),
            publisher: strings(&["Knopf"]),
            language: strings(&["eng", "spa"]),
            publish_year: vec![1985],
            ..WorkDocument::new("/works/OL4W", "Love in the Time of Cholera")
        },
        WorkDocument {
            edition_count: 40,
            first_publish_year: Some(1990),
            author_key: strings(&["/authors/OL2A"]),
            author_name: strings(&["Xenophon"]),
            subject: strings(&["History"]),
            person: strings(&["Cyrus"]),
            place: strings(&["Persia"]),
            time: strings(&["4th century BC"]),
            publisher: strings(&["Hackett"]),
            language: strings(&["eng"]),
            publish_year: vec![1990],
            ..WorkDocument::new("/works/OL5W", "Anabasis")
        },
    ]
}

/// In-memory search service loaded with [`corpus`]
pub async fn loaded_service() -> Arc<SearchService> {
    let service = SearchService::new(SearchConfig::default()).await.unwrap();
    service.index_works(&corpus()).await.unwrap();
    Arc::new(service)
}

/// On-disk search service; keep the returned directory alive for the test
pub async fn on_disk_service() -> (SearchService, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let config = SearchConfig {
        index_path: Some(temp_dir.path().to_path_buf()),
        realtime_indexing: true,
        ..Default::default()
    };

    (SearchService::new(config).await.unwrap(), temp_dir)
}
