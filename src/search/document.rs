//! Work documents and the embedded index schema

use crate::subjects::{normalize_path, FacetKind, SUBJECT_TYPES};
use serde::{Deserialize, Serialize};
use tantivy::schema::*;
use tantivy::TantivyDocument;

/// Name of the hierarchical facet field in the embedded index
pub const FACETS_FIELD: &str = "facets";

/// Name of the stored JSON copy of the document
pub const SOURCE_FIELD: &str = "source";

/// Trait for documents that can be indexed and searched
pub trait SearchDocument {
    /// Convert to Tantivy document
    fn to_tantivy_doc(&self, schema: &Schema) -> TantivyDocument;

    /// Get document ID
    fn document_id(&self) -> String;
}

/// A work record as stored in, and returned by, the search index.
///
/// Field names follow the work search index so backend documents deserialize directly.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorkDocument {
    /// Work key, e.g. `/works/OL45883W`
    pub key: String,

    pub title: String,

    pub edition_count: u64,

    pub first_publish_year: Option<i32>,

    /// Internet Archive identifiers of scanned editions
    pub ia: Vec<String>,

    pub author_key: Vec<String>,

    pub author_name: Vec<String>,

    pub has_fulltext: bool,

    pub public_scan_b: bool,

    pub lending_edition_s: Option<String>,

    pub cover_i: Option<i64>,

    pub cover_edition_key: Option<String>,

    /// Subject display names
    pub subject: Vec<String>,

    /// Person display names
    pub person: Vec<String>,

    /// Place display names
    pub place: Vec<String>,

    /// Time period display names
    pub time: Vec<String>,

    pub publisher: Vec<String>,

    pub language: Vec<String>,

    pub publish_year: Vec<i32>,
}

impl WorkDocument {
    pub fn new(key: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    /// Display names stored for a subject-type facet
    fn names_for(&self, facet: FacetKind) -> &[String] {
        match facet {
            FacetKind::Subject => &self.subject,
            FacetKind::Person => &self.person,
            FacetKind::Place => &self.place,
            FacetKind::Time => &self.time,
            FacetKind::Publisher => &self.publisher,
            FacetKind::Language => &self.language,
            FacetKind::Author | FacetKind::PublishYear | FacetKind::HasFulltext => &[],
        }
    }

    /// Facet values contributed by this document, as `(facet, value)` pairs
    pub fn facet_values(&self) -> Vec<(FacetKind, String)> {
        let mut values = Vec::new();

        for (key, name) in self.author_key.iter().zip(self.author_name.iter()) {
            values.push((FacetKind::Author, format!("{} {}", author_id(key), name)));
        }

        for facet in [
            FacetKind::Subject,
            FacetKind::Person,
            FacetKind::Place,
            FacetKind::Time,
            FacetKind::Publisher,
            FacetKind::Language,
        ] {
            for value in self.names_for(facet) {
                values.push((facet, value.clone()));
            }
        }

        for year in &self.publish_year {
            values.push((FacetKind::PublishYear, year.to_string()));
        }

        values.push((FacetKind::HasFulltext, self.has_fulltext.to_string()));

        values.retain(|(_, v)| !v.trim().is_empty());
        values.sort();
        values.dedup();
        values
    }
}

/// Bare author id (`OL1A`) from either `OL1A` or `/authors/OL1A`
fn author_id(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}

impl SearchDocument for WorkDocument {
    fn to_tantivy_doc(&self, schema: &Schema) -> TantivyDocument {
        let mut doc = TantivyDocument::new();

        if let Ok(field) = schema.get_field("key") {
            doc.add_text(field, &self.key);
        }

        if let Ok(field) = schema.get_field("title") {
            doc.add_text(field, &self.title);
        }

        if let Ok(field) = schema.get_field("edition_count") {
            doc.add_u64(field, self.edition_count);
        }

        if let Some(year) = self.first_publish_year {
            if let Ok(field) = schema.get_field("first_publish_year") {
                doc.add_i64(field, year as i64);
            }
        }

        if let Ok(field) = schema.get_field("has_fulltext") {
            doc.add_text(field, if self.has_fulltext { "true" } else { "false" });
        }

        // Normalized subject keys, one field per subject type
        for descriptor in SUBJECT_TYPES.iter() {
            if let Ok(field) = schema.get_field(descriptor.facet_key) {
                for name in self.names_for(descriptor.facet) {
                    doc.add_text(field, normalize_path(name));
                }
            }
        }

        if let Ok(field) = schema.get_field("publish_year") {
            for year in &self.publish_year {
                doc.add_i64(field, *year as i64);
            }
        }

        if let Ok(field) = schema.get_field(FACETS_FIELD) {
            for (facet, value) in self.facet_values() {
                doc.add_facet(field, Facet::from_path([facet.field_name(), value.as_str()]));
            }
        }

        if let Ok(field) = schema.get_field(SOURCE_FIELD) {
            doc.add_text(field, serde_json::to_string(self).unwrap_or_default());
        }

        doc
    }

    fn document_id(&self) -> String {
        self.key.clone()
    }
}

/// Build the search schema for works
pub fn build_work_schema() -> Schema {
    let mut schema_builder = Schema::builder();

    // Work key - exact match, stored
    schema_builder.add_text_field("key", STRING | STORED);

    // Title - full-text indexed
    schema_builder.add_text_field("title", TEXT);

    // Sort fields
    schema_builder.add_u64_field("edition_count", INDEXED | FAST);
    schema_builder.add_i64_field("first_publish_year", INDEXED | FAST);

    // "true" / "false"
    schema_builder.add_text_field("has_fulltext", STRING);

    // Normalized subject keys (multi-valued)
    for descriptor in SUBJECT_TYPES.iter() {
        schema_builder.add_text_field(descriptor.facet_key, STRING);
    }

    // Publish years for range filters (multi-valued)
    schema_builder.add_i64_field("publish_year", INDEXED | FAST);

    // /<facet name>/<value>
    schema_builder.add_facet_field(FACETS_FIELD, FacetOptions::default());

    // Whole document as JSON
    schema_builder.add_text_field(SOURCE_FIELD, STORED);

    schema_builder.build()
}
