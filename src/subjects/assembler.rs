//! Assembly of subject summaries from search hits

use crate::metrics::FACET_ENTRIES_DROPPED_TOTAL;
use crate::search::{SearchHits, WorkDocument};
use crate::subjects::availability::Availability;
use crate::subjects::facets::{FacetEntry, FacetKind, FacetMapper, KeyedCount, NamedCount};
use crate::subjects::schema::{SubjectKey, SubjectType};
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Oldest year (exclusive) accepted in a publishing history
const MIN_PUBLISH_YEAR: i32 = 1000;

/// Author reference on a work summary
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthorRef {
    pub key: String,
    pub name: String,
}

/// One work in a subject page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkSummary {
    pub key: String,
    pub title: String,
    pub edition_count: u64,
    pub first_publish_year: Option<i32>,

    /// First Internet Archive identifier only
    pub ia: Option<String>,

    pub authors: Vec<AuthorRef>,
    pub has_fulltext: bool,
    pub public_scan: bool,
    pub lending_edition: Option<String>,
    pub cover_id: Option<i64>,
    pub cover_edition_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability: Option<Availability>,
}

impl From<WorkDocument> for WorkSummary {
    fn from(doc: WorkDocument) -> Self {
        let authors = doc
            .author_key
            .iter()
            .zip(doc.author_name.iter())
            .map(|(key, name)| AuthorRef {
                key: if key.starts_with("/authors/") {
                    key.clone()
                } else {
                    format!("/authors/{}", key)
                },
                name: name.clone(),
            })
            .collect();

        Self {
            key: fix_work_key(&doc.key),
            title: doc.title,
            edition_count: doc.edition_count,
            first_publish_year: doc.first_publish_year,
            ia: doc.ia.into_iter().next(),
            authors,
            has_fulltext: doc.has_fulltext,
            public_scan: doc.public_scan_b,
            lending_edition: doc.lending_edition_s,
            cover_id: doc.cover_i,
            cover_edition_key: doc.cover_edition_key,
            availability: None,
        }
    }
}

/// Repair work keys that arrive as `OL1234W/works/` into `/works/OL1234W`
pub fn fix_work_key(key: &str) -> String {
    if key.ends_with("/works/") {
        format!("/works/{}", key.replace("/works/", ""))
    } else {
        key.to_string()
    }
}

/// Summary of one subject.
///
/// Facet fields are only present in details mode.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Subject {
    pub key: String,
    pub name: String,
    pub subject_type: SubjectType,

    /// Total matches reported by the backend
    pub work_count: u64,

    pub works: Vec<WorkSummary>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ebook_count: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authors: Option<Vec<KeyedCount>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subjects: Option<Vec<KeyedCount>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub places: Option<Vec<KeyedCount>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub people: Option<Vec<KeyedCount>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub times: Option<Vec<KeyedCount>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publishers: Option<Vec<KeyedCount>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub languages: Option<Vec<NamedCount>>,

    /// `[year, count]` pairs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publishing_history: Option<Vec<(i32, u64)>>,
}

impl Subject {
    /// Facet list holding subjects of the given type
    fn related_mut(&mut self, subject_type: SubjectType) -> Option<&mut Vec<KeyedCount>> {
        match subject_type {
            SubjectType::Person => self.people.as_mut(),
            SubjectType::Place => self.places.as_mut(),
            SubjectType::Time => self.times.as_mut(),
            SubjectType::Subject => self.subjects.as_mut(),
        }
    }

    /// Remove the entry for this subject from its own facet list.
    ///
    /// The first entry whose key matches case-insensitively is removed and its
    /// display name becomes the subject name.
    fn remove_self_reference(&mut self, subject_type: SubjectType) {
        let key = self.key.to_lowercase();
        let Some(list) = self.related_mut(subject_type) else {
            return;
        };

        if let Some(pos) = list.iter().position(|entry| entry.key.to_lowercase() == key) {
            let entry = list.remove(pos);
            self.name = entry.name;
        }
    }
}

/// Builds [`Subject`]s from backend hits
#[derive(Clone, Default)]
pub struct ResultAssembler {
    mapper: FacetMapper,
    current_year: Option<i32>,
}

impl ResultAssembler {
    pub fn new(mapper: FacetMapper) -> Self {
        Self {
            mapper,
            current_year: None,
        }
    }

    /// Pin the year used to bound the publishing history
    pub fn with_current_year(mut self, year: i32) -> Self {
        self.current_year = Some(year);
        self
    }

    fn current_year(&self) -> i32 {
        self.current_year
            .unwrap_or_else(|| chrono::Utc::now().year())
    }

    /// Assemble the subject summary for `subject` from `hits`
    pub fn assemble(&self, subject: &SubjectKey, hits: SearchHits, details: bool) -> Subject {
        let mut result = Subject {
            key: subject.key.clone(),
            name: subject.display_name(),
            subject_type: subject.subject_type(),
            work_count: hits.total_count,
            works: Vec::new(),
            ebook_count: None,
            authors: None,
            subjects: None,
            places: None,
            people: None,
            times: None,
            publishers: None,
            languages: None,
            publishing_history: None,
        };

        if details {
            result.ebook_count = Some(ebook_count(&hits));

            result.subjects = Some(self.keyed(&hits, FacetKind::Subject));
            result.places = Some(self.keyed(&hits, FacetKind::Place));
            result.people = Some(self.keyed(&hits, FacetKind::Person));
            result.times = Some(self.keyed(&hits, FacetKind::Time));

            result.authors = Some(self.keyed(&hits, FacetKind::Author));
            result.publishers = Some(self.keyed(&hits, FacetKind::Publisher));
            result.languages = Some(
                self.entries(&hits, FacetKind::Language)
                    .into_iter()
                    .filter_map(FacetEntry::into_named)
                    .collect(),
            );
            result.publishing_history = Some(self.publishing_history(&hits));

            result.remove_self_reference(subject.subject_type());
        }

        result.works = hits.documents.into_iter().map(WorkSummary::from).collect();
        result
    }

    fn entries(&self, hits: &SearchHits, kind: FacetKind) -> Vec<FacetEntry> {
        let facet = kind.field_name();
        self.mapper.map_all(facet, hits.facet(facet), |e| {
            warn!(facet, error = %e, "Skipping unmappable facet entry");
            FACET_ENTRIES_DROPPED_TOTAL.with_label_values(&[facet]).inc();
        })
    }

    fn keyed(&self, hits: &SearchHits, kind: FacetKind) -> Vec<KeyedCount> {
        self.entries(hits, kind)
            .into_iter()
            .filter_map(FacetEntry::into_keyed)
            .collect()
    }

    fn publishing_history(&self, hits: &SearchHits) -> Vec<(i32, u64)> {
        let max_year = self.current_year() + 1;

        self.entries(hits, FacetKind::PublishYear)
            .into_iter()
            .filter_map(|entry| match entry {
                FacetEntry::PublishYear { year, count } => Some((year, count)),
                _ => None,
            })
            .filter(|(year, _)| *year > MIN_PUBLISH_YEAR && *year <= max_year)
            .collect()
    }
}

/// Count of the `"true"` entry of the `has_fulltext` facet
fn ebook_count(hits: &SearchHits) -> u64 {
    hits.facet(FacetKind::HasFulltext.field_name())
        .iter()
        .find(|(value, _)| value == "true")
        .map(|(_, count)| *count)
        .unwrap_or(0)
}
