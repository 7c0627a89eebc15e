//! Facet value mapping
//!
//! Raw `(value, count)` pairs returned by the search backend are turned into
//! typed [`FacetEntry`] values. Dispatch is on [`FacetKind`]; facet names the
//! engine does not know map to the generic `{name, count}` shape.

use crate::subjects::schema::{descriptor_for_facet, normalize_path};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Facets the engine knows how to map
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacetKind {
    PublishYear,
    Publisher,
    Author,
    Subject,
    Person,
    Place,
    Time,
    HasFulltext,
    Language,
}

impl FacetKind {
    /// All known facets
    pub const ALL: [FacetKind; 9] = [
        FacetKind::PublishYear,
        FacetKind::Publisher,
        FacetKind::Author,
        FacetKind::Subject,
        FacetKind::Person,
        FacetKind::Place,
        FacetKind::Time,
        FacetKind::HasFulltext,
        FacetKind::Language,
    ];

    /// Backend field name of this facet
    pub fn field_name(&self) -> &'static str {
        match self {
            FacetKind::PublishYear => "publish_year",
            FacetKind::Publisher => "publisher_facet",
            FacetKind::Author => "author_facet",
            FacetKind::Subject => "subject_facet",
            FacetKind::Person => "person_facet",
            FacetKind::Place => "place_facet",
            FacetKind::Time => "time_facet",
            FacetKind::HasFulltext => "has_fulltext",
            FacetKind::Language => "language",
        }
    }

    /// Look up a facet by backend field name
    pub fn from_field_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.field_name() == name)
    }
}

/// Errors mapping a single facet entry
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FacetError {
    /// Author facet token could not be decoded
    #[error("Malformed author facet value: {0:?}")]
    MalformedAuthor(String),

    /// Publish year facet value is not an integer
    #[error("Invalid publish year facet value: {0:?}")]
    InvalidYear(String),
}

/// Decoded author facet token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorToken {
    pub author_key: String,
    pub display_name: String,
}

/// Decodes the compound author facet token stored by the index
pub trait AuthorFacetDecoder: Send + Sync {
    /// Split a raw facet value into author key and display name.
    ///
    /// Must fail on malformed tokens rather than guess.
    fn decode(&self, raw: &str) -> Result<AuthorToken, FacetError>;
}

/// Decoder for `"<author key> <display name>"` tokens, e.g. `"OL26783A Leo Tolstoy"`
#[derive(Debug, Clone, Copy, Default)]
pub struct SpaceDelimitedAuthorDecoder;

impl AuthorFacetDecoder for SpaceDelimitedAuthorDecoder {
    fn decode(&self, raw: &str) -> Result<AuthorToken, FacetError> {
        let (key, name) = raw
            .split_once(' ')
            .ok_or_else(|| FacetError::MalformedAuthor(raw.to_string()))?;

        if key.is_empty() || name.trim().is_empty() || key.contains('/') {
            return Err(FacetError::MalformedAuthor(raw.to_string()));
        }

        Ok(AuthorToken {
            author_key: key.to_string(),
            display_name: name.to_string(),
        })
    }
}

/// Facet entry that links to another page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyedCount {
    pub key: String,
    pub name: String,
    pub count: u64,
}

/// Facet entry with only a name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedCount {
    pub name: String,
    pub count: u64,
}

/// A mapped facet value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FacetEntry {
    PublishYear { year: i32, count: u64 },
    Publisher(KeyedCount),
    Author(KeyedCount),
    Subject(KeyedCount),
    Flag { value: String, count: u64 },
    Generic(NamedCount),
}

impl FacetEntry {
    /// Keyed summary for publisher, author and subject-type entries
    pub fn into_keyed(self) -> Option<KeyedCount> {
        match self {
            FacetEntry::Publisher(k) | FacetEntry::Author(k) | FacetEntry::Subject(k) => Some(k),
            _ => None,
        }
    }

    /// Name and count, for any entry carrying a name
    pub fn into_named(self) -> Option<NamedCount> {
        match self {
            FacetEntry::Generic(n) => Some(n),
            FacetEntry::Publisher(k) | FacetEntry::Author(k) | FacetEntry::Subject(k) => {
                Some(NamedCount {
                    name: k.name,
                    count: k.count,
                })
            }
            FacetEntry::Flag { value, count } => Some(NamedCount { name: value, count }),
            FacetEntry::PublishYear { .. } => None,
        }
    }
}

/// Maps raw facet pairs into [`FacetEntry`] values
#[derive(Clone)]
pub struct FacetMapper {
    author_decoder: Arc<dyn AuthorFacetDecoder>,
}

impl FacetMapper {
    pub fn new(author_decoder: Arc<dyn AuthorFacetDecoder>) -> Self {
        Self { author_decoder }
    }

    /// Map one `(value, count)` pair of the named facet
    pub fn map(&self, facet: &str, value: &str, count: u64) -> Result<FacetEntry, FacetError> {
        let Some(kind) = FacetKind::from_field_name(facet) else {
            return Ok(FacetEntry::Generic(NamedCount {
                name: value.to_string(),
                count,
            }));
        };

        match kind {
            FacetKind::PublishYear => {
                let year = value
                    .trim()
                    .parse::<i32>()
                    .map_err(|_| FacetError::InvalidYear(value.to_string()))?;
                Ok(FacetEntry::PublishYear { year, count })
            }
            FacetKind::Publisher => Ok(FacetEntry::Publisher(KeyedCount {
                key: format!("/publishers/{}", value.replace(' ', "_")),
                name: value.to_string(),
                count,
            })),
            FacetKind::Author => {
                let token = self.author_decoder.decode(value)?;
                Ok(FacetEntry::Author(KeyedCount {
                    key: format!("/authors/{}", token.author_key),
                    name: token.display_name,
                    count,
                }))
            }
            FacetKind::Subject | FacetKind::Person | FacetKind::Place | FacetKind::Time => {
                let prefix = descriptor_for_facet(&kind).map(|d| d.prefix).unwrap_or("/subjects/");
                Ok(FacetEntry::Subject(KeyedCount {
                    key: format!("{}{}", prefix, normalize_path(value).replace(' ', "_")),
                    name: value.to_string(),
                    count,
                }))
            }
            FacetKind::HasFulltext => Ok(FacetEntry::Flag {
                value: value.to_string(),
                count,
            }),
            FacetKind::Language => Ok(FacetEntry::Generic(NamedCount {
                name: value.to_string(),
                count,
            })),
        }
    }

    /// Map a whole facet list, preserving order.
    ///
    /// Entries that fail to map are skipped and reported through `on_error`.
    pub fn map_all<F>(&self, facet: &str, pairs: &[(String, u64)], mut on_error: F) -> Vec<FacetEntry>
    where
        F: FnMut(&FacetError),
    {
        pairs
            .iter()
            .filter_map(|(value, count)| match self.map(facet, value, *count) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    on_error(&e);
                    None
                }
            })
            .collect()
    }
}

impl Default for FacetMapper {
    fn default() -> Self {
        Self::new(Arc::new(SpaceDelimitedAuthorDecoder))
    }
}
