//! Subject type registry and key parsing

use crate::subjects::facets::FacetKind;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Kind of subject a key refers to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, EnumString, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SubjectType {
    Person,
    Place,
    Time,
    Subject,
}

/// Static description of one subject type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubjectTypeDescriptor {
    /// Subject type
    pub subject_type: SubjectType,

    /// Name of the facet list holding subjects of this type ("people", "places", ...)
    pub collection: &'static str,

    /// Key prefix, e.g. `/subjects/person:`
    pub prefix: &'static str,

    /// Facet whose values are display names of this type
    pub facet: FacetKind,

    /// Index field holding normalized keys of this type
    pub facet_key: &'static str,
}

/// Registered subject types, most specific prefix first.
///
/// The generic `/subjects/` prefix is a prefix of every other entry and must stay last.
pub static SUBJECT_TYPES: [SubjectTypeDescriptor; 4] = [
    SubjectTypeDescriptor {
        subject_type: SubjectType::Person,
        collection: "people",
        prefix: "/subjects/person:",
        facet: FacetKind::Person,
        facet_key: "person_key",
    },
    SubjectTypeDescriptor {
        subject_type: SubjectType::Place,
        collection: "places",
        prefix: "/subjects/place:",
        facet: FacetKind::Place,
        facet_key: "place_key",
    },
    SubjectTypeDescriptor {
        subject_type: SubjectType::Time,
        collection: "times",
        prefix: "/subjects/time:",
        facet: FacetKind::Time,
        facet_key: "time_key",
    },
    SubjectTypeDescriptor {
        subject_type: SubjectType::Subject,
        collection: "subjects",
        prefix: "/subjects/",
        facet: FacetKind::Subject,
        facet_key: "subject_key",
    },
];

/// Descriptor used when no prefix matches
pub fn generic_descriptor() -> &'static SubjectTypeDescriptor {
    &SUBJECT_TYPES[SUBJECT_TYPES.len() - 1]
}

/// Descriptor for a subject type
pub fn descriptor_for_type(subject_type: SubjectType) -> &'static SubjectTypeDescriptor {
    SUBJECT_TYPES
        .iter()
        .find(|d| d.subject_type == subject_type)
        .unwrap_or_else(generic_descriptor)
}

/// Descriptor whose display names live in the given facet
pub fn descriptor_for_facet(facet: &FacetKind) -> Option<&'static SubjectTypeDescriptor> {
    SUBJECT_TYPES.iter().find(|d| &d.facet == facet)
}

/// A subject key split into its type descriptor and raw path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectKey {
    /// Matched descriptor
    pub descriptor: &'static SubjectTypeDescriptor,

    /// Key as supplied by the caller
    pub key: String,

    /// Key with the descriptor prefix stripped
    pub path: String,
}

impl SubjectKey {
    /// Subject type of this key
    pub fn subject_type(&self) -> SubjectType {
        self.descriptor.subject_type
    }

    /// Normalized path, as stored in the descriptor's key field
    pub fn normalized_path(&self) -> String {
        normalize_path(&self.path)
    }

    /// Display name derived from the path (underscores back to spaces)
    pub fn display_name(&self) -> String {
        self.path.replace('_', " ")
    }
}

/// Resolve a key against the registered subject types.
///
/// First literal prefix match wins. Keys matching no prefix fall back to the
/// generic descriptor, with the final path segment used as the path.
pub fn resolve(key: &str) -> SubjectKey {
    for descriptor in SUBJECT_TYPES.iter() {
        if let Some(path) = key.strip_prefix(descriptor.prefix) {
            return SubjectKey {
                descriptor,
                key: key.to_string(),
                path: path.to_string(),
            };
        }
    }

    let path = key.rsplit('/').next().unwrap_or(key);
    SubjectKey {
        descriptor: generic_descriptor(),
        key: key.to_string(),
        path: path.to_string(),
    }
}

/// Characters removed when turning a display name into an index key
const DROPPED_CHARS: &[char] = &[
    ';', '/', '?', ':', '@', '&', '=', '+', '$', ',', '<', '>', '#', '%', '"', '{', '}', '|',
    '\\', '^', '[', ']', '`', '\n', '\r',
];

/// Convert a display name or raw path into the token form used by the index.
///
/// Lower-cases, drops URL-reserved punctuation and folds whitespace to `_`.
/// Idempotent.
pub fn normalize_path(path: &str) -> String {
    path.chars()
        .flat_map(char::to_lowercase)
        .filter(|c| !DROPPED_CHARS.contains(c))
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect()
}

/// Canonical (lower-case) form of a requested key
pub fn canonical_key(key: &str) -> String {
    key.to_lowercase()
}
