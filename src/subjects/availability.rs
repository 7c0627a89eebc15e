//! Availability enrichment of work summaries

use crate::subjects::assembler::WorkSummary;
use crate::subjects::error::SubjectResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Lending status of a work
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, EnumString, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AvailabilityStatus {
    /// Public scan, readable by anyone
    Open,
    /// A lendable copy is available
    BorrowAvailable,
    /// All lendable copies are checked out
    BorrowUnavailable,
    /// Scanned but not lendable
    Private,
    /// Status lookup failed
    Error,
}

/// Availability attached to a work summary
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Availability {
    pub status: AvailabilityStatus,

    /// Identifier of the edition the status refers to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
}

impl Availability {
    pub fn new(status: AvailabilityStatus, identifier: Option<String>) -> Self {
        Self { status, identifier }
    }
}

/// Decorates works with availability.
///
/// Enrichment happens in place. On error the caller discards any availability
/// already written, so partial updates are never served.
#[async_trait]
pub trait AvailabilityEnricher: Send + Sync {
    /// Enricher name, used in logs
    fn name(&self) -> &str;

    /// Set `availability` on a page of works
    async fn enrich(&self, works: &mut [WorkSummary]) -> SubjectResult<()>;
}

/// Leaves works untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAvailability;

#[async_trait]
impl AvailabilityEnricher for NoAvailability {
    fn name(&self) -> &str {
        "none"
    }

    async fn enrich(&self, _works: &mut [WorkSummary]) -> SubjectResult<()> {
        Ok(())
    }
}

/// Derives availability from the scan and lending flags carried by each work
#[derive(Debug, Clone, Copy, Default)]
pub struct IndexFlagAvailability;

impl IndexFlagAvailability {
    fn availability_for(work: &WorkSummary) -> Option<Availability> {
        if work.public_scan {
            Some(Availability::new(AvailabilityStatus::Open, work.ia.clone()))
        } else if let Some(edition) = &work.lending_edition {
            Some(Availability::new(
                AvailabilityStatus::BorrowAvailable,
                Some(edition.clone()),
            ))
        } else {
            work.ia
                .as_ref()
                .map(|ia| Availability::new(AvailabilityStatus::Private, Some(ia.clone())))
        }
    }
}

#[async_trait]
impl AvailabilityEnricher for IndexFlagAvailability {
    fn name(&self) -> &str {
        "index_flags"
    }

    async fn enrich(&self, works: &mut [WorkSummary]) -> SubjectResult<()> {
        for work in works.iter_mut() {
            work.availability = Self::availability_for(work);
        }
        Ok(())
    }
}
