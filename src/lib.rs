//! Subject query and aggregation engine.
//!
//! Resolves subject keys (people, places, time periods and topics), queries a
//! faceted work index and reshapes the results into subject summaries with
//! facet breakdowns and a publishing history.

pub mod api;
pub mod config;
pub mod error;
pub mod metrics;
pub mod search;
pub mod subjects;

pub use error::{AppError, Result};
