//! Comparison
//!
//! Turns a selection into a comparison outcome: fetch every entry's credits
//! concurrently, normalize, intersect. [`ComparisonOrchestrator`] drives this
//! from selection changes and publishes the latest state.
//!
//! # Outcomes
//! - Any fetch fails → one [`ComparisonError`] naming the failing source, no partial list
//! - Any source normalizes to nothing → [`ComparisonOutcome::EmptySource`]
//! - Nothing shared by all sources → [`ComparisonOutcome::NoCommon`]
//! - Otherwise → [`ComparisonOutcome::Common`] (one source: every record, self-paired)

pub mod domain;
pub mod orchestrator;

pub use domain::{ComparisonDomain, SharedCast, SharedFilmography};
pub use orchestrator::ComparisonOrchestrator;

use crate::intersect::{intersect, CommonEntity, Intersection, SourceCollection};
use crate::provider::MetadataProvider;
use crate::selection::SelectionEntry;
use costar_common::events::ComparisonMode;
use futures::future::try_join_all;
use thiserror::Error;
use tracing::{debug, warn};

/// Comparison errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ComparisonError {
    /// A fetch failed; the whole cycle is aborted
    #[error("Could not load {aspect} for {source_name}: {reason}")]
    SourceUnavailable {
        source_name: String,
        aspect: &'static str,
        reason: String,
    },

    #[error("Comparison failed: {0}")]
    Internal(String),
}

/// Result of a completed comparison
#[derive(Debug, Clone)]
pub enum ComparisonOutcome<T> {
    Common(Vec<CommonEntity<T>>),
    EmptySource { source_name: String, message: String },
    NoCommon { sources: usize, message: String },
}

impl<T> ComparisonOutcome<T> {
    /// Common entities (empty for the other outcomes)
    pub fn entities(&self) -> &[CommonEntity<T>] {
        match self {
            ComparisonOutcome::Common(entities) => entities,
            _ => &[],
        }
    }

    /// User-facing message, if the outcome has no entities to show
    pub fn message(&self) -> Option<&str> {
        match self {
            ComparisonOutcome::Common(_) => None,
            ComparisonOutcome::EmptySource { message, .. } | ComparisonOutcome::NoCommon { message, .. } => {
                Some(message)
            }
        }
    }
}

/// Where a comparison cycle stands
#[derive(Debug, Clone)]
pub enum ComparisonStatus<T> {
    /// Nothing to compare
    Idle,
    Loading,
    Ready(ComparisonOutcome<T>),
    Failed(ComparisonError),
}

/// Published comparison state
#[derive(Debug, Clone)]
pub struct ComparisonState<T> {
    /// Monotonic cycle number; 0 before the first selection is seen
    pub cycle: u64,
    pub mode: ComparisonMode,
    pub status: ComparisonStatus<T>,
}

impl<T> Default for ComparisonState<T> {
    fn default() -> Self {
        Self {
            cycle: 0,
            mode: ComparisonMode::Empty,
            status: ComparisonStatus::Idle,
        }
    }
}

impl<T> ComparisonState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self.status, ComparisonStatus::Loading)
    }

    pub fn outcome(&self) -> Option<&ComparisonOutcome<T>> {
        match &self.status {
            ComparisonStatus::Ready(outcome) => Some(outcome),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ComparisonError> {
        match &self.status {
            ComparisonStatus::Failed(error) => Some(error),
            _ => None,
        }
    }
}

/// Fetch, normalize and intersect the given entries (at least one)
///
/// Fetches run concurrently; the first failure aborts the rest.
pub async fn compare<D: ComparisonDomain>(
    domain: &D,
    provider: &dyn MetadataProvider,
    entries: &[D::Entry],
) -> Result<ComparisonOutcome<D::Record>, ComparisonError> {
    let fetches = entries.iter().map(|entry| async move {
        match domain.fetch(provider, entry).await {
            Ok(records) => {
                debug!(
                    source = entry.display_name(),
                    records = records.len(),
                    "Fetched and normalized source"
                );
                Ok(SourceCollection::new(entry.display_name(), records))
            }
            Err(e) => {
                warn!(source = entry.display_name(), error = %e, "Source unavailable");
                Err(ComparisonError::SourceUnavailable {
                    source_name: entry.display_name().to_string(),
                    aspect: D::ASPECT,
                    reason: e.to_string(),
                })
            }
        }
    });

    let sources = try_join_all(fetches).await?;

    let intersection = intersect(&sources).map_err(|e| ComparisonError::Internal(e.to_string()))?;

    Ok(match intersection {
        Intersection::Common(entities) => ComparisonOutcome::Common(entities),
        Intersection::EmptySource { source_name, .. } => ComparisonOutcome::EmptySource {
            message: D::empty_source_message(&source_name),
            source_name,
        },
        Intersection::NoCommon { sources } => ComparisonOutcome::NoCommon {
            sources,
            message: D::no_common_message(sources),
        },
    })
}
