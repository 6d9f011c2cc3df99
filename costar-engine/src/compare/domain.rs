//! What each selection kind compares
//!
//! - [`SharedCast`] - selected titles → people credited on every one of them
//! - [`SharedFilmography`] - selected people → titles every one of them is credited on

use crate::intersect::Intersectable;
use crate::model::{NormalizedPerson, NormalizedPersonRole, NormalizedTitle, NormalizedTitleRole};
use crate::normalize::{normalize_person_credits, normalize_title_credits};
use crate::provider::{MetadataProvider, ProviderError};
use crate::selection::SelectionEntry;
use async_trait::async_trait;

/// Fetch + normalize strategy for one selection kind
#[async_trait]
pub trait ComparisonDomain: Send + Sync + 'static {
    type Entry: SelectionEntry;
    type Record: Intersectable + std::fmt::Debug + Send + Sync + 'static;

    /// What is fetched per entry, for error messages ("cast and crew")
    const ASPECT: &'static str;

    /// Raw credits of one entry, normalized
    async fn fetch(
        &self,
        provider: &dyn MetadataProvider,
        entry: &Self::Entry,
    ) -> Result<Vec<Self::Record>, ProviderError>;

    fn empty_source_message(source_name: &str) -> String;

    /// Heading for a one-entry selection, which lists that entry's own records
    fn single_heading(source_name: &str) -> String;

    fn no_common_message(sources: usize) -> String;
}

/// Shared cast and crew across titles
#[derive(Debug, Clone, Copy, Default)]
pub struct SharedCast;

#[async_trait]
impl ComparisonDomain for SharedCast {
    type Entry = NormalizedTitle;
    type Record = NormalizedPersonRole;

    const ASPECT: &'static str = "cast and crew";

    async fn fetch(
        &self,
        provider: &dyn MetadataProvider,
        entry: &NormalizedTitle,
    ) -> Result<Vec<NormalizedPersonRole>, ProviderError> {
        let raw = provider.title_credits(entry.key()).await?;
        Ok(normalize_title_credits(&raw))
    }

    fn empty_source_message(source_name: &str) -> String {
        format!("No cast or crew information for {}", source_name)
    }

    fn single_heading(source_name: &str) -> String {
        format!("Cast and crew of {}", source_name)
    }

    fn no_common_message(sources: usize) -> String {
        format!("No shared cast or crew across {} titles", sources)
    }
}

/// Shared titles across people
#[derive(Debug, Clone, Copy, Default)]
pub struct SharedFilmography;

#[async_trait]
impl ComparisonDomain for SharedFilmography {
    type Entry = NormalizedPerson;
    type Record = NormalizedTitleRole;

    const ASPECT: &'static str = "credits";

    async fn fetch(
        &self,
        provider: &dyn MetadataProvider,
        entry: &NormalizedPerson,
    ) -> Result<Vec<NormalizedTitleRole>, ProviderError> {
        let raw = provider.person_credits(entry.id).await?;
        Ok(normalize_person_credits(&raw))
    }

    fn empty_source_message(source_name: &str) -> String {
        format!("No credits found for {}", source_name)
    }

    fn single_heading(source_name: &str) -> String {
        format!("Credits of {}", source_name)
    }

    fn no_common_message(sources: usize) -> String {
        format!("No shared titles across {} people", sources)
    }
}
