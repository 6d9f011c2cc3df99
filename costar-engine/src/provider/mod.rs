//! Metadata provider collaborator
//!
//! The engine never talks HTTP itself: it asks a [`MetadataProvider`] for raw
//! credit lists and normalizes whatever comes back. Raw types mirror the JSON
//! shapes of the provider API; only the fields the normalizers consume are kept.
//!
//! [`tmdb::TmdbClient`] is the reference implementation.

pub mod tmdb;

use crate::model::TitleKey;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use tmdb::TmdbClient;

/// Provider errors
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("No API key configured (set COSTAR_TMDB_API_KEY or provider.api_key)")]
    MissingApiKey,
}

/// Cast entry on a title's credit list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawCastCredit {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub profile_path: Option<String>,
    #[serde(default)]
    pub popularity: Option<f64>,
    #[serde(default)]
    pub character: Option<String>,
}

/// Crew entry on a title's credit list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawCrewCredit {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub profile_path: Option<String>,
    #[serde(default)]
    pub popularity: Option<f64>,
    #[serde(default)]
    pub job: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
}

/// Cast and crew of one title
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTitleCredits {
    #[serde(default)]
    pub cast: Vec<RawCastCredit>,
    #[serde(default)]
    pub crew: Vec<RawCrewCredit>,
}

/// Cast entry on a person's filmography
///
/// Movies carry `title`/`release_date`, series carry `name`/`first_air_date`;
/// both land in the same fields. Which kind it is comes from the list it was
/// found in, not from these fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPersonCastCredit {
    pub id: u64,
    #[serde(default, alias = "name")]
    pub title: Option<String>,
    #[serde(default, alias = "first_air_date")]
    pub release_date: Option<String>,
    #[serde(default)]
    pub popularity: Option<f64>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub character: Option<String>,
}

/// Crew entry on a person's filmography
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPersonCrewCredit {
    pub id: u64,
    #[serde(default, alias = "name")]
    pub title: Option<String>,
    #[serde(default, alias = "first_air_date")]
    pub release_date: Option<String>,
    #[serde(default)]
    pub popularity: Option<f64>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub job: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
}

/// One filmography list (movie or TV), split into cast and crew
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawCreditList {
    #[serde(default)]
    pub cast: Vec<RawPersonCastCredit>,
    #[serde(default)]
    pub crew: Vec<RawPersonCrewCredit>,
}

/// A person's movie and TV credits
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPersonCredits {
    pub movie: RawCreditList,
    pub tv: RawCreditList,
}

/// Source of raw credit data
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Cast and crew of a title
    ///
    /// For some media kinds the crew comes from a second endpoint; implementations
    /// merge both into one [`RawTitleCredits`].
    async fn title_credits(&self, title: TitleKey) -> Result<RawTitleCredits, ProviderError>;

    /// Movie and TV credits of a person
    async fn person_credits(&self, person_id: u64) -> Result<RawPersonCredits, ProviderError>;
}
