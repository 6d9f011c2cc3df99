//! Canonical person/title model
//!
//! Everything downstream of the provider speaks these types. Identity is
//! `(id, media_kind)` for titles and `id` for people; both survive normalization
//! and intersection unchanged.

use chrono::{Datelike, NaiveDate};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Placeholder character for cast credits without one
pub const UNKNOWN_ROLE: &str = "Unknown Role";

/// Placeholder job for crew credits without one
pub const UNKNOWN_JOB: &str = "Unknown Job";

/// Placeholder department for crew credits without one
pub const OTHER_DEPARTMENT: &str = "Other";

/// Movie vs. series discriminant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    #[default]
    Movie,
    #[serde(alias = "tv")]
    Series,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Series => "series",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Title identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TitleKey {
    pub id: u64,
    pub media_kind: MediaKind,
}

impl TitleKey {
    pub fn movie(id: u64) -> Self {
        Self { id, media_kind: MediaKind::Movie }
    }

    pub fn series(id: u64) -> Self {
        Self { id, media_kind: MediaKind::Series }
    }
}

impl fmt::Display for TitleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.media_kind, self.id)
    }
}

/// Kind of credit a person holds on a title
///
/// Ordered so that `Cast` sorts first in a [`BTreeSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleKind {
    Cast,
    Crew,
}

/// A selectable title
///
/// Persisted as part of the title selection. `name` is the on-disk field name
/// and is required together with `id`; everything else is optional, and a null
/// or mistyped optional field reads as its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedTitle {
    pub id: u64,
    #[serde(default, deserialize_with = "lenient")]
    pub media_kind: MediaKind,
    #[serde(rename = "name")]
    pub display_name: String,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub release_year: Option<i32>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "is_unset")]
    pub popularity: f64,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub poster_ref: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
}

impl NormalizedTitle {
    pub fn new(key: TitleKey, display_name: impl Into<String>) -> Self {
        Self {
            id: key.id,
            media_kind: key.media_kind,
            display_name: display_name.into(),
            release_year: None,
            popularity: 0.0,
            poster_ref: None,
            overview: None,
        }
    }

    pub fn with_release_year(mut self, year: i32) -> Self {
        self.release_year = Some(year);
        self
    }

    pub fn key(&self) -> TitleKey {
        TitleKey {
            id: self.id,
            media_kind: self.media_kind,
        }
    }
}

/// A selectable person
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPerson {
    pub id: u64,
    pub name: String,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub profile_ref: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "is_unset")]
    pub popularity: f64,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub known_for_department: Option<String>,
}

impl NormalizedPerson {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            profile_ref: None,
            popularity: 0.0,
            known_for_department: None,
        }
    }
}

fn is_unset(popularity: &f64) -> bool {
    *popularity == 0.0
}

/// Optional persisted field: null or a value of the wrong type becomes the default
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Role-specific fields of one record, as shown in an attribution column
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoleFields {
    pub role_kinds: BTreeSet<RoleKind>,
    pub characters: Vec<String>,
    pub jobs: Vec<String>,
    pub departments: BTreeSet<String>,
}

impl RoleFields {
    /// One-line rendering: characters, then jobs, separated by ` · `
    ///
    /// `"Hero"`, `"Director, Writer"`, `"Hero · Director"`.
    pub fn summary(&self) -> String {
        let mut parts = Vec::with_capacity(2);
        if !self.characters.is_empty() {
            parts.push(self.characters.join(" / "));
        }
        if !self.jobs.is_empty() {
            parts.push(self.jobs.join(", "));
        }
        parts.join(" · ")
    }
}

/// One person's combined credits on a single title
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPersonRole {
    pub person_id: u64,
    pub name: String,
    pub profile_ref: Option<String>,
    pub popularity: Option<f64>,
    pub role_kinds: BTreeSet<RoleKind>,
    /// Present only when `role_kinds` contains `Cast`
    pub character: Option<String>,
    /// Non-empty only when `role_kinds` contains `Crew`
    pub jobs: Vec<String>,
    pub departments: BTreeSet<String>,
}

impl NormalizedPersonRole {
    pub fn is_cast(&self) -> bool {
        self.role_kinds.contains(&RoleKind::Cast)
    }

    pub fn is_crew(&self) -> bool {
        self.role_kinds.contains(&RoleKind::Crew)
    }

    pub fn role_fields(&self) -> RoleFields {
        RoleFields {
            role_kinds: self.role_kinds.clone(),
            characters: self.character.iter().cloned().collect(),
            jobs: self.jobs.clone(),
            departments: self.departments.clone(),
        }
    }

    pub fn role_summary(&self) -> String {
        self.role_fields().summary()
    }
}

/// One title's combined credits for a single person
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedTitleRole {
    pub title_id: u64,
    pub media_kind: MediaKind,
    pub display_name: String,
    pub release_date: Option<String>,
    pub popularity: f64,
    pub poster_ref: Option<String>,
    pub role_kinds: BTreeSet<RoleKind>,
    pub characters: Vec<String>,
    pub jobs: Vec<String>,
    pub departments: BTreeSet<String>,
    pub primary_role_kind: RoleKind,
}

impl NormalizedTitleRole {
    pub fn key(&self) -> TitleKey {
        TitleKey {
            id: self.title_id,
            media_kind: self.media_kind,
        }
    }

    /// Year component of `release_date` (`YYYY-MM-DD`)
    pub fn release_year(&self) -> Option<i32> {
        self.release_date.as_deref().and_then(parse_release_year)
    }

    pub fn role_fields(&self) -> RoleFields {
        RoleFields {
            role_kinds: self.role_kinds.clone(),
            characters: self.characters.clone(),
            jobs: self.jobs.clone(),
            departments: self.departments.clone(),
        }
    }

    pub fn role_summary(&self) -> String {
        self.role_fields().summary()
    }
}

/// Parse the year out of a provider date string
///
/// Accepts full `YYYY-MM-DD` dates and falls back to a bare leading year.
pub fn parse_release_year(date: &str) -> Option<i32> {
    let date = date.trim();
    if let Ok(parsed) = NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        return Some(parsed.year());
    }
    date.get(..4).and_then(|year| year.parse().ok())
}
