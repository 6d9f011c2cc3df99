//! costar-engine library interface
//!
//! Selection, normalization and N-way comparison of film/TV credits.
//! The `costar` binary is a thin CLI over these modules.

pub mod compare;
pub mod error;
pub mod intersect;
pub mod model;
pub mod normalize;
pub mod provider;
pub mod selection;

pub use crate::compare::{
    compare, ComparisonDomain, ComparisonError, ComparisonOrchestrator, ComparisonOutcome,
    ComparisonState, ComparisonStatus, SharedCast, SharedFilmography,
};
pub use crate::error::{EngineError, EngineResult};
pub use crate::intersect::{intersect, Attribution, CommonEntity, Intersection, SourceCollection};
pub use crate::model::{
    MediaKind, NormalizedPerson, NormalizedPersonRole, NormalizedTitle, NormalizedTitleRole,
    RoleKind, TitleKey,
};
pub use crate::provider::{MetadataProvider, ProviderError, TmdbClient};
pub use crate::selection::{SelectionEntry, SelectionStore};
