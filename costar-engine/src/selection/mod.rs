//! Selection Store
//!
//! The ordered, identity-deduplicated list of titles or people the user picked,
//! persisted to the key-value store after every change and migrated from older
//! storage layouts on load.
//!
//! - [`entries`] - what can be selected and where each kind is stored
//! - [`migration`] - load-time schema migration
//! - [`store`] - the observable, persisted store

pub mod entries;
pub mod migration;
pub mod store;

use costar_common::events::SelectionKind;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;
use std::hash::Hash;

pub use migration::{load_and_migrate, LoadSource, MigrationReport};
pub use store::SelectionStore;

/// An entry that can live in a persisted selection
///
/// The storage layout (current key, legacy slot keys, first-launch seeds) is
/// part of the entry type, so each selection kind migrates independently.
pub trait SelectionEntry:
    Clone + Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    type Key: Eq + Hash + Clone + Debug + Send + Sync + 'static;

    const KIND: SelectionKind;

    /// Key holding the current array-shaped selection
    const CURRENT_KEY: &'static str;

    /// Fixed two-slot keys of the legacy layout, slot 1 first
    const LEGACY_KEYS: [&'static str; 2];

    fn key(&self) -> Self::Key;

    fn display_name(&self) -> &str;

    /// Entries seeded on a first-ever launch
    fn default_entries() -> Vec<Self>;
}
