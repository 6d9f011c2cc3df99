//! Selection schema migration
//!
//! Runs once when a [`SelectionStore`](super::SelectionStore) is loaded.
//!
//! **Algorithm:**
//! 1. Current key present → parse the array, drop invalid or duplicate entries,
//!    delete any leftover legacy slot keys
//! 2. Else legacy slot keys present → read whichever slots parse, write them as
//!    an array under the current key, delete both slot keys
//! 3. Else (first-ever launch) → seed defaults if enabled, write under the current key
//!
//! Every path ends with the current key written and no legacy keys present, so a
//! second run always takes path 1 and yields the same list.

use super::SelectionEntry;
use costar_common::{KeyValueStore, Result};
use serde_json::Value;
use std::collections::HashSet;
use tracing::{info, warn};

/// Which storage layout the selection was loaded from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    Current,
    Legacy,
    FirstLaunch,
}

/// Summary of one load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    pub source: LoadSource,
    /// Entries kept
    pub loaded: usize,
    /// Entries dropped as invalid or duplicate
    pub dropped: usize,
}

/// Load a selection, migrating older layouts in place
pub async fn load_and_migrate<E: SelectionEntry>(
    kv: &dyn KeyValueStore,
    seed_defaults: bool,
) -> Result<(Vec<E>, MigrationReport)> {
    let kind = E::KIND.as_str();

    if let Some(raw) = kv.get(E::CURRENT_KEY).await? {
        let (entries, dropped) = parse_entry_array::<E>(&raw);
        if dropped > 0 {
            warn!(kind, dropped, "Dropped invalid persisted selection entries");
        }

        for legacy_key in E::LEGACY_KEYS {
            if kv.get(legacy_key).await?.is_some() {
                kv.delete(legacy_key).await?;
                info!(kind, key = legacy_key, "Removed leftover legacy selection key");
            }
        }

        let report = MigrationReport {
            source: LoadSource::Current,
            loaded: entries.len(),
            dropped,
        };
        return Ok((entries, report));
    }

    let mut slots = Vec::with_capacity(E::LEGACY_KEYS.len());
    for legacy_key in E::LEGACY_KEYS {
        if let Some(raw) = kv.get(legacy_key).await? {
            slots.push(raw);
        }
    }

    if !slots.is_empty() {
        let mut entries = Vec::new();
        let mut seen = HashSet::new();
        let mut dropped = 0;
        for raw in &slots {
            match parse_entry::<E>(raw) {
                Some(entry) if seen.insert(entry.key()) => entries.push(entry),
                _ => dropped += 1,
            }
        }

        kv.set(E::CURRENT_KEY, &serde_json::to_string(&entries)?).await?;
        for legacy_key in E::LEGACY_KEYS {
            kv.delete(legacy_key).await?;
        }

        info!(
            kind,
            migrated = entries.len(),
            dropped,
            "Migrated legacy selection slots to array layout"
        );

        let report = MigrationReport {
            source: LoadSource::Legacy,
            loaded: entries.len(),
            dropped,
        };
        return Ok((entries, report));
    }

    let entries = if seed_defaults {
        E::default_entries()
    } else {
        Vec::new()
    };
    kv.set(E::CURRENT_KEY, &serde_json::to_string(&entries)?).await?;

    info!(kind, seeded = entries.len(), "First launch: initialized selection");

    let report = MigrationReport {
        source: LoadSource::FirstLaunch,
        loaded: entries.len(),
        dropped: 0,
    };
    Ok((entries, report))
}

/// Parse the array layout, dropping invalid entries and later duplicates
///
/// Anything other than a JSON array counts as an empty selection.
pub fn parse_entry_array<E: SelectionEntry>(raw: &str) -> (Vec<E>, usize) {
    let items = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(items)) => items,
        Ok(_) | Err(_) => {
            warn!(kind = E::KIND.as_str(), "Persisted selection is not a JSON array");
            return (Vec::new(), 0);
        }
    };

    let total = items.len();
    let mut seen = HashSet::new();
    let entries: Vec<E> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<E>(item).ok())
        .filter(|entry| seen.insert(entry.key()))
        .collect();

    let dropped = total - entries.len();
    (entries, dropped)
}

fn parse_entry<E: SelectionEntry>(raw: &str) -> Option<E> {
    serde_json::from_str(raw).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NormalizedPerson, NormalizedTitle};
    use costar_common::MemoryKvStore;

    #[test]
    fn test_parse_drops_invalid_and_duplicate_entries() {
        let raw = r#"[
            {"id": 1, "name": "Alien"},
            {"id": "2", "name": "Aliens"},
            {"name": "No Id"},
            {"id": 3},
            {"id": 1, "name": "Alien (again)"},
            {"id": 1, "media_kind": "series", "name": "Alien: Earth"}
        ]"#;

        let (entries, dropped) = parse_entry_array::<NormalizedTitle>(raw);

        let names: Vec<&str> = entries.iter().map(|e| e.display_name.as_str()).collect();
        assert_eq!(names, vec!["Alien", "Alien: Earth"]);
        assert_eq!(dropped, 4);
    }

    #[test]
    fn test_parse_keeps_entries_with_odd_optional_fields() {
        let raw = r#"[
            {"id": 1, "name": "A", "popularity": null},
            {"id": 2, "name": "B", "release_year": "2010"},
            {"id": 3, "name": "C", "popularity": "12.5"}
        ]"#;

        let (entries, dropped) = parse_entry_array::<NormalizedTitle>(raw);

        assert_eq!(dropped, 0);
        let ids: Vec<u64> = entries.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert!(entries.iter().all(|e| e.popularity == 0.0 && e.release_year.is_none()));
    }

    #[test]
    fn test_parse_non_array_is_empty() {
        let (entries, dropped) = parse_entry_array::<NormalizedPerson>(r#"{"id": 1, "name": "X"}"#);
        assert!(entries.is_empty());
        assert_eq!(dropped, 0);

        let (entries, _) = parse_entry_array::<NormalizedPerson>("not json");
        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn test_first_launch_seeds_and_persists() {
        let kv = MemoryKvStore::new();

        let (entries, report) = load_and_migrate::<NormalizedPerson>(&kv, true).await.unwrap();

        assert_eq!(report.source, LoadSource::FirstLaunch);
        assert_eq!(entries, NormalizedPerson::default_entries());
        assert!(kv.get("selected_people").await.unwrap().is_some());

        // Second launch reads what the first one wrote
        let (again, report) = load_and_migrate::<NormalizedPerson>(&kv, true).await.unwrap();
        assert_eq!(report.source, LoadSource::Current);
        assert_eq!(again, entries);
    }

    #[tokio::test]
    async fn test_first_launch_without_seeding_is_empty() {
        let kv = MemoryKvStore::new();

        let (entries, _) = load_and_migrate::<NormalizedTitle>(&kv, false).await.unwrap();

        assert!(entries.is_empty());
        assert_eq!(kv.get("selected_titles").await.unwrap().as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn test_emptied_selection_is_not_reseeded() {
        let kv = MemoryKvStore::with_entries([("selected_titles", "[]")]);

        let (entries, report) = load_and_migrate::<NormalizedTitle>(&kv, true).await.unwrap();

        assert!(entries.is_empty());
        assert_eq!(report.source, LoadSource::Current);
    }

    #[tokio::test]
    async fn test_legacy_slots_with_same_identity_collapse() {
        let kv = MemoryKvStore::with_entries([
            ("selected_person_1", r#"{"id": 5, "name": "Y"}"#),
            ("selected_person_2", r#"{"id": 5, "name": "Y again"}"#),
        ]);

        let (entries, report) = load_and_migrate::<NormalizedPerson>(&kv, true).await.unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "Y");
        assert_eq!(report.dropped, 1);
        assert!(kv.get("selected_person_1").await.unwrap().is_none());
        assert!(kv.get("selected_person_2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_invalid_legacy_slots_migrate_to_empty_array() {
        let kv = MemoryKvStore::with_entries([("selected_title_2", "garbage")]);

        let (entries, report) = load_and_migrate::<NormalizedTitle>(&kv, true).await.unwrap();

        assert!(entries.is_empty(), "legacy layout present, so no seeding");
        assert_eq!(report.source, LoadSource::Legacy);
        assert_eq!(kv.get("selected_titles").await.unwrap().as_deref(), Some("[]"));
        assert!(kv.get("selected_title_2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_current_key_wins_and_leftover_legacy_removed() {
        let kv = MemoryKvStore::with_entries([
            ("selected_titles", r#"[{"id": 1, "name": "A"}]"#),
            ("selected_title_1", r#"{"id": 9, "name": "Stale"}"#),
        ]);

        let (entries, report) = load_and_migrate::<NormalizedTitle>(&kv, true).await.unwrap();

        assert_eq!(report.source, LoadSource::Current);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, 1);
        assert!(kv.get("selected_title_1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_legacy_slots_with_odd_optional_fields_migrate() {
        let kv = MemoryKvStore::with_entries([
            ("selected_title_1", r#"{"id": 1, "name": "A", "popularity": null}"#),
            ("selected_title_2", r#"{"id": 2, "name": "B", "release_year": "2010"}"#),
        ]);

        let (entries, report) = load_and_migrate::<NormalizedTitle>(&kv, true).await.unwrap();

        assert_eq!(report.source, LoadSource::Legacy);
        assert_eq!(report.dropped, 0);
        let names: Vec<&str> = entries.iter().map(|e| e.display_name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(entries[1].release_year, None);
    }

    #[tokio::test]
    async fn test_legacy_person_slot_with_mistyped_popularity_migrates() {
        let kv = MemoryKvStore::with_entries([(
            "selected_person_1",
            r#"{"id": 3, "name": "C", "popularity": "12.5", "profile_ref": 7}"#,
        )]);

        let (entries, report) = load_and_migrate::<NormalizedPerson>(&kv, true).await.unwrap();

        assert_eq!(report.dropped, 0);
        assert_eq!(entries, vec![NormalizedPerson::new(3, "C")]);
    }
}
