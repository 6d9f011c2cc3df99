//! N-way Intersector
//!
//! Computes the records common to every one of N normalized collections and
//! keeps, for each survivor, what role it plays in each source.
//!
//! # Rules
//! - The first collection is the candidate set; a candidate survives only if its
//!   identity appears in **all** other collections
//! - Survivors are ordered by descending popularity of the first collection's
//!   copy; ties keep first-collection order
//! - A single collection is passed through with its attribution duplicated into a
//!   second slot, so single and multi-source results render the same way
//! - Any empty collection short-circuits to [`Intersection::EmptySource`]

use crate::error::{EngineError, EngineResult};
use crate::model::{NormalizedPersonRole, NormalizedTitleRole, RoleFields, TitleKey};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;
use tracing::debug;

/// A normalized record that can take part in an intersection
pub trait Intersectable: Clone {
    type Key: Eq + Hash + Clone + Debug;

    /// Identity shared across sources
    fn key(&self) -> Self::Key;

    /// Popularity used for ordering (missing counts as 0)
    fn popularity(&self) -> f64;

    fn display_name(&self) -> &str;

    /// Role-specific fields for the attribution column
    fn role_fields(&self) -> RoleFields;
}

impl Intersectable for NormalizedPersonRole {
    type Key = u64;

    fn key(&self) -> u64 {
        self.person_id
    }

    fn popularity(&self) -> f64 {
        self.popularity.unwrap_or(0.0)
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn role_fields(&self) -> RoleFields {
        NormalizedPersonRole::role_fields(self)
    }
}

impl Intersectable for NormalizedTitleRole {
    type Key = TitleKey;

    fn key(&self) -> TitleKey {
        NormalizedTitleRole::key(self)
    }

    fn popularity(&self) -> f64 {
        self.popularity
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn role_fields(&self) -> RoleFields {
        NormalizedTitleRole::role_fields(self)
    }
}

/// One normalized collection and the display name of the entity it came from
#[derive(Debug, Clone)]
pub struct SourceCollection<T> {
    pub name: String,
    pub records: Vec<T>,
}

impl<T> SourceCollection<T> {
    pub fn new(name: impl Into<String>, records: Vec<T>) -> Self {
        Self {
            name: name.into(),
            records,
        }
    }
}

/// What a common entity does in one source
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attribution {
    pub source_index: usize,
    pub source_name: String,
    pub roles: RoleFields,
}

/// An entity present in every source, with per-source attribution
#[derive(Debug, Clone, Serialize)]
pub struct CommonEntity<T> {
    /// The first source's copy
    pub representative: T,
    /// One slot per source, in source order (two slots for a single source)
    pub attributions: Vec<Attribution>,
}

impl<T> CommonEntity<T> {
    /// Attribution for a source; the first slot wins for the duplicated single-source case
    pub fn attribution(&self, source_index: usize) -> Option<&Attribution> {
        self.attributions
            .iter()
            .find(|a| a.source_index == source_index)
    }
}

/// Result of an intersection
#[derive(Debug, Clone)]
pub enum Intersection<T> {
    /// Entities present in every source (non-empty unless the sources are)
    Common(Vec<CommonEntity<T>>),
    /// A source has nothing to compare
    EmptySource {
        source_index: usize,
        source_name: String,
    },
    /// Every source has records, but none are shared by all of them
    NoCommon { sources: usize },
}

/// Intersect N normalized collections (N ≥ 1)
pub fn intersect<T: Intersectable>(sources: &[SourceCollection<T>]) -> EngineResult<Intersection<T>> {
    let Some((first, rest)) = sources.split_first() else {
        return Err(EngineError::InvalidInput(
            "intersection needs at least one source collection".to_string(),
        ));
    };

    if let Some((source_index, empty)) = sources
        .iter()
        .enumerate()
        .find(|(_, source)| source.records.is_empty())
    {
        debug!(source_index, source = %empty.name, "Source collection empty");
        return Ok(Intersection::EmptySource {
            source_index,
            source_name: empty.name.clone(),
        });
    }

    if rest.is_empty() {
        let entities = first
            .records
            .iter()
            .map(|record| {
                let slot = Attribution {
                    source_index: 0,
                    source_name: first.name.clone(),
                    roles: record.role_fields(),
                };
                CommonEntity {
                    representative: record.clone(),
                    attributions: vec![slot.clone(), slot],
                }
            })
            .collect();
        return Ok(Intersection::Common(sort_by_popularity(entities)));
    }

    let lookups: Vec<HashMap<T::Key, &T>> = rest
        .iter()
        .map(|source| {
            let mut lookup = HashMap::with_capacity(source.records.len());
            for record in &source.records {
                lookup.entry(record.key()).or_insert(record);
            }
            lookup
        })
        .collect();

    let mut seen = HashSet::new();
    let mut entities = Vec::new();

    'candidates: for candidate in &first.records {
        let key = candidate.key();
        if !seen.insert(key.clone()) {
            continue;
        }

        let mut attributions = Vec::with_capacity(sources.len());
        attributions.push(Attribution {
            source_index: 0,
            source_name: first.name.clone(),
            roles: candidate.role_fields(),
        });

        for (offset, (source, lookup)) in rest.iter().zip(&lookups).enumerate() {
            let Some(found) = lookup.get(&key) else {
                continue 'candidates;
            };
            attributions.push(Attribution {
                source_index: offset + 1,
                source_name: source.name.clone(),
                roles: found.role_fields(),
            });
        }

        entities.push(CommonEntity {
            representative: candidate.clone(),
            attributions,
        });
    }

    debug!(
        sources = sources.len(),
        candidates = first.records.len(),
        common = entities.len(),
        "N-way intersection complete"
    );

    if entities.is_empty() {
        return Ok(Intersection::NoCommon {
            sources: sources.len(),
        });
    }

    Ok(Intersection::Common(sort_by_popularity(entities)))
}

/// Stable sort, so equal popularity keeps first-collection order
fn sort_by_popularity<T: Intersectable>(mut entities: Vec<CommonEntity<T>>) -> Vec<CommonEntity<T>> {
    entities.sort_by(|a, b| {
        b.representative
            .popularity()
            .total_cmp(&a.representative.popularity())
    });
    entities
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RoleKind;
    use std::collections::BTreeSet;

    fn actor(id: u64, character: &str, popularity: f64) -> NormalizedPersonRole {
        NormalizedPersonRole {
            person_id: id,
            name: format!("Person {}", id),
            profile_ref: None,
            popularity: Some(popularity),
            role_kinds: BTreeSet::from([RoleKind::Cast]),
            character: Some(character.to_string()),
            jobs: vec![],
            departments: BTreeSet::new(),
        }
    }

    fn keys(result: &Intersection<NormalizedPersonRole>) -> Vec<u64> {
        match result {
            Intersection::Common(entities) => entities.iter().map(|e| e.representative.person_id).collect(),
            other => panic!("expected common entities, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_sources_rejected() {
        let sources: Vec<SourceCollection<NormalizedPersonRole>> = vec![];
        assert!(matches!(intersect(&sources), Err(EngineError::InvalidInput(_))));
    }

    #[test]
    fn test_single_source_duplicates_attribution() {
        let sources = vec![SourceCollection::new("Heat", vec![actor(1, "McCauley", 3.0), actor(2, "Hanna", 5.0)])];

        let result = intersect(&sources).unwrap();

        assert_eq!(keys(&result), vec![2, 1]);
        let Intersection::Common(entities) = result else { unreachable!() };
        for entity in &entities {
            assert_eq!(entity.attributions.len(), 2);
            assert_eq!(entity.attributions[0], entity.attributions[1]);
            assert_eq!(entity.attributions[0].source_name, "Heat");
        }
    }

    #[test]
    fn test_shared_character_attribution() {
        let sources = vec![
            SourceCollection::new("A", vec![actor(1, "Hero", 1.0)]),
            SourceCollection::new("B", vec![actor(1, "Villain", 1.0)]),
        ];

        let Intersection::Common(entities) = intersect(&sources).unwrap() else {
            panic!("expected common entities");
        };

        assert_eq!(entities.len(), 1);
        let entity = &entities[0];
        assert_eq!(entity.representative.person_id, 1);
        assert_eq!(entity.attribution(0).unwrap().source_name, "A");
        assert_eq!(entity.attribution(0).unwrap().roles.summary(), "Hero");
        assert_eq!(entity.attribution(1).unwrap().source_name, "B");
        assert_eq!(entity.attribution(1).unwrap().roles.summary(), "Villain");
    }

    #[test]
    fn test_full_intersection_not_pairwise() {
        // 2 is in A and B only; 3 is in all three
        let sources = vec![
            SourceCollection::new("A", vec![actor(1, "a", 1.0), actor(2, "a", 2.0), actor(3, "a", 3.0)]),
            SourceCollection::new("B", vec![actor(2, "b", 1.0), actor(3, "b", 1.0)]),
            SourceCollection::new("C", vec![actor(3, "c", 1.0), actor(4, "c", 1.0)]),
        ];

        let result = intersect(&sources).unwrap();

        assert_eq!(keys(&result), vec![3]);
        let Intersection::Common(entities) = result else { unreachable!() };
        let names: Vec<&str> = entities[0]
            .attributions
            .iter()
            .map(|a| a.source_name.as_str())
            .collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_planted_id_round_trip() {
        let make = |planted: bool, offset: u64| {
            let mut records: Vec<NormalizedPersonRole> =
                (0..5).map(|i| actor(100 * offset + i, "x", i as f64)).collect();
            if planted {
                records.insert(2, actor(42, "planted", 1.0));
            }
            records
        };

        let with_all: Vec<_> = (1..=4)
            .map(|n| SourceCollection::new(format!("S{}", n), make(true, n)))
            .collect();
        assert_eq!(keys(&intersect(&with_all).unwrap()), vec![42]);

        let mut missing_one = with_all.clone();
        missing_one[3] = SourceCollection::new("S4", make(false, 4));
        assert!(matches!(
            intersect(&missing_one).unwrap(),
            Intersection::NoCommon { sources: 4 }
        ));
    }

    #[test]
    fn test_popularity_from_first_source_with_stable_ties() {
        let sources = vec![
            SourceCollection::new(
                "A",
                vec![actor(1, "a", 2.0), actor(2, "a", 5.0), actor(3, "a", 2.0)],
            ),
            // B disagrees on popularity; A's copy decides the order
            SourceCollection::new(
                "B",
                vec![actor(3, "b", 100.0), actor(1, "b", 0.0), actor(2, "b", 0.0)],
            ),
        ];

        assert_eq!(keys(&intersect(&sources).unwrap()), vec![2, 1, 3]);
    }

    #[test]
    fn test_empty_source_short_circuits() {
        let sources = vec![
            SourceCollection::new("A", vec![actor(1, "a", 1.0)]),
            SourceCollection::new("B", vec![]),
            SourceCollection::new("C", vec![]),
        ];

        match intersect(&sources).unwrap() {
            Intersection::EmptySource { source_index, source_name } => {
                assert_eq!(source_index, 1);
                assert_eq!(source_name, "B");
            }
            other => panic!("expected empty source, got {:?}", other),
        }
    }

    #[test]
    fn test_single_empty_source() {
        let sources: Vec<SourceCollection<NormalizedPersonRole>> = vec![SourceCollection::new("Solo", vec![])];
        assert!(matches!(
            intersect(&sources).unwrap(),
            Intersection::EmptySource { source_index: 0, .. }
        ));
    }
}
