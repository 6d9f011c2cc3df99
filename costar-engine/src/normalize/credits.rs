//! Credit Normalizer
//!
//! Merges one title's cast and crew into a single record per person. A person who
//! both acts and works behind the camera gets one record carrying both role kinds.

use crate::model::{NormalizedPersonRole, RoleKind, OTHER_DEPARTMENT, UNKNOWN_JOB, UNKNOWN_ROLE};
use crate::provider::RawTitleCredits;
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// Normalize a title's raw cast and crew lists
///
/// **Algorithm:**
/// 1. Index records by person id, in first-appearance order (cast before crew)
/// 2. Cast credits add `Cast` and set the character (first credit wins)
/// 3. Crew credits add `Crew`, append the job if new, add the department
/// 4. Stable sort by descending popularity (missing popularity counts as 0)
///
/// Empty input yields an empty list; reporting "no cast or crew" is up to the caller.
pub fn normalize_title_credits(credits: &RawTitleCredits) -> Vec<NormalizedPersonRole> {
    let mut index: HashMap<u64, usize> = HashMap::new();
    let mut people: Vec<NormalizedPersonRole> = Vec::new();

    for cast in &credits.cast {
        let slot = *index.entry(cast.id).or_insert_with(|| {
            people.push(seed(cast.id, &cast.name, &cast.profile_path, cast.popularity));
            people.len() - 1
        });
        let person = &mut people[slot];
        person.role_kinds.insert(RoleKind::Cast);
        if person.character.is_none() {
            person.character = Some(
                non_blank(cast.character.as_deref())
                    .unwrap_or(UNKNOWN_ROLE)
                    .to_string(),
            );
        }
    }

    for crew in &credits.crew {
        let slot = *index.entry(crew.id).or_insert_with(|| {
            people.push(seed(crew.id, &crew.name, &crew.profile_path, crew.popularity));
            people.len() - 1
        });
        let person = &mut people[slot];
        person.role_kinds.insert(RoleKind::Crew);

        let job = non_blank(crew.job.as_deref()).unwrap_or(UNKNOWN_JOB);
        if !person.jobs.iter().any(|existing| existing == job) {
            person.jobs.push(job.to_string());
        }
        person.departments.insert(
            non_blank(crew.department.as_deref())
                .unwrap_or(OTHER_DEPARTMENT)
                .to_string(),
        );
    }

    people.sort_by(|a, b| {
        b.popularity
            .unwrap_or(0.0)
            .total_cmp(&a.popularity.unwrap_or(0.0))
    });

    debug!(
        cast = credits.cast.len(),
        crew = credits.crew.len(),
        people = people.len(),
        "Normalized title credits"
    );

    people
}

fn seed(id: u64, name: &str, profile: &Option<String>, popularity: Option<f64>) -> NormalizedPersonRole {
    NormalizedPersonRole {
        person_id: id,
        name: name.to_string(),
        profile_ref: profile.clone(),
        popularity,
        role_kinds: BTreeSet::new(),
        character: None,
        jobs: Vec::new(),
        departments: BTreeSet::new(),
    }
}

pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
