//! Person-Credit Normalizer
//!
//! Merges a person's movie and TV credits into a single record per title.
//! Undated titles (no release or first-air date) never make it into the output.

use super::credits::non_blank;
use crate::model::{MediaKind, NormalizedTitleRole, RoleKind, TitleKey};
use crate::provider::{RawCreditList, RawPersonCredits};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// Normalize a person's raw movie and TV credits
///
/// Records are keyed by `(title id, media kind)`; the media kind is the list the
/// credit came from. Characters and jobs accumulate as ordered, deduplicated lists.
/// When both role kinds are present the primary role kind is `Cast`.
pub fn normalize_person_credits(credits: &RawPersonCredits) -> Vec<NormalizedTitleRole> {
    let mut builder = TitleRoleBuilder::default();

    builder.absorb(MediaKind::Movie, &credits.movie);
    builder.absorb(MediaKind::Series, &credits.tv);

    let titles = builder.finish();

    debug!(
        movie_credits = credits.movie.cast.len() + credits.movie.crew.len(),
        tv_credits = credits.tv.cast.len() + credits.tv.crew.len(),
        titles = titles.len(),
        skipped_undated = count_undated(credits),
        "Normalized person credits"
    );

    titles
}

#[derive(Default)]
struct TitleRoleBuilder {
    index: HashMap<TitleKey, usize>,
    titles: Vec<NormalizedTitleRole>,
}

impl TitleRoleBuilder {
    fn absorb(&mut self, media_kind: MediaKind, list: &RawCreditList) {
        for credit in &list.cast {
            let Some(release_date) = non_blank(credit.release_date.as_deref()) else {
                continue;
            };
            let title = self.entry(
                TitleKey { id: credit.id, media_kind },
                credit.title.as_deref(),
                release_date,
                credit.popularity,
                &credit.poster_path,
            );
            title.role_kinds.insert(RoleKind::Cast);
            if let Some(character) = non_blank(credit.character.as_deref()) {
                push_unique(&mut title.characters, character);
            }
        }

        for credit in &list.crew {
            let Some(release_date) = non_blank(credit.release_date.as_deref()) else {
                continue;
            };
            let title = self.entry(
                TitleKey { id: credit.id, media_kind },
                credit.title.as_deref(),
                release_date,
                credit.popularity,
                &credit.poster_path,
            );
            title.role_kinds.insert(RoleKind::Crew);
            if let Some(job) = non_blank(credit.job.as_deref()) {
                push_unique(&mut title.jobs, job);
            }
            if let Some(department) = non_blank(credit.department.as_deref()) {
                title.departments.insert(department.to_string());
            }
        }
    }

    fn entry(
        &mut self,
        key: TitleKey,
        display_name: Option<&str>,
        release_date: &str,
        popularity: Option<f64>,
        poster: &Option<String>,
    ) -> &mut NormalizedTitleRole {
        let titles = &mut self.titles;
        let slot = *self.index.entry(key).or_insert_with(|| {
            titles.push(NormalizedTitleRole {
                title_id: key.id,
                media_kind: key.media_kind,
                display_name: non_blank(display_name).unwrap_or("Untitled").to_string(),
                release_date: Some(release_date.to_string()),
                popularity: popularity.unwrap_or(0.0),
                poster_ref: poster.clone(),
                role_kinds: BTreeSet::new(),
                characters: Vec::new(),
                jobs: Vec::new(),
                departments: BTreeSet::new(),
                primary_role_kind: RoleKind::Cast,
            });
            titles.len() - 1
        });
        &mut self.titles[slot]
    }

    fn finish(self) -> Vec<NormalizedTitleRole> {
        let mut titles = self.titles;
        for title in &mut titles {
            title.primary_role_kind = if title.role_kinds.contains(&RoleKind::Cast) {
                RoleKind::Cast
            } else {
                RoleKind::Crew
            };
        }
        titles.sort_by(|a, b| b.popularity.total_cmp(&a.popularity));
        titles
    }
}

fn push_unique(list: &mut Vec<String>, value: &str) {
    if !list.iter().any(|existing| existing == value) {
        list.push(value.to_string());
    }
}

fn count_undated(credits: &RawPersonCredits) -> usize {
    let undated = |date: &Option<String>| non_blank(date.as_deref()).is_none();
    [&credits.movie, &credits.tv]
        .iter()
        .map(|list| {
            list.cast.iter().filter(|c| undated(&c.release_date)).count()
                + list.crew.iter().filter(|c| undated(&c.release_date)).count()
        })
        .sum()
}
