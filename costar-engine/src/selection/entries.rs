//! Selectable entries and their storage layout
//!
//! | Kind   | Current key       | Legacy slots                               |
//! |--------|-------------------|--------------------------------------------|
//! | Titles | `selected_titles` | `selected_title_1`, `selected_title_2`     |
//! | People | `selected_people` | `selected_person_1`, `selected_person_2`   |

use super::SelectionEntry;
use crate::model::{NormalizedPerson, NormalizedTitle, TitleKey};
use costar_common::events::SelectionKind;

impl SelectionEntry for NormalizedTitle {
    type Key = TitleKey;

    const KIND: SelectionKind = SelectionKind::Titles;
    const CURRENT_KEY: &'static str = "selected_titles";
    const LEGACY_KEYS: [&'static str; 2] = ["selected_title_1", "selected_title_2"];

    fn key(&self) -> TitleKey {
        NormalizedTitle::key(self)
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Inception and The Dark Knight
    fn default_entries() -> Vec<Self> {
        vec![
            NormalizedTitle::new(TitleKey::movie(27205), "Inception").with_release_year(2010),
            NormalizedTitle::new(TitleKey::movie(155), "The Dark Knight").with_release_year(2008),
        ]
    }
}

impl SelectionEntry for NormalizedPerson {
    type Key = u64;

    const KIND: SelectionKind = SelectionKind::People;
    const CURRENT_KEY: &'static str = "selected_people";
    const LEGACY_KEYS: [&'static str; 2] = ["selected_person_1", "selected_person_2"];

    fn key(&self) -> u64 {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    /// Christopher Nolan and Michael Caine
    fn default_entries() -> Vec<Self> {
        vec![
            NormalizedPerson::new(525, "Christopher Nolan"),
            NormalizedPerson::new(3895, "Michael Caine"),
        ]
    }
}
