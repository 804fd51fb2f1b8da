use std::collections::BTreeSet;

use tracing::debug;
use uuid::Uuid;

use crate::types::dto::place::Place;

/// What the user has picked and typed. Reset on every full reload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    pub selected: Option<Uuid>,
    pub filter_text: String,
    pub filter_tag: Option<String>,
}

/// Places whose name contains `text` (ignoring case) and whose tag is `tag`, when one is set.
pub fn filter_places<'a>(places: &'a [Place], text: &str, tag: Option<&str>) -> Vec<&'a Place> {
    let needle = text.to_lowercase();
    let tag = tag.filter(|tag| !tag.is_empty());
    places
        .iter()
        .filter(|place| place.name.to_lowercase().contains(&needle))
        .filter(|place| tag.map_or(true, |tag| place.tag() == Some(tag)))
        .collect()
}

/// Owner of the loaded place list and of the selection and filter over it.
#[derive(Debug, Default)]
pub struct SelectionFilterState {
    places: Vec<Place>,
    state: SelectionState,
    generation: u64,
}

impl SelectionFilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swaps in a freshly loaded list. Selection and filter start over.
    pub fn replace_places(&mut self, places: Vec<Place>) {
        self.places = places;
        self.state = SelectionState::default();
        self.generation += 1;
        debug!(
            "loaded {} places, generation {}",
            self.places.len(),
            self.generation
        );
    }

    pub fn places(&self) -> &[Place] {
        &self.places
    }

    pub fn selection(&self) -> &SelectionState {
        &self.state
    }

    /// Bumped once per full reload.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Never touches the selection, even when the selected place stops matching.
    pub fn set_filter(&mut self, text: impl Into<String>, tag: Option<String>) {
        self.state.filter_text = text.into();
        self.state.filter_tag = tag.filter(|tag| !tag.is_empty());
    }

    pub fn filtered(&self) -> Vec<&Place> {
        filter_places(
            &self.places,
            &self.state.filter_text,
            self.state.filter_tag.as_deref(),
        )
    }

    /// Selects a place from the full list, filtered out or not. Unknown ids are ignored.
    pub fn select(&mut self, id: Uuid) -> bool {
        if self.places.iter().any(|place| place.id == id) {
            self.state.selected = Some(id);
            true
        } else {
            false
        }
    }

    pub fn clear_selection(&mut self) {
        self.state.selected = None;
    }

    pub fn selected_place(&self) -> Option<&Place> {
        let id = self.state.selected?;
        self.places.iter().find(|place| place.id == id)
    }

    /// Distinct tags for the filter buttons, sorted.
    pub fn unique_tags(&self) -> Vec<&str> {
        self.places
            .iter()
            .filter_map(Place::tag)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use chrono::Utc;

    use super::*;

    pub(crate) fn place(name: &str, industry: Option<&str>, coords: Option<(f64, f64)>) -> Place {
        Place {
            id: Uuid::new_v4(),
            name: name.to_string(),
            address: None,
            industry: industry.map(str::to_string),
            vibes: None,
            pricing: None,
            price: None,
            website: None,
            contact: None,
            hours: None,
            lat: coords.map(|(lat, _)| lat),
            lng: coords.map(|(_, lng)| lng),
            created_at: Utc::now(),
        }
    }

    fn directory() -> SelectionFilterState {
        let mut state = SelectionFilterState::new();
        state.replace_places(vec![
            place("Maker Hub", Some("maker"), Some((43.65, -79.38))),
            place("Makers Guild", Some("studio"), None),
            place("Quiet Desk", Some("cowork"), Some((43.66, -79.39))),
            place("Open Gallery", None, Some((43.67, -79.4))),
        ]);
        state
    }

    fn names<'a>(places: &[&'a Place]) -> Vec<&'a str> {
        places.iter().map(|place| place.name.as_str()).collect()
    }

    #[test]
    fn filters_by_name_and_tag() {
        let mut state = directory();
        assert_eq!(state.filtered().len(), 4);

        state.set_filter("MAKE", None);
        assert_eq!(names(&state.filtered()), ["Maker Hub", "Makers Guild"]);

        state.set_filter("make", Some("studio".into()));
        assert_eq!(names(&state.filtered()), ["Makers Guild"]);

        state.set_filter("", Some(String::new()));
        assert_eq!(state.filtered().len(), 4);
        assert_eq!(state.selection().filter_tag, None);

        state.set_filter("", Some("Maker".into()));
        assert!(state.filtered().is_empty());
    }

    #[test]
    fn filtered_set_matches_every_text_and_tag() {
        let state = directory();
        for text in ["", "a", "MAKER", "desk", "zzz", " "] {
            for tag in [None, Some("maker"), Some("cowork"), Some("")] {
                let expected: Vec<&str> = state
                    .places()
                    .iter()
                    .filter(|place| place.name.to_lowercase().contains(&text.to_lowercase()))
                    .filter(|place| tag.map_or(true, |tag| tag.is_empty() || place.tag() == Some(tag)))
                    .map(|place| place.name.as_str())
                    .collect();
                assert_eq!(names(&filter_places(state.places(), text, tag)), expected);
            }
        }
    }

    #[test]
    fn selection_survives_filtering() {
        let mut state = directory();
        let guild = state.places()[1].id;
        assert!(state.select(guild));

        state.set_filter("quiet", None);
        assert!(state.filtered().iter().all(|place| place.id != guild));
        assert_eq!(state.selection().selected, Some(guild));

        state.set_filter("", None);
        assert_eq!(state.selected_place().map(|place| place.name.as_str()), Some("Makers Guild"));
    }

    #[test]
    fn select_requires_known_id() {
        let mut state = directory();
        let desk = state.places()[2].id;
        state.set_filter("maker", None);
        assert!(state.select(desk));
        assert!(!state.select(Uuid::new_v4()));
        assert_eq!(state.selection().selected, Some(desk));
        state.clear_selection();
        assert_eq!(state.selection().selected, None);
    }

    #[test]
    fn reload_resets_selection() {
        let mut state = directory();
        let hub = state.places()[0].id;
        state.select(hub);
        state.set_filter("hub", Some("maker".into()));
        let generation = state.generation();

        state.replace_places(vec![place("Fresh", None, None)]);
        assert_eq!(state.selection(), &SelectionState::default());
        assert_eq!(state.generation(), generation + 1);
    }

    #[test]
    fn tags_are_unique_and_sorted() {
        let mut state = directory();
        let mut places = state.places().to_vec();
        places.push(place("Second Maker", Some("maker"), None));
        state.replace_places(places);
        assert_eq!(state.unique_tags(), ["cowork", "maker", "studio"]);
    }
}
