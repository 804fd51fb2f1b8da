use std::fmt::Display;

use tracing::error;

use super::selection::SelectionFilterState;
use crate::types::dto::place::Place;

/// What the directory panel shows while places load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DirectoryList {
    #[default]
    Loading,
    Failed(String),
    Empty,
    Ready,
}

impl DirectoryList {
    /// Settles a finished load. On success the places replace whatever the view held,
    /// including ones still waiting for a coordinate.
    pub fn settle<E: Display>(
        result: Result<Vec<Place>, E>,
        view: &mut SelectionFilterState,
    ) -> Self {
        match result {
            Ok(places) => {
                let empty = places.is_empty();
                view.replace_places(places);
                if empty {
                    DirectoryList::Empty
                } else {
                    DirectoryList::Ready
                }
            }
            Err(err) => {
                error!("Error loading spaces: {err}");
                DirectoryList::Failed(err.to_string())
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, DirectoryList::Loading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewport::selection::tests::place;

    #[test]
    fn settles_into_distinct_states() {
        let mut view = SelectionFilterState::new();
        assert!(DirectoryList::default().is_loading());

        let failed = DirectoryList::settle(Err("Request failed with status 500"), &mut view);
        assert_eq!(failed, DirectoryList::Failed("Request failed with status 500".into()));
        assert_eq!(view.generation(), 0);

        let empty = DirectoryList::settle(Ok::<_, String>(vec![]), &mut view);
        assert_eq!(empty, DirectoryList::Empty);

        let ready = DirectoryList::settle(
            Ok::<_, String>(vec![place("Unresolved", None, None)]),
            &mut view,
        );
        assert_eq!(ready, DirectoryList::Ready);
        assert_eq!(view.places().len(), 1);
    }
}
