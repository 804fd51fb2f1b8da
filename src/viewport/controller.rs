use std::collections::HashMap;

use geo_types::Point;
use tracing::{debug, instrument};
use uuid::Uuid;

use super::{
    engine::{BoundsFit, CameraMove, EngineError, MapEngine, MarkerSpec, PopupContent},
    palette::marker_color,
    selection::SelectionFilterState,
    ViewportConfig,
};
use crate::{
    hours::summarize,
    place_geo::{BoundingBox, Locate},
    types::dto::place::Place,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerState {
    Rendered,
    Active,
}

struct MarkerSlot<M> {
    handle: M,
    state: MarkerState,
    position: Point<f64>,
}

fn popup_content(place: &Place) -> PopupContent {
    PopupContent {
        title: place.name.clone(),
        address: place
            .address
            .clone()
            .unwrap_or_else(|| String::from("No address provided")),
        tag: place.tag().unwrap_or("Space").to_string(),
        vibes: place.vibes.clone(),
        website: place.website.clone(),
        hours: place
            .hours
            .as_ref()
            .map_or_else(|| String::from("Hours not specified"), summarize),
    }
}

/// Keeps an engine's markers, popup and camera in line with a [`SelectionFilterState`].
///
/// Nothing is drawn until the engine reports ready. After that each
/// [`sync`](Self::sync) applies only the difference from the previous one.
pub struct ViewportController<E: MapEngine> {
    engine: E,
    config: ViewportConfig,
    ready: bool,
    markers: HashMap<Uuid, MarkerSlot<E::Marker>>,
    popup: Option<(Uuid, E::Popup)>,
    focused: Option<(Uuid, Option<Point<f64>>)>,
    fitted_generation: Option<u64>,
}

impl<E: MapEngine> ViewportController<E> {
    pub fn new(engine: E, config: ViewportConfig) -> Self {
        ViewportController {
            engine,
            config,
            ready: false,
            markers: HashMap::new(),
            popup: None,
            focused: None,
            fitted_generation: None,
        }
    }

    /// The engine finished loading. Everything known so far is drawn now.
    pub fn on_ready(&mut self, view: &SelectionFilterState) -> Result<(), EngineError> {
        self.ready = true;
        self.sync(view)
    }

    #[instrument(skip_all, fields(generation = view.generation()))]
    pub fn sync(&mut self, view: &SelectionFilterState) -> Result<(), EngineError> {
        if !self.ready {
            return Ok(());
        }
        self.sync_markers(view)?;
        self.sync_focus(view)?;
        self.fit_loaded_places(view);
        Ok(())
    }

    fn sync_markers(&mut self, view: &SelectionFilterState) -> Result<(), EngineError> {
        let visible: HashMap<Uuid, (&Place, Point<f64>)> = view
            .filtered()
            .into_iter()
            .filter_map(|place| Some((place.id, (place, place.location()?))))
            .collect();

        let stale: Vec<Uuid> = self
            .markers
            .iter()
            .filter(|(id, slot)| {
                visible
                    .get(*id)
                    .map_or(true, |(_, position)| *position != slot.position)
            })
            .map(|(id, _)| *id)
            .collect();
        for id in stale {
            if let Some(slot) = self.markers.remove(&id) {
                self.engine.remove_marker(slot.handle);
            }
        }

        for (id, (place, position)) in &visible {
            if self.markers.contains_key(id) {
                continue;
            }
            let handle = self.engine.add_marker(&MarkerSpec {
                place_id: *id,
                position: *position,
                color: marker_color(place),
                title: place.name.clone(),
            })?;
            self.markers.insert(
                *id,
                MarkerSlot {
                    handle,
                    state: MarkerState::Rendered,
                    position: *position,
                },
            );
        }

        let selected = view.selection().selected;
        for (id, slot) in self.markers.iter_mut() {
            let wanted = if selected == Some(*id) {
                MarkerState::Active
            } else {
                MarkerState::Rendered
            };
            if slot.state != wanted {
                self.engine
                    .set_marker_active(&mut slot.handle, wanted == MarkerState::Active);
                slot.state = wanted;
            }
        }
        Ok(())
    }

    // The popup follows the selection, even for a place the filter hides
    fn sync_focus(&mut self, view: &SelectionFilterState) -> Result<(), EngineError> {
        // a selected place that moved reopens its popup at the new position
        let focus = view
            .selected_place()
            .map(|place| (place.id, place.location()));
        if focus == self.focused {
            return Ok(());
        }
        self.focused = focus;
        if let Some((_, popup)) = self.popup.take() {
            self.engine.close_popup(popup);
        }
        let Some(place) = view.selected_place() else {
            return Ok(());
        };
        let Some(position) = place.location() else {
            debug!("selected place {} has no coordinate", place.id);
            return Ok(());
        };
        let popup = self.engine.open_popup(position, &popup_content(place))?;
        self.popup = Some((place.id, popup));
        self.engine.fly_to(CameraMove {
            center: position,
            zoom: self.config.focus_zoom,
            duration: self.config.fly_duration,
        });
        Ok(())
    }

    // Once per load, never again on selection changes
    fn fit_loaded_places(&mut self, view: &SelectionFilterState) {
        if view.places().is_empty() || self.fitted_generation == Some(view.generation()) {
            return;
        }
        self.fitted_generation = Some(view.generation());
        if let Some(bounds) = view.places().bounding_box() {
            self.engine.fit_bounds(BoundsFit {
                bounds,
                padding: self.config.fit_padding,
                duration: self.config.fit_duration,
            });
        }
    }

    /// Frames every live marker, or goes back to the default view when there are none.
    pub fn recenter(&mut self) {
        let positions: Vec<Point<f64>> = self.markers.values().map(|slot| slot.position).collect();
        match positions.bounding_box() {
            Some(bounds) => self.engine.fit_bounds(BoundsFit {
                bounds,
                padding: self.config.fit_padding,
                duration: self.config.recenter_duration,
            }),
            None => self.engine.fly_to(CameraMove {
                center: self.config.default_center,
                zoom: self.config.overview_zoom,
                duration: self.config.recenter_duration,
            }),
        }
    }

    /// Removes every marker and the popup, then releases the engine.
    pub fn dispose(mut self) {
        if let Some((_, popup)) = self.popup.take() {
            self.engine.close_popup(popup);
        }
        for (_, slot) in self.markers.drain() {
            self.engine.remove_marker(slot.handle);
        }
        self.engine.release();
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    pub fn marker_state(&self, id: Uuid) -> Option<MarkerState> {
        self.markers.get(&id).map(|slot| slot.state)
    }

    pub fn active_marker_count(&self) -> usize {
        self.markers
            .values()
            .filter(|slot| slot.state == MarkerState::Active)
            .count()
    }

    pub fn popup_place(&self) -> Option<Uuid> {
        self.popup.as_ref().map(|(id, _)| *id)
    }
}
