use std::mem;

use tracing::{error, warn};
use uuid::Uuid;

use super::{
    controller::ViewportController,
    degradation::{DegradationDetector, Degraded, StaticMap},
    engine::{EngineError, EngineEvent, MapEngine},
    selection::SelectionFilterState,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapMode {
    Interactive,
    StaticFallback,
    Unavailable,
}

enum Surface<E: MapEngine> {
    Interactive(ViewportController<E>),
    Static(StaticMap),
    Unavailable(String),
}

/// The map area of the directory: interactive when it can be, otherwise a
/// static image or an error message.
pub struct MapView<E: MapEngine> {
    detector: DegradationDetector,
    surface: Surface<E>,
}

impl<E: MapEngine> MapView<E> {
    /// Probes the device, then builds the engine. A failed build never leaves an
    /// engine behind.
    pub fn mount<F>(mut detector: DegradationDetector, create: F, view: &SelectionFilterState) -> Self
    where
        F: FnOnce() -> Result<E, EngineError>,
    {
        let surface = if !detector.supports_interactive() {
            Surface::Static(detector.fallback(view.places()))
        } else {
            match create() {
                Ok(engine) => {
                    Surface::Interactive(ViewportController::new(engine, detector.config().clone()))
                }
                Err(err) => degrade(&detector, &err, view),
            }
        };
        MapView { detector, surface }
    }

    fn fail(&mut self, err: EngineError, view: &SelectionFilterState) {
        let degraded = degrade(&self.detector, &err, view);
        if let Surface::Interactive(controller) = mem::replace(&mut self.surface, degraded) {
            controller.dispose();
        }
    }

    /// Applies an engine notification. A marker click answers with the place to select.
    pub fn handle_event(&mut self, event: EngineEvent, view: &SelectionFilterState) -> Option<Uuid> {
        let Surface::Interactive(controller) = &mut self.surface else {
            return None;
        };
        match event {
            EngineEvent::Ready => {
                if let Err(err) = controller.on_ready(view) {
                    self.fail(err, view);
                }
                None
            }
            EngineEvent::Error(err) => {
                self.fail(err, view);
                None
            }
            EngineEvent::MarkerClicked(id) => Some(id),
        }
    }

    pub fn sync(&mut self, view: &SelectionFilterState) {
        match &mut self.surface {
            Surface::Interactive(controller) => {
                if let Err(err) = controller.sync(view) {
                    self.fail(err, view);
                }
            }
            Surface::Static(map) => *map = self.detector.fallback(view.places()),
            Surface::Unavailable(_) => {}
        }
    }

    pub fn recenter(&mut self) {
        if let Surface::Interactive(controller) = &mut self.surface {
            controller.recenter();
        }
    }

    pub fn mode(&self) -> MapMode {
        match self.surface {
            Surface::Interactive(_) => MapMode::Interactive,
            Surface::Static(_) => MapMode::StaticFallback,
            Surface::Unavailable(_) => MapMode::Unavailable,
        }
    }

    pub fn static_map(&self) -> Option<&StaticMap> {
        match &self.surface {
            Surface::Static(map) => Some(map),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.surface {
            Surface::Unavailable(message) => Some(message),
            _ => None,
        }
    }

    pub fn controller(&self) -> Option<&ViewportController<E>> {
        match &self.surface {
            Surface::Interactive(controller) => Some(controller),
            _ => None,
        }
    }

    pub fn dispose(self) {
        if let Surface::Interactive(controller) = self.surface {
            controller.dispose();
        }
    }
}

fn degrade<E: MapEngine>(
    detector: &DegradationDetector,
    err: &EngineError,
    view: &SelectionFilterState,
) -> Surface<E> {
    match detector.classify(err.classify()) {
        Degraded::Static => {
            warn!("map failed, showing static map: {err}");
            Surface::Static(detector.fallback(view.places()))
        }
        Degraded::Unavailable(message) => {
            error!("map unavailable: {err}");
            Surface::Unavailable(message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewport::{
        degradation::{AUTHENTICATION_NOTICE, FALLBACK_NOTICE},
        engine::tests::{Call, RecordingEngine},
        selection::tests::place,
        ViewportConfig,
    };

    fn detector(supported: bool) -> DegradationDetector {
        DegradationDetector::new(move || supported, ViewportConfig::default(), "pk.test")
    }

    fn loaded() -> SelectionFilterState {
        let mut view = SelectionFilterState::new();
        view.replace_places(vec![
            place("Maker Hub", Some("maker"), Some((43.65, -79.38))),
            place("Quiet Desk", Some("cowork"), Some((43.66, -79.39))),
        ]);
        view
    }

    #[test]
    fn failed_probe_renders_static_fallback() {
        let view = SelectionFilterState::new();
        let map = MapView::<RecordingEngine>::mount(
            detector(false),
            || panic!("engine must not be built"),
            &view,
        );
        assert_eq!(map.mode(), MapMode::StaticFallback);
        let fallback = map.static_map().unwrap();
        assert!(fallback.url.contains("/static/-79.3832,43.6532,11/"));
        assert_eq!(fallback.notice, FALLBACK_NOTICE);
    }

    #[test]
    fn engine_construction_errors_are_classified() {
        let view = loaded();
        let map = MapView::<RecordingEngine>::mount(
            detector(true),
            || Err(EngineError::new("Failed to initialize WebGL")),
            &view,
        );
        assert_eq!(map.mode(), MapMode::StaticFallback);

        let map = MapView::<RecordingEngine>::mount(
            detector(true),
            || Err(EngineError::new("401 Unauthorized: invalid token")),
            &view,
        );
        assert_eq!(map.mode(), MapMode::Unavailable);
        assert_eq!(map.error_message(), Some(AUTHENTICATION_NOTICE));
    }

    #[test]
    fn failure_while_drawing_tears_down_markers() {
        let view = loaded();
        let (mut engine, log) = RecordingEngine::new();
        engine.fail_markers_after = Some(1);
        let mut map = MapView::mount(detector(true), || Ok(engine), &view);
        assert_eq!(map.mode(), MapMode::Interactive);

        map.handle_event(EngineEvent::Ready, &view);
        assert_eq!(map.mode(), MapMode::StaticFallback);
        assert!(map.controller().is_none());
        let log = log.borrow();
        assert_eq!(
            log.iter().filter(|call| matches!(call, Call::AddMarker(_))).count(),
            log.iter().filter(|call| matches!(call, Call::RemoveMarker(_))).count()
        );
        assert_eq!(log.last(), Some(&Call::Release));
    }

    #[test]
    fn marker_clicks_select_only_when_interactive() {
        let mut view = loaded();
        let (engine, _log) = RecordingEngine::new();
        let mut map = MapView::mount(detector(true), || Ok(engine), &view);
        map.handle_event(EngineEvent::Ready, &view);
        let hub = view.places()[0].id;

        if let Some(id) = map.handle_event(EngineEvent::MarkerClicked(hub), &view) {
            view.select(id);
        }
        map.sync(&view);
        assert_eq!(map.controller().and_then(|c| c.popup_place()), Some(hub));

        map.handle_event(
            EngineEvent::Error(EngineError::new("Context lost")),
            &view,
        );
        assert_eq!(map.mode(), MapMode::StaticFallback);
        assert_eq!(map.handle_event(EngineEvent::MarkerClicked(hub), &view), None);
    }

    #[test]
    fn dispose_releases_engine() {
        let view = loaded();
        let (engine, log) = RecordingEngine::new();
        let mut map = MapView::mount(detector(true), || Ok(engine), &view);
        map.handle_event(EngineEvent::Ready, &view);
        map.dispose();
        assert_eq!(log.borrow().last(), Some(&Call::Release));
    }
}
