//! Client side of the directory: selection and filtering, the marker
//! lifecycle on an interactive map, and the static fallback.

use std::time::Duration;

use geo_types::Point;

pub mod controller;
pub mod degradation;
pub mod engine;
pub mod list;
pub mod palette;
pub mod selection;
pub mod suggest;
pub mod view;

pub use controller::{MarkerState, ViewportController};
pub use degradation::{CapabilityProbe, DegradationDetector, StaticMap};
pub use engine::{EngineError, EngineEvent, EngineFailure, MapEngine};
pub use list::DirectoryList;
pub use selection::{SelectionFilterState, SelectionState};
pub use suggest::{CandidateSource, SuggestionSearch, Suggestions};
pub use view::{MapMode, MapView};

#[derive(Debug, Clone, PartialEq)]
pub struct ViewportConfig {
    /// (lng, lat) shown before any place is known.
    pub default_center: Point<f64>,
    pub overview_zoom: f64,
    pub focus_zoom: f64,
    pub fly_duration: Duration,
    pub fit_padding: u32,
    pub fit_duration: Duration,
    pub recenter_duration: Duration,
    pub static_style: String,
    pub static_size: (u32, u32),
    pub suggest_debounce: Duration,
    pub suggest_min_chars: usize,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        ViewportConfig {
            default_center: Point::new(-79.3832, 43.6532),
            overview_zoom: 11.0,
            focus_zoom: 15.0,
            fly_duration: Duration::from_millis(800),
            fit_padding: 80,
            fit_duration: Duration::from_millis(800),
            recenter_duration: Duration::from_millis(700),
            static_style: String::from("mapbox/dark-v11"),
            static_size: (800, 600),
            suggest_debounce: Duration::from_millis(800),
            suggest_min_chars: 3,
        }
    }
}
