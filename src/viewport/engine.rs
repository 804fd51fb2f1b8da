use std::time::Duration;

use geo_types::{Point, Rect};
use thiserror::Error;
use uuid::Uuid;

/// What a map engine failure means for the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineFailure {
    /// The device can't draw the interactive map.
    Capability,
    /// Credentials were refused, nothing can be drawn.
    Authentication,
    Other,
}

const CAPABILITY_SIGNATURES: [&str; 4] = [
    "WebGL",
    "ALIASED_POINT_SIZE_RANGE",
    "Failed to initialize WebGL",
    "Context lost",
];
const AUTHENTICATION_SIGNATURES: [&str; 4] = ["token", "authentication", "401", "403"];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct EngineError {
    pub message: String,
}

impl EngineError {
    pub fn new(message: impl ToString) -> Self {
        EngineError {
            message: message.to_string(),
        }
    }

    pub fn classify(&self) -> EngineFailure {
        let matches = |signatures: &[&str]| {
            signatures
                .iter()
                .any(|signature| self.message.contains(signature))
        };
        if matches(&CAPABILITY_SIGNATURES) {
            EngineFailure::Capability
        } else if matches(&AUTHENTICATION_SIGNATURES) {
            EngineFailure::Authentication
        } else {
            EngineFailure::Other
        }
    }
}

/// Asynchronous notifications from the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    Ready,
    Error(EngineError),
    MarkerClicked(Uuid),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSpec {
    pub place_id: Uuid,
    pub position: Point<f64>,
    pub color: &'static str,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PopupContent {
    pub title: String,
    pub address: String,
    pub tag: String,
    pub vibes: Option<String>,
    pub website: Option<String>,
    pub hours: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraMove {
    pub center: Point<f64>,
    pub zoom: f64,
    pub duration: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundsFit {
    pub bounds: Rect<f64>,
    pub padding: u32,
    pub duration: Duration,
}

/// The interactive map behind a [`ViewportController`](super::ViewportController).
///
/// Handles are owned by the caller and handed back to be removed, so the
/// engine never has to track which place a marker belongs to.
pub trait MapEngine {
    type Marker;
    type Popup;

    fn add_marker(&mut self, spec: &MarkerSpec) -> Result<Self::Marker, EngineError>;
    fn set_marker_active(&mut self, marker: &mut Self::Marker, active: bool);
    fn remove_marker(&mut self, marker: Self::Marker);
    fn open_popup(
        &mut self,
        anchor: Point<f64>,
        content: &PopupContent,
    ) -> Result<Self::Popup, EngineError>;
    fn close_popup(&mut self, popup: Self::Popup);
    fn fly_to(&mut self, camera: CameraMove);
    fn fit_bounds(&mut self, fit: BoundsFit);
    /// Frees the engine instance. Nothing may be called afterwards.
    fn release(self);
}
