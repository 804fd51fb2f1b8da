use reqwest::Url;
use tracing::{info, warn};

use super::{engine::EngineFailure, palette::marker_color, ViewportConfig};
use crate::{
    place_geo::{center, overview_zoom, BoundingBox, Locate},
    types::dto::place::Place,
};

const STATIC_STYLES_URL: &str = "https://api.mapbox.com/styles/v1";
pub const FALLBACK_NOTICE: &str =
    "Interactive map unavailable on this device. Showing a static map, selecting places on it is disabled.";
pub const AUTHENTICATION_NOTICE: &str = "Map authentication error. Please check your Mapbox token.";

/// Whether the device can run the interactive map at all.
pub trait CapabilityProbe {
    fn supports_interactive_map(&self) -> bool;
}

impl<F: Fn() -> bool> CapabilityProbe for F {
    fn supports_interactive_map(&self) -> bool {
        self()
    }
}

/// A pre-rendered map image with an explanation for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticMap {
    pub url: String,
    pub notice: &'static str,
}

/// What to show when the interactive map failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Degraded {
    Static,
    Unavailable(String),
}

pub struct DegradationDetector {
    probe: Box<dyn CapabilityProbe>,
    verdict: Option<bool>,
    config: ViewportConfig,
    access_token: String,
}

impl DegradationDetector {
    pub fn new(
        probe: impl CapabilityProbe + 'static,
        config: ViewportConfig,
        access_token: impl Into<String>,
    ) -> Self {
        DegradationDetector {
            probe: Box::new(probe),
            verdict: None,
            config,
            access_token: access_token.into(),
        }
    }

    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    /// Probes once, later calls reuse the answer.
    pub fn supports_interactive(&mut self) -> bool {
        *self.verdict.get_or_insert_with(|| {
            let supported = self.probe.supports_interactive_map();
            if !supported {
                info!("interactive map not supported, using static fallback");
            }
            supported
        })
    }

    pub fn classify(&self, failure: EngineFailure) -> Degraded {
        match failure {
            EngineFailure::Authentication => Degraded::Unavailable(AUTHENTICATION_NOTICE.to_string()),
            EngineFailure::Capability => Degraded::Static,
            EngineFailure::Other => {
                warn!("map error, falling back to static map");
                Degraded::Static
            }
        }
    }

    /// Static image framing every locatable place, with one coloured pin each.
    pub fn fallback(&self, places: &[Place]) -> StaticMap {
        let (position, zoom) = match places.bounding_box() {
            Some(bounds) => (center(&bounds), overview_zoom(&bounds, self.config.overview_zoom)),
            None => (self.config.default_center, self.config.overview_zoom),
        };
        let pins: Vec<String> = places
            .iter()
            .filter_map(|place| {
                let location = place.location()?;
                Some(format!(
                    "pin-s+{}({},{})",
                    marker_color(place).trim_start_matches('#'),
                    location.x(),
                    location.y()
                ))
            })
            .collect();
        let overlay = if pins.is_empty() {
            String::new()
        } else {
            format!("{}/", pins.join(","))
        };
        let (width, height) = self.config.static_size;
        let path = format!(
            "{STATIC_STYLES_URL}/{}/static/{overlay}{},{},{zoom}/{width}x{height}@2x",
            self.config.static_style,
            position.x(),
            position.y(),
        );
        let url = match Url::parse_with_params(&path, [("access_token", &self.access_token)]) {
            Ok(url) => url.to_string(),
            Err(err) => {
                warn!("could not build static map url: {err}");
                format!("{path}?access_token={}", self.access_token)
            }
        };
        StaticMap {
            url,
            notice: FALLBACK_NOTICE,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, rc::Rc};

    use super::*;
    use crate::viewport::selection::tests::place;

    fn detector() -> DegradationDetector {
        DegradationDetector::new(|| false, ViewportConfig::default(), "pk.test")
    }

    #[test]
    fn empty_fallback_uses_default_view() {
        let map = detector().fallback(&[]);
        assert_eq!(
            map.url,
            "https://api.mapbox.com/styles/v1/mapbox/dark-v11/static/-79.3832,43.6532,11/800x600@2x?access_token=pk.test"
        );
        assert_eq!(map.notice, FALLBACK_NOTICE);

        let unresolved = [place("Somewhere", None, None)];
        assert_eq!(detector().fallback(&unresolved).url, map.url);
    }

    #[test]
    fn fallback_pins_every_locatable_place() {
        let places = [
            place("Maker Hub", Some("maker"), Some((43.65, -79.38))),
            place("Gallery", Some("gallery"), Some((43.66, -79.38))),
            place("Nowhere", Some("studio"), None),
        ];
        let url = detector().fallback(&places).url;
        assert!(url.contains("/static/pin-s+34d399(-79.38,43.65),pin-s+f472b6(-79.38,43.66)/"));
        // 0.01 degrees of spread is a close-up
        assert!(url.contains(",13/800x600@2x"));
        assert!(!url.contains("facc15"));
    }

    #[test]
    fn probe_runs_once() {
        let calls = Rc::new(Cell::new(0));
        let counted = calls.clone();
        let mut detector = DegradationDetector::new(
            move || {
                counted.set(counted.get() + 1);
                true
            },
            ViewportConfig::default(),
            "pk.test",
        );
        assert!(detector.supports_interactive());
        assert!(detector.supports_interactive());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn authentication_failures_are_unavailable() {
        let detector = detector();
        assert_eq!(
            detector.classify(EngineFailure::Authentication),
            Degraded::Unavailable(AUTHENTICATION_NOTICE.to_string())
        );
        assert_eq!(detector.classify(EngineFailure::Capability), Degraded::Static);
        assert_eq!(detector.classify(EngineFailure::Other), Degraded::Static);
    }
}
