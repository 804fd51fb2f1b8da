use async_trait::async_trait;
use geo_types::Point;
use geojson::Geometry;
use tracing::{debug, instrument};

use crate::{
    error::DirectoryError,
    place_geo::locate,
    types::{
        dto::geocode::ResolvedCoordinate,
        mapbox::{FeatureCoordinates, ForwardFeature, ForwardResponse, RoutablePoint},
    },
};

const MAPBOX_FORWARD_URL: &str = "https://api.mapbox.com/search/geocode/v6/forward";

/// Free text to coordinate. `Ok(None)` means the service found nothing.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, query: &str) -> Result<Option<ResolvedCoordinate>, DirectoryError>;
}

pub struct MapboxGeocoder {
    client: reqwest::Client,
    access_token: Option<String>,
    country: String,
}

impl MapboxGeocoder {
    pub fn new(client: reqwest::Client, access_token: Option<String>, country: String) -> Self {
        MapboxGeocoder {
            client,
            access_token,
            country,
        }
    }
}

#[async_trait]
impl Geocoder for MapboxGeocoder {
    #[instrument(skip(self))]
    async fn geocode(&self, query: &str) -> Result<Option<ResolvedCoordinate>, DirectoryError> {
        let token = self.access_token.as_deref().ok_or(DirectoryError::external(
            "mapbox",
            "Mapbox access token is not configured",
        ))?;
        let response = self
            .client
            .get(MAPBOX_FORWARD_URL)
            .query(&[
                ("q", query),
                ("access_token", token),
                ("limit", "1"),
                ("language", "en"),
                ("country", self.country.as_str()),
            ])
            .send()
            .await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DirectoryError::external(
                "mapbox",
                format!("geocoding failed ({status}): {body}"),
            ));
        }
        let body: ForwardResponse = response.json().await?;
        let resolved = resolve_collection(&body);
        debug!("geocoded {query:?} to {resolved:?}");
        Ok(resolved)
    }
}

/// First feature's coordinate, with its display name and context.
pub fn resolve_collection(response: &ForwardResponse) -> Option<ResolvedCoordinate> {
    let feature = response.features.first()?;
    let point = extract_coordinate(feature)?;
    Some(ResolvedCoordinate {
        lat: point.y(),
        lng: point.x(),
        place_name: display_name(feature),
        context: feature
            .property("context")
            .or(feature.context.as_ref())
            .cloned(),
    })
}

/// Tries each place a coordinate can live on a result, in order:
/// geometry, `center`, `properties.coordinates`, then its first routable point.
pub fn extract_coordinate(feature: &ForwardFeature) -> Option<Point<f64>> {
    geometry_point(feature)
        .or_else(|| center_point(feature))
        .or_else(|| property_point(feature))
        .or_else(|| routable_point(feature))
}

fn lng_lat(values: &[f64]) -> Option<Point<f64>> {
    locate(values.get(1).copied(), values.first().copied())
}

fn geometry_point(feature: &ForwardFeature) -> Option<Point<f64>> {
    let geometry: Geometry = serde_json::from_value(feature.geometry.clone()?).ok()?;
    match geometry.value {
        geojson::Value::Point(coordinates) => lng_lat(&coordinates),
        _ => None,
    }
}

fn center_point(feature: &ForwardFeature) -> Option<Point<f64>> {
    let center: Vec<f64> = feature
        .center
        .as_ref()?
        .iter()
        .map(serde_json::Value::as_f64)
        .collect::<Option<_>>()?;
    lng_lat(&center)
}

fn feature_coordinates(feature: &ForwardFeature) -> Option<FeatureCoordinates> {
    serde_json::from_value(feature.property("coordinates")?.clone()).ok()
}

fn property_point(feature: &ForwardFeature) -> Option<Point<f64>> {
    let coordinates = feature_coordinates(feature)?;
    locate(coordinates.latitude, coordinates.longitude)
}

fn routable_point(feature: &ForwardFeature) -> Option<Point<f64>> {
    let coordinates = feature_coordinates(feature)?;
    let first = coordinates.routable_points?.into_iter().next()?;
    let point: RoutablePoint = serde_json::from_value(first).ok()?;
    locate(point.latitude, point.longitude)
}

fn display_name(feature: &ForwardFeature) -> Option<String> {
    feature
        .place_name
        .clone()
        .or_else(|| {
            feature
                .property("full_address")
                .or_else(|| feature.property("name"))
                .and_then(|name| name.as_str())
                .map(String::from)
        })
}
