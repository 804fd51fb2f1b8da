use serde::{Deserialize, Serialize};

#[derive(Deserialize, Debug, Default)]
pub struct GeocodeQuery {
    pub q: Option<String>,
}

/// A geocoded coordinate with whatever descriptive context the geocoder returned.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ResolvedCoordinate {
    pub lat: f64,
    pub lng: f64,
    pub place_name: Option<String>,
    pub context: Option<serde_json::Value>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct GeocodeResponse {
    pub query: String,
    #[serde(flatten)]
    pub coordinate: ResolvedCoordinate,
}
