use serde::{Deserialize, Serialize};

use crate::hours::WeeklyHours;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// A possible match from the external place directory. Never stored as-is.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlaceCandidate {
    #[serde(rename = "placeId")]
    pub external_id: String,
    pub name: String,
    pub address: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
    #[serde(rename = "location")]
    pub coordinate: Option<LatLng>,
    #[serde(rename = "hours", default, skip_serializing_if = "Option::is_none")]
    pub weekly_hours: Option<WeeklyHours>,
}

#[derive(Deserialize, Debug, Default)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub location: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct SearchResponse {
    pub results: Vec<PlaceCandidate>,
}
