use serde::{de::DeserializeOwned, Deserialize, Deserializer};
use serde_json::Value;

// A field of the wrong shape reads as absent instead of failing the response
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Search v6 forward response. Features are kept loose: Mapbox results may
/// carry their coordinate in any of several places, or leave out `geometry`.
#[derive(Deserialize, Debug, Default)]
pub struct ForwardResponse {
    #[serde(default)]
    pub features: Vec<ForwardFeature>,
}

#[derive(Deserialize, Debug, Default)]
pub struct ForwardFeature {
    #[serde(default)]
    pub geometry: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub center: Option<Vec<Value>>,
    #[serde(default, deserialize_with = "lenient")]
    pub place_name: Option<String>,
    #[serde(default)]
    pub context: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub properties: Option<serde_json::Map<String, Value>>,
}

impl ForwardFeature {
    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.as_ref()?.get(key)
    }
}

/// `properties.coordinates` on a Search v6 feature.
#[derive(Deserialize, Debug, Default)]
pub struct FeatureCoordinates {
    #[serde(default, deserialize_with = "lenient")]
    pub longitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub routable_points: Option<Vec<Value>>,
}

#[derive(Deserialize, Debug, Default)]
pub struct RoutablePoint {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub longitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub latitude: Option<f64>,
}
