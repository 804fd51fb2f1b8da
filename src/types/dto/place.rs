use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::DirectoryError,
    hours::{lenient_hours, OpeningHours},
    place_geo::is_valid_coord,
    types::model::place::{PlaceFields, PlaceRecord},
};

/// A place as the directory api serves it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub vibes: Option<String>,
    #[serde(default)]
    pub pricing: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub contact: Option<String>,
    #[serde(default, deserialize_with = "lenient_hours")]
    pub hours: Option<OpeningHours>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default, alias = "long")]
    pub lng: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl Place {
    /// Category used for filtering and marker colour.
    pub fn tag(&self) -> Option<&str> {
        self.industry
            .as_deref()
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
    }
}

impl From<PlaceRecord> for Place {
    fn from(record: PlaceRecord) -> Self {
        let hours = record.opening_hours();
        Place {
            id: record.id,
            name: record.name,
            address: record.address,
            industry: record.industry,
            vibes: record.vibes,
            pricing: record.pricing,
            price: record.price.as_ref().and_then(ToPrimitive::to_f64),
            website: record.website,
            contact: record.contact,
            hours,
            lat: record.lat,
            lng: record.long,
            created_at: record.created_at,
        }
    }
}

/// Body of create and update requests.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(default)]
pub struct PlaceInput {
    pub name: Option<String>,
    pub address: Option<String>,
    pub industry: Option<String>,
    pub vibes: Option<String>,
    pub pricing: Option<String>,
    pub price: Option<f64>,
    pub website: Option<String>,
    pub contact: Option<String>,
    #[serde(deserialize_with = "lenient_hours")]
    pub hours: Option<OpeningHours>,
    pub lat: Option<f64>,
    #[serde(alias = "long")]
    pub lng: Option<f64>,
}

impl PlaceInput {
    /// Omitted fields take the stored value, so a partial body patches the place.
    /// A blank string still clears its field. Price and coordinates are left to the caller.
    pub fn or_stored(self, stored: &PlaceRecord) -> Self {
        PlaceInput {
            name: self.name.or_else(|| Some(stored.name.clone())),
            address: self.address.or_else(|| stored.address.clone()),
            industry: self.industry.or_else(|| stored.industry.clone()),
            vibes: self.vibes.or_else(|| stored.vibes.clone()),
            pricing: self.pricing.or_else(|| stored.pricing.clone()),
            website: self.website.or_else(|| stored.website.clone()),
            contact: self.contact.or_else(|| stored.contact.clone()),
            hours: self.hours.or_else(|| stored.opening_hours()),
            ..self
        }
    }
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

impl TryFrom<PlaceInput> for PlaceFields {
    type Error = DirectoryError;

    fn try_from(input: PlaceInput) -> Result<Self, Self::Error> {
        let name = clean(input.name).ok_or(DirectoryError::validation("name is required"))?;
        let price = match input.price {
            Some(price) => Some(
                BigDecimal::try_from(price)
                    .map_err(|_| DirectoryError::validation("price must be a finite number"))?,
            ),
            None => None,
        };
        // A coordinate is only kept as a complete, finite pair
        let (lat, long) = match (input.lat, input.lng) {
            (Some(lat), Some(lng)) if is_valid_coord(lat) && is_valid_coord(lng) => {
                (Some(lat), Some(lng))
            }
            _ => (None, None),
        };
        let hours = input
            .hours
            .filter(|hours| hours.values().any(|range| range.is_some()));
        Ok(PlaceFields {
            name,
            address: clean(input.address),
            industry: clean(input.industry),
            vibes: clean(input.vibes),
            pricing: clean(input.pricing),
            price,
            website: clean(input.website),
            contact: clean(input.contact),
            hours,
            lat,
            long,
        })
    }
}

/// Body of a manual coordinate override. Kept loose so non-numbers become validation errors.
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct CoordinatesInput {
    pub lat: serde_json::Value,
    #[serde(alias = "long")]
    pub lng: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_requires_trimmed_name() {
        let input = PlaceInput {
            name: Some("   ".into()),
            ..Default::default()
        };
        assert!(matches!(
            PlaceFields::try_from(input),
            Err(DirectoryError::Validation(_))
        ));
    }

    #[test]
    fn input_drops_incomplete_coordinates_and_blank_strings() {
        let input = PlaceInput {
            name: Some(" Maker Hub ".into()),
            address: Some("  ".into()),
            lat: Some(43.65),
            lng: None,
            ..Default::default()
        };
        let fields = PlaceFields::try_from(input).unwrap();
        assert_eq!(fields.name, "Maker Hub");
        assert_eq!(fields.address, None);
        assert_eq!((fields.lat, fields.long), (None, None));
    }

    #[test]
    fn omitted_fields_patch_from_the_stored_row() {
        let stored = PlaceRecord::from_fields(
            Uuid::nil(),
            PlaceFields {
                name: "Gallery".into(),
                address: Some("1 King St W".into()),
                website: Some("https://gallery.example".into()),
                contact: Some("555-0100".into()),
                ..Default::default()
            },
            DateTime::<Utc>::default(),
        );
        let input = PlaceInput {
            name: Some("Gallery 2".into()),
            contact: Some(" ".into()),
            ..Default::default()
        };
        let fields = PlaceFields::try_from(input.or_stored(&stored)).unwrap();
        assert_eq!(fields.name, "Gallery 2");
        assert_eq!(fields.address.as_deref(), Some("1 King St W"));
        assert_eq!(fields.website.as_deref(), Some("https://gallery.example"));
        assert_eq!(fields.contact, None);
    }

    #[test]
    fn odd_hours_do_not_fail_the_place() {
        let place: Place = serde_json::from_value(serde_json::json!({
            "id": Uuid::nil(),
            "name": "Studio",
            "hours": { "Monday": "9:00am-5:00pm", "someday": "never" },
            "createdAt": DateTime::<Utc>::default(),
        }))
        .unwrap();
        let hours = place.hours.expect("monday kept");
        assert_eq!(hours.len(), 1);
        assert_eq!(hours[&crate::hours::Weekday::Monday].as_deref(), Some("9:00am-5:00pm"));

        let input: PlaceInput = serde_json::from_value(serde_json::json!({
            "name": "Studio",
            "hours": "by appointment",
        }))
        .unwrap();
        assert_eq!(input.hours, None);
    }

    #[test]
    fn serializes_wire_shape() {
        let record = PlaceRecord::from_fields(
            Uuid::nil(),
            PlaceFields {
                name: "Studio".into(),
                price: Some(BigDecimal::try_from(12.5).unwrap()),
                lat: Some(43.65),
                long: Some(-79.38),
                ..Default::default()
            },
            DateTime::<Utc>::default(),
        );
        let json = serde_json::to_value(Place::from(record)).unwrap();
        assert_eq!(json["lng"], serde_json::json!(-79.38));
        assert_eq!(json["price"], serde_json::json!(12.5));
        assert!(json.get("createdAt").is_some());
        assert!(json.get("long").is_none());
    }
}
