use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::types::Json;
use uuid::Uuid;

use crate::hours::{read_hours, OpeningHours};

//Whats actually stored in the spaces table
#[derive(sqlx::FromRow, Debug, Clone, PartialEq)]
pub struct PlaceRecord {
    pub id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub industry: Option<String>,
    pub vibes: Option<String>,
    pub pricing: Option<String>,
    pub price: Option<BigDecimal>,
    pub website: Option<String>,
    pub contact: Option<String>,
    // Read through `opening_hours`, older rows hold free text or odd keys
    pub hours: Option<Json<Value>>,
    pub lat: Option<f64>,
    pub long: Option<f64>,
    pub created_at: DateTime<Utc>,
}

//Everything an operator can write, used for inserts and updates
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaceFields {
    pub name: String,
    pub address: Option<String>,
    pub industry: Option<String>,
    pub vibes: Option<String>,
    pub pricing: Option<String>,
    pub price: Option<BigDecimal>,
    pub website: Option<String>,
    pub contact: Option<String>,
    pub hours: Option<OpeningHours>,
    pub lat: Option<f64>,
    pub long: Option<f64>,
}

impl PlaceRecord {
    pub fn from_fields(id: Uuid, fields: PlaceFields, created_at: DateTime<Utc>) -> Self {
        PlaceRecord {
            id,
            name: fields.name,
            address: fields.address,
            industry: fields.industry,
            vibes: fields.vibes,
            pricing: fields.pricing,
            price: fields.price,
            website: fields.website,
            contact: fields.contact,
            hours: fields
                .hours
                .and_then(|hours| serde_json::to_value(hours).ok())
                .map(Json),
            lat: fields.lat,
            long: fields.long,
            created_at,
        }
    }

    pub fn opening_hours(&self) -> Option<OpeningHours> {
        self.hours.as_ref().and_then(|Json(hours)| read_hours(hours))
    }

    /// Address worth sending to the geocoder, if any.
    pub fn lookup_address(&self) -> Option<&str> {
        self.address
            .as_deref()
            .map(str::trim)
            .filter(|address| !address.is_empty())
    }
}
