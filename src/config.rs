use std::env;

use color_eyre::eyre::{Result, WrapErr};
use tracing::warn;

pub const DEFAULT_PORT: u16 = 5174;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub mapbox_token: Option<String>,
    pub google_places_key: Option<String>,
    pub geocode_country: String,
    pub default_search_location: String,
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let port = match non_empty("PORT") {
            Some(port) => port.parse().wrap_err("PORT must be a port number")?,
            None => DEFAULT_PORT,
        };
        let db_max_connections = match non_empty("DB_MAX_CONNECTIONS") {
            Some(max) => max.parse().wrap_err("DB_MAX_CONNECTIONS must be a number")?,
            None => 5,
        };
        let mapbox_token = non_empty("MAPBOX_ACCESS_TOKEN").or_else(|| non_empty("VITE_MAPBOX_TOKEN"));
        if mapbox_token.is_none() {
            warn!("Mapbox token missing. Set MAPBOX_ACCESS_TOKEN (preferred) or VITE_MAPBOX_TOKEN.");
        }
        let google_places_key = non_empty("GOOGLE_PLACES_API_KEY");
        if google_places_key.is_none() {
            warn!("Google Places API key is missing. Set GOOGLE_PLACES_API_KEY.");
        }
        Ok(Config {
            port,
            database_url: non_empty("DATABASE_URL"),
            db_max_connections,
            mapbox_token,
            google_places_key,
            geocode_country: non_empty("GEOCODE_COUNTRY").unwrap_or_else(|| String::from("CA")),
            default_search_location: non_empty("PLACES_DEFAULT_LOCATION")
                .unwrap_or_else(|| String::from("Toronto, ON, Canada")),
        })
    }
}
