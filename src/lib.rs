pub mod api;
pub mod client;
pub mod clients;
pub mod config;
pub mod error;
pub mod geocode;
pub mod hours;
pub mod net;
pub mod place_geo;
pub mod place_store;
pub mod places_search;
pub mod repository;
pub mod types;
pub mod viewport;
