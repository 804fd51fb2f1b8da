pub mod dto;
pub mod google_places;
pub mod mapbox;
pub mod model;
