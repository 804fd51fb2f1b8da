pub mod candidate;
pub mod geocode;
pub mod place;
