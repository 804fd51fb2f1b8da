use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::{
    error::DirectoryError,
    geocode::Geocoder,
    place_geo::{is_valid_coord, locate, Locate},
    repository::PlaceRepository,
    types::{
        dto::{
            geocode::ResolvedCoordinate,
            place::{Place, PlaceInput},
        },
        model::place::{PlaceFields, PlaceRecord},
    },
};

const RESOLVE_CONCURRENCY: usize = 10;

/// Places with their coordinates kept resolved.
///
/// Every read and write path goes through [`PlaceStore::ensure_coordinates`] or
/// [`PlaceStore::resolve_fields`], which both defer to a single lookup. An existing
/// finite coordinate is never replaced by a lookup; only [`PlaceStore::update_coordinate`]
/// overwrites one.
pub struct PlaceStore {
    repository: Arc<dyn PlaceRepository>,
    geocoder: Arc<dyn Geocoder>,
}

impl PlaceStore {
    pub fn new(repository: Arc<dyn PlaceRepository>, geocoder: Arc<dyn Geocoder>) -> Self {
        PlaceStore {
            repository,
            geocoder,
        }
    }

    #[instrument(skip(self))]
    pub async fn list_places(&self) -> Result<Vec<Place>, DirectoryError> {
        let records = self.repository.list().await?;
        info!("resolving {} places", records.len());
        Ok(stream::iter(records)
            .map(|record| self.ensure_coordinates(record))
            .buffered(RESOLVE_CONCURRENCY)
            .map(Place::from)
            .collect::<Vec<_>>()
            .await)
    }

    #[instrument(skip(self))]
    pub async fn get_place(&self, id: Uuid) -> Result<Place, DirectoryError> {
        let record = self
            .repository
            .get(id)
            .await?
            .ok_or(DirectoryError::not_found("Space not found"))?;
        Ok(self.ensure_coordinates(record).await.into())
    }

    #[instrument(skip(self, input))]
    pub async fn create_place(&self, input: PlaceInput) -> Result<Place, DirectoryError> {
        let fields = self.resolve_fields(PlaceFields::try_from(input)?).await;
        let record = self.repository.insert(fields).await?;
        info!("created space {}", record.id);
        Ok(record.into())
    }

    #[instrument(skip(self, input))]
    pub async fn update_place(&self, id: Uuid, input: PlaceInput) -> Result<Place, DirectoryError> {
        let existing = self
            .repository
            .get(id)
            .await?
            .ok_or(DirectoryError::not_found("Space not found"))?;
        let keep_price = input.price.is_none();
        let mut fields = PlaceFields::try_from(input.or_stored(&existing))?;
        if keep_price {
            fields.price = existing.price.clone();
        }
        let address_changed = fields.address.as_deref() != existing.lookup_address();
        if locate(fields.lat, fields.long).is_none() {
            if existing.is_locatable() && !address_changed {
                fields.lat = existing.lat;
                fields.long = existing.long;
            } else {
                fields = self.resolve_fields(fields).await;
            }
        }
        let record = self
            .repository
            .update(id, fields)
            .await?
            .ok_or(DirectoryError::not_found("Space not found"))?;
        Ok(record.into())
    }

    /// Operator override. Always writes, even over a resolved coordinate.
    #[instrument(skip(self))]
    pub async fn update_coordinate(&self, id: Uuid, lat: f64, lng: f64) -> Result<Place, DirectoryError> {
        if !is_valid_coord(lat) || !is_valid_coord(lng) {
            return Err(DirectoryError::validation("lat and lng must be finite numbers"));
        }
        let record = self
            .repository
            .set_coordinates(id, lat, lng)
            .await?
            .ok_or(DirectoryError::not_found("Space not found"))?;
        Ok(record.into())
    }

    /// The one geocoder call site. Failures are logged and read as "no result".
    async fn lookup(&self, address: &str) -> Option<ResolvedCoordinate> {
        match self.geocoder.geocode(address).await {
            Ok(Some(resolved)) if is_valid_coord(resolved.lat) && is_valid_coord(resolved.lng) => {
                Some(resolved)
            }
            Ok(_) => {
                info!("no geocoding result for {address:?}");
                None
            }
            Err(err) => {
                warn!("geocoding {address:?} failed: {err}");
                None
            }
        }
    }

    /// Fills in and persists a coordinate for a stored place that has an address but
    /// no location. Anything going wrong leaves the place as it was.
    async fn ensure_coordinates(&self, record: PlaceRecord) -> PlaceRecord {
        if record.is_locatable() {
            return record;
        }
        let Some(address) = record.lookup_address() else {
            return record;
        };
        let Some(resolved) = self.lookup(address).await else {
            return record;
        };
        match self
            .repository
            .set_coordinates(record.id, resolved.lat, resolved.lng)
            .await
        {
            Ok(Some(updated)) => updated,
            Ok(None) => {
                warn!("space {} disappeared while resolving", record.id);
                PlaceRecord {
                    lat: Some(resolved.lat),
                    long: Some(resolved.lng),
                    ..record
                }
            }
            Err(err) => {
                error!("failed to persist coords for space {}: {err}", record.id);
                PlaceRecord {
                    lat: Some(resolved.lat),
                    long: Some(resolved.lng),
                    ..record
                }
            }
        }
    }

    /// Resolves a write that carries an address but no valid coordinate.
    async fn resolve_fields(&self, mut fields: PlaceFields) -> PlaceFields {
        if locate(fields.lat, fields.long).is_some() {
            return fields;
        }
        let resolved = match fields.address.as_deref() {
            Some(address) => self.lookup(address).await,
            None => None,
        };
        if let Some(resolved) = resolved {
            fields.lat = Some(resolved.lat);
            fields.long = Some(resolved.lng);
        }
        fields
    }
}
