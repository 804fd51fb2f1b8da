use async_trait::async_trait;
use chrono::Utc;
use sqlx::{types::Json, Pool, Postgres};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    error::DirectoryError,
    types::model::place::{PlaceFields, PlaceRecord},
};

/// Storage for places. Lookups by id return `Ok(None)` when the place is absent.
#[async_trait]
pub trait PlaceRepository: Send + Sync {
    /// Newest first.
    async fn list(&self) -> Result<Vec<PlaceRecord>, DirectoryError>;
    async fn get(&self, id: Uuid) -> Result<Option<PlaceRecord>, DirectoryError>;
    async fn insert(&self, fields: PlaceFields) -> Result<PlaceRecord, DirectoryError>;
    async fn update(
        &self,
        id: Uuid,
        fields: PlaceFields,
    ) -> Result<Option<PlaceRecord>, DirectoryError>;
    async fn set_coordinates(
        &self,
        id: Uuid,
        lat: f64,
        lng: f64,
    ) -> Result<Option<PlaceRecord>, DirectoryError>;
}

const PLACE_COLUMNS: &str = "id, name, address, industry, vibes, pricing, price, website, contact, hours, lat, long, created_at";

pub struct PgPlaceRepository {
    pool: Pool<Postgres>,
}

impl PgPlaceRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        PgPlaceRepository { pool }
    }
}

#[async_trait]
impl PlaceRepository for PgPlaceRepository {
    async fn list(&self) -> Result<Vec<PlaceRecord>, DirectoryError> {
        Ok(sqlx::query_as::<_, PlaceRecord>(&format!(
            "select {PLACE_COLUMNS} from spaces order by created_at desc"
        ))
        .fetch_all(&self.pool)
        .await?)
    }

    async fn get(&self, id: Uuid) -> Result<Option<PlaceRecord>, DirectoryError> {
        Ok(sqlx::query_as::<_, PlaceRecord>(&format!(
            "select {PLACE_COLUMNS} from spaces where id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn insert(&self, fields: PlaceFields) -> Result<PlaceRecord, DirectoryError> {
        Ok(sqlx::query_as::<_, PlaceRecord>(&format!(
            r#"insert into spaces (id, name, address, industry, vibes, pricing, price, website, contact, hours, lat, long)
            values ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            returning {PLACE_COLUMNS}"#
        ))
        .bind(Uuid::new_v4())
        .bind(fields.name)
        .bind(fields.address)
        .bind(fields.industry)
        .bind(fields.vibes)
        .bind(fields.pricing)
        .bind(fields.price)
        .bind(fields.website)
        .bind(fields.contact)
        .bind(fields.hours.map(Json))
        .bind(fields.lat)
        .bind(fields.long)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn update(
        &self,
        id: Uuid,
        fields: PlaceFields,
    ) -> Result<Option<PlaceRecord>, DirectoryError> {
        Ok(sqlx::query_as::<_, PlaceRecord>(&format!(
            r#"update spaces set
            name = $2, address = $3, industry = $4, vibes = $5, pricing = $6, price = $7,
            website = $8, contact = $9, hours = $10, lat = $11, long = $12
            where id = $1
            returning {PLACE_COLUMNS}"#
        ))
        .bind(id)
        .bind(fields.name)
        .bind(fields.address)
        .bind(fields.industry)
        .bind(fields.vibes)
        .bind(fields.pricing)
        .bind(fields.price)
        .bind(fields.website)
        .bind(fields.contact)
        .bind(fields.hours.map(Json))
        .bind(fields.lat)
        .bind(fields.long)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn set_coordinates(
        &self,
        id: Uuid,
        lat: f64,
        lng: f64,
    ) -> Result<Option<PlaceRecord>, DirectoryError> {
        Ok(sqlx::query_as::<_, PlaceRecord>(&format!(
            "update spaces set lat = $2, long = $3 where id = $1 returning {PLACE_COLUMNS}"
        ))
        .bind(id)
        .bind(lat)
        .bind(lng)
        .fetch_optional(&self.pool)
        .await?)
    }
}

/// Process-local store for development without a database, and for tests.
#[derive(Default)]
pub struct MemoryPlaceRepository {
    places: RwLock<Vec<PlaceRecord>>,
}

impl MemoryPlaceRepository {
    pub fn with_places(places: Vec<PlaceRecord>) -> Self {
        MemoryPlaceRepository {
            places: RwLock::new(places),
        }
    }
}

#[async_trait]
impl PlaceRepository for MemoryPlaceRepository {
    async fn list(&self) -> Result<Vec<PlaceRecord>, DirectoryError> {
        let mut places = self.places.read().await.clone();
        places.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(places)
    }

    async fn get(&self, id: Uuid) -> Result<Option<PlaceRecord>, DirectoryError> {
        Ok(self
            .places
            .read()
            .await
            .iter()
            .find(|place| place.id == id)
            .cloned())
    }

    async fn insert(&self, fields: PlaceFields) -> Result<PlaceRecord, DirectoryError> {
        let record = PlaceRecord::from_fields(Uuid::new_v4(), fields, Utc::now());
        self.places.write().await.push(record.clone());
        Ok(record)
    }

    async fn update(
        &self,
        id: Uuid,
        fields: PlaceFields,
    ) -> Result<Option<PlaceRecord>, DirectoryError> {
        let mut places = self.places.write().await;
        Ok(places.iter_mut().find(|place| place.id == id).map(|place| {
            *place = PlaceRecord::from_fields(id, fields, place.created_at);
            place.clone()
        }))
    }

    async fn set_coordinates(
        &self,
        id: Uuid,
        lat: f64,
        lng: f64,
    ) -> Result<Option<PlaceRecord>, DirectoryError> {
        let mut places = self.places.write().await;
        Ok(places.iter_mut().find(|place| place.id == id).map(|place| {
            place.lat = Some(lat);
            place.long = Some(lng);
            place.clone()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_repository_round_trip() {
        let repository = MemoryPlaceRepository::default();
        let created = repository
            .insert(PlaceFields {
                name: "Studio".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(repository.list().await.unwrap().len(), 1);

        let moved = repository
            .set_coordinates(created.id, 43.65, -79.38)
            .await
            .unwrap()
            .unwrap();
        assert_eq!((moved.lat, moved.long), (Some(43.65), Some(-79.38)));
        assert!(repository
            .set_coordinates(Uuid::new_v4(), 1.0, 1.0)
            .await
            .unwrap()
            .is_none());

        let renamed = repository
            .update(
                created.id,
                PlaceFields {
                    name: "Gallery".into(),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(renamed.name, "Gallery");
        assert_eq!(renamed.created_at, created.created_at);
    }
}
