use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use tower_http::cors::CorsLayer;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    error::DirectoryError,
    geocode::Geocoder,
    net::response::{ResponseError, Result},
    place_store::PlaceStore,
    places_search::{search_candidates, PlaceSearch},
    types::dto::{
        candidate::{SearchQuery, SearchResponse},
        geocode::{GeocodeQuery, GeocodeResponse},
        place::{CoordinatesInput, Place, PlaceInput},
    },
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<PlaceStore>,
    pub geocoder: Arc<dyn Geocoder>,
    pub place_search: Arc<dyn PlaceSearch>,
    pub default_search_location: Arc<str>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/spaces", get(list_spaces).post(create_space))
        .route("/api/spaces/:id", get(get_space_by_id).patch(update_space))
        .route("/api/spaces/:id/coords", patch(update_space_coords))
        .route("/api/geocode", get(geocode))
        .route("/api/places/search", get(search_places))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// Ids that are not uuids can't name a stored space
fn parse_id(id: &str) -> Result<Uuid> {
    Uuid::parse_str(id).map_err(|_| ResponseError::not_found("Space not found"))
}

fn json_body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| DirectoryError::validation(rejection.body_text()).into())
}

async fn list_spaces(State(state): State<AppState>) -> Result<Json<Vec<Place>>> {
    Ok(Json(state.store.list_places().await?))
}

async fn get_space_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Place>> {
    Ok(Json(state.store.get_place(parse_id(&id)?).await?))
}

#[instrument(skip(state, payload))]
async fn update_space_coords(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<CoordinatesInput>, JsonRejection>,
) -> Result<Json<Place>> {
    let input = json_body(payload)?;
    let (Some(lat), Some(lng)) = (input.lat.as_f64(), input.lng.as_f64()) else {
        return Err(DirectoryError::validation("lat and lng must be finite numbers").into());
    };
    Ok(Json(
        state
            .store
            .update_coordinate(parse_id(&id)?, lat, lng)
            .await?,
    ))
}

#[instrument(skip(state, payload))]
async fn create_space(
    State(state): State<AppState>,
    payload: std::result::Result<Json<PlaceInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Place>)> {
    let place = state.store.create_place(json_body(payload)?).await?;
    Ok((StatusCode::CREATED, Json(place)))
}

#[instrument(skip(state, payload))]
async fn update_space(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<PlaceInput>, JsonRejection>,
) -> Result<Json<Place>> {
    let input = json_body(payload)?;
    Ok(Json(state.store.update_place(parse_id(&id)?, input).await?))
}

async fn geocode(
    State(state): State<AppState>,
    Query(params): Query<GeocodeQuery>,
) -> Result<Json<GeocodeResponse>> {
    let query = params
        .q
        .as_deref()
        .map(str::trim)
        .filter(|query| !query.is_empty())
        .ok_or(ResponseError::bad_request(
            "Missing address query param \"q\"",
        ))?;
    let coordinate = state
        .geocoder
        .geocode(query)
        .await?
        .ok_or(ResponseError::not_found("No results found for that address"))?;
    Ok(Json(GeocodeResponse {
        query: query.to_string(),
        coordinate,
    }))
}

async fn search_places(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Json<SearchResponse> {
    let location = params
        .location
        .filter(|location| !location.trim().is_empty())
        .unwrap_or_else(|| state.default_search_location.to_string());
    let results = search_candidates(
        state.place_search.as_ref(),
        params.q.as_deref().unwrap_or_default(),
        &location,
    )
    .await;
    Json(SearchResponse { results })
}
