use std::{net::SocketAddr, sync::Arc};

use spaces_directory::{
    api::{self, AppState},
    clients::{init_repository, init_reqwest_client},
    config::Config,
    geocode::MapboxGeocoder,
    place_store::PlaceStore,
    places_search::GooglePlacesClient,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    // initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    let repository = init_repository(&config).await?;
    let http = init_reqwest_client()?;
    let geocoder = Arc::new(MapboxGeocoder::new(
        http.clone(),
        config.mapbox_token.clone(),
        config.geocode_country.clone(),
    ));
    let state = AppState {
        store: Arc::new(PlaceStore::new(repository, geocoder.clone())),
        geocoder,
        place_search: Arc::new(GooglePlacesClient::new(
            http,
            config.google_places_key.clone(),
        )),
        default_search_location: Arc::from(config.default_search_location.as_str()),
    };

    let app = api::router(state);

    info!("Running on port {}", config.port);

    axum::Server::bind(&SocketAddr::from(([0, 0, 0, 0], config.port)))
        .serve(app.into_make_service())
        .await?;

    Ok(())
}
