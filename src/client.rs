use async_trait::async_trait;
use color_eyre::eyre::{Result, WrapErr};
use reqwest::{Client, Url};
use tracing::{debug, instrument};

use crate::{
    error::DirectoryError,
    types::dto::{
        candidate::{PlaceCandidate, SearchResponse},
        place::Place,
    },
    viewport::CandidateSource,
};

const SERVICE: &str = "directory api";

/// Talks to the directory api the way the map page does.
#[derive(Debug, Clone)]
pub struct DirectoryClient {
    http: Client,
    base_url: Url,
    location: Option<String>,
}

impl DirectoryClient {
    pub fn new(http: Client, base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url).wrap_err("invalid directory api url")?;
        Ok(DirectoryClient {
            http,
            base_url,
            location: None,
        })
    }

    /// Area hint sent with every candidate search, the server default otherwise.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    fn endpoint(&self, path: &str) -> Result<Url, DirectoryError> {
        self.base_url
            .join(path)
            .map_err(|err| DirectoryError::external(SERVICE, err))
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        url: Url,
    ) -> Result<T, DirectoryError> {
        let response = self.http.get(url).send().await.map_err(external)?;
        let status = response.status();
        if !status.is_success() {
            return Err(DirectoryError::external(
                SERVICE,
                format!("Request failed with status {}", status.as_u16()),
            ));
        }
        response.json().await.map_err(external)
    }

    #[instrument(skip(self))]
    pub async fn fetch_places(&self) -> Result<Vec<Place>, DirectoryError> {
        let places: Vec<Place> = self.get(self.endpoint("/api/spaces")?).await?;
        debug!("received {} spaces", places.len());
        Ok(places)
    }

    #[instrument(skip(self))]
    pub async fn search_candidates(&self, name: &str) -> Result<Vec<PlaceCandidate>, DirectoryError> {
        let mut url = self.endpoint("/api/places/search")?;
        url.query_pairs_mut().append_pair("q", name);
        if let Some(location) = &self.location {
            url.query_pairs_mut().append_pair("location", location);
        }
        let response: SearchResponse = self.get(url).await?;
        Ok(response.results)
    }
}

fn external(err: reqwest::Error) -> DirectoryError {
    DirectoryError::external(SERVICE, err)
}

#[async_trait]
impl CandidateSource for DirectoryClient {
    async fn candidates(&self, query: &str) -> Result<Vec<PlaceCandidate>, DirectoryError> {
        self.search_candidates(query).await
    }
}
