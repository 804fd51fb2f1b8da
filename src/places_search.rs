use async_trait::async_trait;
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::{
    error::DirectoryError,
    hours::{parse_weekday_descriptions, to_opening_hours},
    place_geo::locate,
    types::{
        dto::{
            candidate::{LatLng, PlaceCandidate},
            place::PlaceInput,
        },
        google_places::{GooglePlace, SearchTextRequest, SearchTextResponse},
    },
};

const SEARCH_TEXT_URL: &str = "https://places.googleapis.com/v1/places:searchText";
const FIELD_MASK: &str = "places.id,places.displayName,places.formattedAddress,places.websiteUri,places.nationalPhoneNumber,places.regularOpeningHours,places.location";
pub const MAX_CANDIDATES: usize = 5;

/// External place directory lookup, in the service's own relevance order.
#[async_trait]
pub trait PlaceSearch: Send + Sync {
    async fn search_text(
        &self,
        query: &str,
        location: &str,
    ) -> Result<Vec<PlaceCandidate>, DirectoryError>;
}

pub struct GooglePlacesClient {
    client: reqwest::Client,
    api_key: Option<String>,
}

impl GooglePlacesClient {
    pub fn new(client: reqwest::Client, api_key: Option<String>) -> Self {
        GooglePlacesClient { client, api_key }
    }
}

#[async_trait]
impl PlaceSearch for GooglePlacesClient {
    #[instrument(skip(self))]
    async fn search_text(
        &self,
        query: &str,
        location: &str,
    ) -> Result<Vec<PlaceCandidate>, DirectoryError> {
        let api_key = self.api_key.as_deref().ok_or(DirectoryError::external(
            "google places",
            "Google Places API key is not configured",
        ))?;
        let response = self
            .client
            .post(SEARCH_TEXT_URL)
            .header("X-Goog-Api-Key", api_key)
            .header("X-Goog-FieldMask", FIELD_MASK)
            .json(&SearchTextRequest {
                text_query: format!("{query} {location}"),
                max_result_count: MAX_CANDIDATES,
                language_code: "en",
            })
            .send()
            .await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DirectoryError::external(
                "google places",
                format!("search failed ({status}): {body}"),
            ));
        }
        let body: SearchTextResponse = response.json().await?;
        if body.places.is_empty() {
            info!("no places found for {query:?}");
        }
        Ok(body
            .places
            .into_iter()
            .map(|place| into_candidate(place, query))
            .collect())
    }
}

pub fn into_candidate(place: GooglePlace, query: &str) -> PlaceCandidate {
    let name = place
        .display_name
        .as_ref()
        .and_then(|name| name.text())
        .unwrap_or(query)
        .to_string();
    PlaceCandidate {
        external_id: place
            .id
            .unwrap_or_else(|| format!("place-{}", Uuid::new_v4())),
        name,
        address: place.formatted_address,
        website: place.website_uri,
        phone: place.national_phone_number,
        coordinate: place.location.map(|location| LatLng {
            lat: location.latitude,
            lng: location.longitude,
        }),
        weekly_hours: place
            .regular_opening_hours
            .and_then(|hours| parse_weekday_descriptions(hours.weekday_descriptions.as_slice())),
    }
}

/// Candidates for an operator typing a place name. Never fails: any problem is
/// logged and turns into an empty list so manual entry can carry on.
#[instrument(skip(search))]
pub async fn search_candidates(
    search: &dyn PlaceSearch,
    name: &str,
    location: &str,
) -> Vec<PlaceCandidate> {
    let name = name.trim();
    if name.is_empty() {
        return Vec::new();
    }
    match search.search_text(name, location).await {
        Ok(mut candidates) => {
            candidates.truncate(MAX_CANDIDATES);
            candidates
        }
        Err(err) => {
            error!("place search failed: {err}");
            Vec::new()
        }
    }
}

fn fill(field: &mut Option<String>, value: Option<&String>) {
    let blank = field.as_deref().map_or(true, |current| current.trim().is_empty());
    if blank {
        if let Some(value) = value.filter(|value| !value.trim().is_empty()) {
            *field = Some(value.clone());
        }
    }
}

/// Copies a chosen candidate into a draft. Whatever the operator already
/// filled in stays, only empty fields take the candidate's values.
pub fn merge_candidate(draft: &mut PlaceInput, candidate: &PlaceCandidate) {
    fill(&mut draft.name, Some(&candidate.name));
    fill(&mut draft.address, candidate.address.as_ref());
    fill(&mut draft.website, candidate.website.as_ref());
    fill(&mut draft.contact, candidate.phone.as_ref());

    if locate(draft.lat, draft.lng).is_none() {
        if let Some(LatLng { lat, lng }) = candidate.coordinate {
            draft.lat = Some(lat);
            draft.lng = Some(lng);
        }
    }

    let Some(candidate_hours) = candidate.weekly_hours.as_ref().and_then(to_opening_hours) else {
        return;
    };
    let hours = draft.hours.get_or_insert_with(Default::default);
    for (day, range) in candidate_hours {
        let slot = hours.entry(day).or_insert(None);
        if slot.as_deref().map_or(true, |current| current.trim().is_empty()) {
            *slot = range;
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::hours::{Meridiem, Weekday};

    struct FixedSearch(Result<usize, ()>);

    #[async_trait]
    impl PlaceSearch for FixedSearch {
        async fn search_text(
            &self,
            query: &str,
            _location: &str,
        ) -> Result<Vec<PlaceCandidate>, DirectoryError> {
            match self.0 {
                Ok(count) => Ok((0..count)
                    .map(|i| {
                        let place = GooglePlace {
                            id: Some(format!("id-{i}")),
                            ..Default::default()
                        };
                        into_candidate(place, query)
                    })
                    .collect()),
                Err(()) => Err(DirectoryError::external("google places", "boom")),
            }
        }
    }

    #[test]
    fn converts_google_place() {
        let place: GooglePlace = serde_json::from_value(json!({
            "id": "abc",
            "displayName": { "text": "Makerspace Toronto", "languageCode": "en" },
            "formattedAddress": "1 King St W, Toronto, ON",
            "websiteUri": "https://maker.example",
            "nationalPhoneNumber": "(416) 555-0100",
            "location": { "latitude": 43.65, "longitude": -79.38 },
            "regularOpeningHours": { "weekdayDescriptions": [
                "Monday: 9:00 AM – 5:00 PM",
                "Tuesday: Closed"
            ] }
        }))
        .unwrap();
        let candidate = into_candidate(place, "maker");
        assert_eq!(candidate.external_id, "abc");
        assert_eq!(candidate.name, "Makerspace Toronto");
        assert_eq!(candidate.coordinate, Some(LatLng { lat: 43.65, lng: -79.38 }));
        let hours = candidate.weekly_hours.unwrap();
        assert_eq!(hours[&Weekday::Monday].open_meridiem, Meridiem::Am);
        assert!(!hours.contains_key(&Weekday::Tuesday));
    }

    #[test]
    fn missing_fields_fall_back() {
        let place: GooglePlace = serde_json::from_value(json!({ "displayName": "" })).unwrap();
        let candidate = into_candidate(place, "studio");
        assert_eq!(candidate.name, "studio");
        assert!(candidate.external_id.starts_with("place-"));
        assert!(candidate.weekly_hours.is_none());
        let json = serde_json::to_value(&candidate).unwrap();
        assert!(json.get("hours").is_none());
        assert!(json.get("placeId").is_some());
    }

    #[tokio::test]
    async fn caps_results() {
        let results = search_candidates(&FixedSearch(Ok(8)), "maker", "Toronto").await;
        assert_eq!(results.len(), MAX_CANDIDATES);
        assert_eq!(results[0].external_id, "id-0");
    }

    #[tokio::test]
    async fn failures_become_empty_results() {
        assert!(search_candidates(&FixedSearch(Err(())), "maker", "Toronto").await.is_empty());
        let unconfigured = GooglePlacesClient::new(reqwest::Client::new(), None);
        assert!(search_candidates(&unconfigured, "maker", "Toronto").await.is_empty());
        assert!(search_candidates(&FixedSearch(Ok(2)), "  ", "Toronto").await.is_empty());
    }

    #[test]
    fn merge_keeps_operator_fields() {
        let candidate = PlaceCandidate {
            external_id: "abc".into(),
            name: "Makerspace Toronto".into(),
            address: Some("1 King St W".into()),
            website: Some("https://maker.example".into()),
            phone: Some("(416) 555-0100".into()),
            coordinate: Some(LatLng { lat: 43.65, lng: -79.38 }),
            weekly_hours: parse_weekday_descriptions(&[
                "Monday: 9:00 AM – 5:00 PM",
                "Tuesday: 10 AM - 2 PM",
            ]),
        };
        let mut draft = PlaceInput {
            name: Some("My Space".into()),
            website: Some("  ".into()),
            contact: Some("hello@example.com".into()),
            hours: Some([(Weekday::Monday, Some("8:00am-4:00pm".to_string()))].into()),
            ..Default::default()
        };
        merge_candidate(&mut draft, &candidate);

        assert_eq!(draft.name.as_deref(), Some("My Space"));
        assert_eq!(draft.address.as_deref(), Some("1 King St W"));
        assert_eq!(draft.website.as_deref(), Some("https://maker.example"));
        assert_eq!(draft.contact.as_deref(), Some("hello@example.com"));
        assert_eq!((draft.lat, draft.lng), (Some(43.65), Some(-79.38)));
        let hours = draft.hours.unwrap();
        assert_eq!(hours[&Weekday::Monday].as_deref(), Some("8:00am-4:00pm"));
        assert_eq!(hours[&Weekday::Tuesday].as_deref(), Some("10:00am-2:00pm"));
        assert_eq!(hours[&Weekday::Sunday], None);
    }
}
