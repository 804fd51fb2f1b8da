use serde::{Deserialize, Serialize};

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SearchTextRequest<'a> {
    pub text_query: String,
    pub max_result_count: usize,
    pub language_code: &'a str,
}

#[derive(Deserialize, Debug, Default)]
pub struct SearchTextResponse {
    #[serde(default)]
    pub places: Vec<GooglePlace>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct GooglePlace {
    pub id: Option<String>,
    pub display_name: Option<DisplayName>,
    pub formatted_address: Option<String>,
    pub website_uri: Option<String>,
    pub national_phone_number: Option<String>,
    pub regular_opening_hours: Option<RegularOpeningHours>,
    pub location: Option<GoogleLatLng>,
}

/// Either a bare string or a localized text object.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub enum DisplayName {
    Plain(String),
    Localized { text: Option<String> },
}

impl DisplayName {
    pub fn text(&self) -> Option<&str> {
        match self {
            DisplayName::Plain(text) => Some(text.as_str()),
            DisplayName::Localized { text } => text.as_deref(),
        }
        .filter(|text| !text.trim().is_empty())
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct RegularOpeningHours {
    #[serde(default)]
    pub weekday_descriptions: Vec<String>,
}

#[derive(Deserialize, Debug, Clone, Copy)]
pub struct GoogleLatLng {
    pub latitude: f64,
    pub longitude: f64,
}
