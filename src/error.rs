use thiserror::Error;

#[derive(Error, Debug)]
pub enum DirectoryError {
    /// Bad or missing required input. Never retried.
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    /// Geocoding or place search failed at the transport, protocol or credential level.
    #[error("{service} failed: {message}")]
    ExternalService {
        service: &'static str,
        message: String,
    },
    #[error("store failure: {0}")]
    Persistence(#[from] sqlx::Error),
}

impl DirectoryError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn external(service: &'static str, message: impl ToString) -> Self {
        Self::ExternalService {
            service,
            message: message.to_string(),
        }
    }
}

impl From<reqwest::Error> for DirectoryError {
    fn from(value: reqwest::Error) -> Self {
        let service = match value.url().and_then(|url| url.host_str()) {
            Some(host) if host.contains("mapbox") => "mapbox",
            Some(host) if host.contains("googleapis") => "google places",
            _ => "http",
        };
        Self::external(service, value)
    }
}
