use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure of a request against the weather service.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    /// Transport failure or timeout; the service never answered.
    #[error("Network error: {0}")]
    Network(String),

    /// The service answered with a non-success status (bad key, rate limit, ...).
    #[error("Weather service returned status {status}: {message}")]
    Upstream { status: u16, message: String },

    /// The service answered 2xx but the payload did not have the expected shape.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

/// Failure to turn a user action into a canonical location.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LocationError {
    #[error("Location access was denied")]
    GeolocationDenied,

    #[error("Location is not available on this device")]
    GeolocationUnsupported,

    #[error("City name is empty")]
    EmptyQuery,

    #[error("Invalid coordinates ({latitude}, {longitude})")]
    InvalidCoordinates { latitude: f64, longitude: f64 },

    #[error("City '{query}' not found (status {status})")]
    CityNotFound { query: String, status: u16 },

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Anything that can end an acquisition attempt.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AcquisitionError {
    #[error(transparent)]
    Location(#[from] LocationError),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Flat classification of [`AcquisitionError`], used to pick the message shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    GeolocationDenied,
    GeolocationUnsupported,
    EmptyQuery,
    InvalidCoordinates,
    CityNotFound,
    NetworkError,
    UpstreamError,
    MalformedResponse,
}

/// What the presentation layer should offer after a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryAction {
    SearchForCity,
    TryAgain,
}

impl FetchError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::Network(_) => ErrorKind::NetworkError,
            FetchError::Upstream { .. } => ErrorKind::UpstreamError,
            FetchError::MalformedResponse(_) => ErrorKind::MalformedResponse,
        }
    }
}

impl LocationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LocationError::GeolocationDenied => ErrorKind::GeolocationDenied,
            LocationError::GeolocationUnsupported => ErrorKind::GeolocationUnsupported,
            LocationError::EmptyQuery => ErrorKind::EmptyQuery,
            LocationError::InvalidCoordinates { .. } => ErrorKind::InvalidCoordinates,
            LocationError::CityNotFound { .. } => ErrorKind::CityNotFound,
            LocationError::Fetch(e) => e.kind(),
        }
    }
}

impl AcquisitionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AcquisitionError::Location(e) => e.kind(),
            AcquisitionError::Fetch(e) => e.kind(),
        }
    }

    /// Short message suitable for display.
    pub fn user_message(&self) -> String {
        match self {
            AcquisitionError::Location(LocationError::CityNotFound { query, status: 404 }) => {
                format!("Could not find a city named \"{query}\". Check the spelling and try again.")
            }
            AcquisitionError::Location(LocationError::CityNotFound { query, status }) => {
                format!(
                    "The weather service refused the lookup for \"{query}\" (status {status}). Try again later."
                )
            }
            other => other.kind().user_message().to_string(),
        }
    }
}

impl ErrorKind {
    pub fn user_message(&self) -> &'static str {
        match self {
            ErrorKind::GeolocationDenied => {
                "Location access was denied. Search for a city to see its weather."
            }
            ErrorKind::GeolocationUnsupported => {
                "Your location is not available. Search for a city to see its weather."
            }
            ErrorKind::EmptyQuery => "Enter a city name to search for.",
            ErrorKind::InvalidCoordinates => {
                "The coordinates are out of range. Search for a city instead."
            }
            ErrorKind::CityNotFound => "Could not find that city. Check the spelling and try again.",
            ErrorKind::NetworkError => {
                "Could not reach the weather service. Check your connection and try again."
            }
            ErrorKind::UpstreamError => "The weather service rejected the request. Try again later.",
            ErrorKind::MalformedResponse => {
                "The weather service sent data we could not read. Try again later."
            }
        }
    }

    pub fn recovery_action(&self) -> RecoveryAction {
        match self {
            ErrorKind::GeolocationDenied
            | ErrorKind::GeolocationUnsupported
            | ErrorKind::EmptyQuery
            | ErrorKind::InvalidCoordinates => RecoveryAction::SearchForCity,
            ErrorKind::CityNotFound
            | ErrorKind::NetworkError
            | ErrorKind::UpstreamError
            | ErrorKind::MalformedResponse => RecoveryAction::TryAgain,
        }
    }
}
