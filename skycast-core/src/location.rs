//! Turning user input (device position or a city name) into a canonical location.

use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc, time::Duration};
use tracing::{debug, warn};

use crate::{
    config::DEFAULT_TIMEOUT_SECS,
    error::{FetchError, LocationError},
    fetch::bounded,
    model::{Coordinates, LocationQuery, ResolvedLocation},
    provider::WeatherService,
};

/// Source of the device's position. One-shot; may be denied or unsupported.
#[async_trait]
pub trait GeolocationProvider: Send + Sync + Debug {
    async fn current_position(&self) -> Result<Coordinates, LocationError>;
}

/// Position known up front (command-line flags or the `[home]` config section).
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedPosition(Option<Coordinates>);

impl FixedPosition {
    pub fn new(coordinates: Option<Coordinates>) -> Self {
        Self(coordinates)
    }
}

#[async_trait]
impl GeolocationProvider for FixedPosition {
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        self.0.ok_or(LocationError::GeolocationUnsupported)
    }
}

/// The user has refused location access.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeniedPosition;

#[async_trait]
impl GeolocationProvider for DeniedPosition {
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        Err(LocationError::GeolocationDenied)
    }
}

#[derive(Debug, Clone)]
pub struct LocationResolver {
    service: Arc<dyn WeatherService>,
    timeout: Duration,
}

impl LocationResolver {
    pub fn new(service: Arc<dyn WeatherService>) -> Self {
        Self { service, timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS) }
    }

    /// Bound on the city lookup; expiry is reported as a network error.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn resolve(&self, query: LocationQuery) -> Result<ResolvedLocation, LocationError> {
        match query {
            LocationQuery::Coordinates(coordinates) => {
                Ok(ResolvedLocation { coordinates, name: None })
            }
            LocationQuery::City(city) => self.resolve_city(&city).await,
        }
    }

    async fn resolve_city(&self, city: &str) -> Result<ResolvedLocation, LocationError> {
        let city = city.trim();
        if city.is_empty() {
            return Err(LocationError::EmptyQuery);
        }

        debug!(city, "looking up city");

        match bounded("city lookup", self.timeout, self.service.current_by_city(city)).await {
            Ok(found) => {
                debug!(city, coordinates = %found.coordinates, "city resolved");
                let name = Some(found.conditions.location_name)
                    .filter(|n| !n.is_empty())
                    .unwrap_or_else(|| city.to_string());
                Ok(ResolvedLocation { coordinates: found.coordinates, name: Some(name) })
            }
            Err(FetchError::Upstream { status, message }) => {
                warn!(city, status, %message, "city lookup rejected");
                Err(LocationError::CityNotFound { query: city.to_string(), status })
            }
            Err(e) => Err(e.into()),
        }
    }
}
