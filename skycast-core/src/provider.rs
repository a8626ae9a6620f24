use crate::{
    Config,
    error::FetchError,
    model::{CityMatch, Coordinates, CurrentConditions, ForecastEntry},
    provider::openweather::OpenWeatherClient,
};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod openweather;

/// The three weather-service operations the app consumes.
///
/// Implementations are stateless request issuers: they return values and
/// never touch view state.
#[async_trait]
pub trait WeatherService: Send + Sync + Debug {
    async fn current_by_coordinates(
        &self,
        coordinates: Coordinates,
    ) -> Result<CurrentConditions, FetchError>;

    /// Name lookup. A non-success status comes back as [`FetchError::Upstream`].
    async fn current_by_city(&self, city: &str) -> Result<CityMatch, FetchError>;

    async fn forecast_by_coordinates(
        &self,
        coordinates: Coordinates,
        count: usize,
    ) -> Result<Vec<ForecastEntry>, FetchError>;
}

/// Construct the OpenWeather client from config.
pub fn service_from_config(config: &Config) -> anyhow::Result<Arc<dyn WeatherService>> {
    let api_key = config.api_key().ok_or_else(|| {
        anyhow::anyhow!(
            "No OpenWeather API key configured.\n\
             Hint: run `skycast configure` or set {}.",
            crate::config::API_KEY_ENV
        )
    })?;

    let client = OpenWeatherClient::new(
        config.base_url().to_owned(),
        api_key.to_owned(),
        config.request_timeout(),
    )?;

    Ok(Arc::new(client))
}
