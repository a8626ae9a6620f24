//! Concurrent retrieval of current conditions and the short forecast.

use std::{future::Future, sync::Arc, time::Duration};
use tracing::{debug, warn};

use crate::{
    config::DEFAULT_TIMEOUT_SECS,
    error::FetchError,
    model::{ResolvedLocation, WeatherReport},
    provider::WeatherService,
};

/// Entries requested from the forecast endpoint (`cnt`).
pub const FORECAST_REQUEST_COUNT: usize = 8;

/// Entries kept for presentation.
pub const FORECAST_DISPLAY_COUNT: usize = 6;

#[derive(Debug, Clone)]
pub struct WeatherFetcher {
    service: Arc<dyn WeatherService>,
    timeout: Duration,
}

impl WeatherFetcher {
    pub fn new(service: Arc<dyn WeatherService>) -> Self {
        Self { service, timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS) }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Issues both requests at once; the first failure wins and the other
    /// request is dropped.
    pub async fn fetch_current_and_forecast(
        &self,
        location: &ResolvedLocation,
    ) -> Result<WeatherReport, FetchError> {
        let coordinates = location.coordinates;
        debug!(%coordinates, "fetching current conditions and forecast");

        let current = bounded(
            "current conditions",
            self.timeout,
            self.service.current_by_coordinates(coordinates),
        );
        let forecast = bounded(
            "forecast",
            self.timeout,
            self.service.forecast_by_coordinates(coordinates, FORECAST_REQUEST_COUNT),
        );

        let (current, mut forecast) = tokio::try_join!(current, forecast).inspect_err(|e| {
            warn!(%coordinates, error = %e, "weather fetch failed");
        })?;

        forecast.truncate(FORECAST_DISPLAY_COUNT);

        Ok(WeatherReport { location: location.clone(), current, forecast })
    }
}

pub(crate) async fn bounded<T>(
    what: &str,
    timeout: Duration,
    call: impl Future<Output = Result<T, FetchError>>,
) -> Result<T, FetchError> {
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => Err(FetchError::network(format!(
            "{what} request timed out after {}s",
            timeout.as_secs_f32()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::{CityMatch, Coordinates, CurrentConditions, ForecastEntry},
        testing::{self, StubService, coords},
    };
    use async_trait::async_trait;

    fn at_utrecht() -> ResolvedLocation {
        ResolvedLocation { coordinates: coords(52.09, 5.12), name: None }
    }

    #[tokio::test]
    async fn forecast_is_truncated_to_six() {
        let fetcher = WeatherFetcher::new(Arc::new(StubService::new()));

        let report = fetcher.fetch_current_and_forecast(&at_utrecht()).await.unwrap();

        assert_eq!(report.forecast.len(), FORECAST_DISPLAY_COUNT);
        assert_eq!(report.forecast, testing::forecast(8)[..6].to_vec());
        assert_eq!(report.current.location_name, "Here");
    }

    #[tokio::test]
    async fn short_forecast_is_kept_as_is() {
        let stub = StubService::new().with_forecast(testing::forecast(2));
        let fetcher = WeatherFetcher::new(Arc::new(stub));

        let report = fetcher.fetch_current_and_forecast(&at_utrecht()).await.unwrap();
        assert_eq!(report.forecast.len(), 2);
    }

    #[tokio::test]
    async fn duplicate_timestamps_are_kept() {
        let dup = vec![
            ForecastEntry { timestamp: 1_700_000_000, temperature: 280.0, condition_main: "Rain".into() },
            ForecastEntry { timestamp: 1_700_000_000, temperature: 290.0, condition_main: "Clear".into() },
        ];
        let stub = StubService::new().with_forecast(dup.clone());
        let fetcher = WeatherFetcher::new(Arc::new(stub));

        let report = fetcher.fetch_current_and_forecast(&at_utrecht()).await.unwrap();
        assert_eq!(report.forecast, dup);
    }

    #[tokio::test]
    async fn either_failure_aborts_the_pair() {
        let upstream = FetchError::Upstream { status: 401, message: "Invalid API key".into() };

        let stub = StubService::new().failing_current(upstream.clone());
        let err = WeatherFetcher::new(Arc::new(stub))
            .fetch_current_and_forecast(&at_utrecht())
            .await
            .unwrap_err();
        assert_eq!(err, upstream);

        let stub = StubService::new().failing_forecast(FetchError::malformed("list missing"));
        let err = WeatherFetcher::new(Arc::new(stub))
            .fetch_current_and_forecast(&at_utrecht())
            .await
            .unwrap_err();
        assert_eq!(err, FetchError::malformed("list missing"));
    }

    /// Current conditions never arrive; the forecast fails immediately.
    #[derive(Debug)]
    struct HangingCurrent;

    #[async_trait]
    impl WeatherService for HangingCurrent {
        async fn current_by_coordinates(
            &self,
            _: Coordinates,
        ) -> Result<CurrentConditions, FetchError> {
            std::future::pending().await
        }

        async fn current_by_city(&self, _: &str) -> Result<CityMatch, FetchError> {
            std::future::pending().await
        }

        async fn forecast_by_coordinates(
            &self,
            _: Coordinates,
            _: usize,
        ) -> Result<Vec<ForecastEntry>, FetchError> {
            Err(FetchError::network("connection refused"))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn first_failure_does_not_wait_for_the_other_call() {
        let fetcher = WeatherFetcher::new(Arc::new(HangingCurrent));
        let started = tokio::time::Instant::now();

        let err = fetcher.fetch_current_and_forecast(&at_utrecht()).await.unwrap_err();

        assert_eq!(err, FetchError::network("connection refused"));
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    /// Both calls hang forever.
    #[derive(Debug)]
    struct Unresponsive;

    #[async_trait]
    impl WeatherService for Unresponsive {
        async fn current_by_coordinates(
            &self,
            _: Coordinates,
        ) -> Result<CurrentConditions, FetchError> {
            std::future::pending().await
        }

        async fn current_by_city(&self, _: &str) -> Result<CityMatch, FetchError> {
            std::future::pending().await
        }

        async fn forecast_by_coordinates(
            &self,
            _: Coordinates,
            _: usize,
        ) -> Result<Vec<ForecastEntry>, FetchError> {
            std::future::pending().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn hung_calls_time_out_as_network_errors() {
        let fetcher =
            WeatherFetcher::new(Arc::new(Unresponsive)).with_timeout(Duration::from_secs(10));

        let err = fetcher.fetch_current_and_forecast(&at_utrecht()).await.unwrap_err();

        match err {
            FetchError::Network(message) => assert!(message.contains("timed out")),
            other => panic!("expected network error, got {other:?}"),
        }
    }
}
