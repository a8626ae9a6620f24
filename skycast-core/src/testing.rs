//! In-memory [`WeatherService`] for unit tests.

use async_trait::async_trait;
use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};
use tokio::sync::Notify;

use crate::{
    error::FetchError,
    model::{CityMatch, Coordinates, CurrentConditions, ForecastEntry},
    provider::WeatherService,
};

pub(crate) fn conditions(name: &str, kelvin: f64) -> CurrentConditions {
    CurrentConditions {
        location_name: name.to_string(),
        country_code: Some("NL".into()),
        temperature: kelvin,
        feels_like: kelvin - 1.0,
        temp_min: kelvin - 2.0,
        temp_max: kelvin + 2.0,
        humidity: 65,
        pressure: 1015,
        wind_speed: 3.6,
        wind_degrees: 90.0,
        visibility: Some(10_000),
        condition_main: "Clear".into(),
        condition_description: "clear sky".into(),
        sunrise: 1_700_000_000,
        sunset: 1_700_030_000,
        timezone_offset: 0,
    }
}

pub(crate) fn forecast(len: usize) -> Vec<ForecastEntry> {
    (0..len)
        .map(|i| ForecastEntry {
            timestamp: 1_700_000_000 + i as i64 * 3 * 3600,
            temperature: 285.0 + i as f64,
            condition_main: "Clouds".into(),
        })
        .collect()
}

pub(crate) fn coords(latitude: f64, longitude: f64) -> Coordinates {
    Coordinates::new(latitude, longitude).unwrap()
}

#[derive(Debug)]
struct City {
    coordinates: Coordinates,
    kelvin: f64,
}

/// Cities are matched case-insensitively. Current conditions for a known
/// city's coordinates carry that city's name; anything else is "Here".
#[derive(Debug, Default)]
pub(crate) struct StubService {
    cities: HashMap<String, City>,
    gates: HashMap<String, Arc<Notify>>,
    forecast: Vec<ForecastEntry>,
    current_error: Option<FetchError>,
    forecast_error: Option<FetchError>,
    city_lookups: AtomicUsize,
    current_calls: AtomicUsize,
    forecast_calls: AtomicUsize,
}

impl StubService {
    pub fn new() -> Self {
        Self { forecast: forecast(8), ..Self::default() }
    }

    pub fn with_city(mut self, name: &str, coordinates: Coordinates, kelvin: f64) -> Self {
        self.cities.insert(name.to_lowercase(), City { coordinates, kelvin });
        self
    }

    /// City lookups for `name` block until the returned handle is notified.
    pub fn gate_city(&mut self, name: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates.insert(name.to_lowercase(), gate.clone());
        gate
    }

    pub fn with_forecast(mut self, forecast: Vec<ForecastEntry>) -> Self {
        self.forecast = forecast;
        self
    }

    pub fn failing_current(mut self, err: FetchError) -> Self {
        self.current_error = Some(err);
        self
    }

    pub fn failing_forecast(mut self, err: FetchError) -> Self {
        self.forecast_error = Some(err);
        self
    }

    pub fn network_calls(&self) -> usize {
        self.city_lookups.load(Ordering::SeqCst)
            + self.current_calls.load(Ordering::SeqCst)
            + self.forecast_calls.load(Ordering::SeqCst)
    }

    fn city_at(&self, coordinates: Coordinates) -> Option<(&str, &City)> {
        self.cities
            .iter()
            .find(|(_, c)| c.coordinates == coordinates)
            .map(|(name, c)| (name.as_str(), c))
    }
}

#[async_trait]
impl WeatherService for StubService {
    async fn current_by_coordinates(
        &self,
        coordinates: Coordinates,
    ) -> Result<CurrentConditions, FetchError> {
        self.current_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = &self.current_error {
            return Err(err.clone());
        }
        Ok(match self.city_at(coordinates) {
            Some((name, city)) => conditions(name, city.kelvin),
            None => conditions("Here", 290.0),
        })
    }

    async fn current_by_city(&self, city: &str) -> Result<CityMatch, FetchError> {
        self.city_lookups.fetch_add(1, Ordering::SeqCst);
        let key = city.to_lowercase();
        if let Some(gate) = self.gates.get(&key) {
            gate.notified().await;
        }
        match self.cities.get(&key) {
            Some(found) => Ok(CityMatch {
                coordinates: found.coordinates,
                conditions: conditions(&key, found.kelvin),
            }),
            None => Err(FetchError::Upstream {
                status: 404,
                message: r#"{"cod":"404","message":"city not found"}"#.into(),
            }),
        }
    }

    async fn forecast_by_coordinates(
        &self,
        _coordinates: Coordinates,
        count: usize,
    ) -> Result<Vec<ForecastEntry>, FetchError> {
        self.forecast_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = &self.forecast_error {
            return Err(err.clone());
        }
        Ok(self.forecast.iter().take(count).cloned().collect())
    }
}
