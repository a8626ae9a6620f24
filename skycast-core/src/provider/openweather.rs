use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, de::DeserializeOwned};
use std::time::Duration;
use tracing::debug;

use crate::{
    error::FetchError,
    model::{CityMatch, Coordinates, CurrentConditions, ForecastEntry},
};

use super::WeatherService;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// OpenWeatherMap-compatible HTTP client. No `units` parameter is sent, so
/// all temperatures come back in Kelvin.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    base_url: String,
    api_key: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(base_url: String, api_key: String, timeout: Duration) -> anyhow::Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            http,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<T, FetchError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!(%url, "requesting weather service");

        let res = self
            .http
            .get(&url)
            .query(query)
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| FetchError::network(format!("request to /{endpoint} failed: {e}")))?;

        let (status, body) = read_body(endpoint, res).await?;

        if !status.is_success() {
            return Err(FetchError::Upstream {
                status: status.as_u16(),
                message: truncate_body(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            FetchError::malformed(format!("unexpected /{endpoint} payload: {e}"))
        })
    }
}

async fn read_body(
    endpoint: &str,
    res: Response,
) -> Result<(reqwest::StatusCode, String), FetchError> {
    let status = res.status();
    let body = res
        .text()
        .await
        .map_err(|e| FetchError::network(format!("reading /{endpoint} body failed: {e}")))?;
    Ok((status, body))
}

fn coordinate_query(coordinates: Coordinates) -> Vec<(&'static str, String)> {
    vec![
        ("lat", coordinates.latitude().to_string()),
        ("lon", coordinates.longitude().to_string()),
    ]
}

#[derive(Debug, Deserialize)]
struct OwCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    country: Option<String>,
    #[serde(default)]
    sunrise: i64,
    #[serde(default)]
    sunset: i64,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    temp_min: f64,
    temp_max: f64,
    humidity: u8,
    pressure: u32,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
    #[serde(default)]
    deg: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    coord: Option<OwCoord>,
    #[serde(default)]
    name: String,
    sys: OwSys,
    main: OwMain,
    wind: OwWind,
    visibility: Option<u32>,
    #[serde(default)]
    weather: Vec<OwWeather>,
    #[serde(default)]
    timezone: i32,
}

#[derive(Debug, Deserialize)]
struct OwForecastMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwForecastMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

impl From<OwCurrentResponse> for CurrentConditions {
    fn from(parsed: OwCurrentResponse) -> Self {
        let (condition_main, condition_description) = parsed
            .weather
            .into_iter()
            .next()
            .map(|w| (w.main, w.description))
            .unwrap_or_else(|| ("Unknown".to_string(), "unknown".to_string()));

        CurrentConditions {
            location_name: parsed.name,
            country_code: parsed.sys.country,
            temperature: parsed.main.temp,
            feels_like: parsed.main.feels_like,
            temp_min: parsed.main.temp_min,
            temp_max: parsed.main.temp_max,
            humidity: parsed.main.humidity,
            pressure: parsed.main.pressure,
            wind_speed: parsed.wind.speed,
            wind_degrees: parsed.wind.deg,
            visibility: parsed.visibility,
            condition_main,
            condition_description,
            sunrise: parsed.sys.sunrise,
            sunset: parsed.sys.sunset,
            timezone_offset: parsed.timezone,
        }
    }
}

impl From<OwForecastEntry> for ForecastEntry {
    fn from(entry: OwForecastEntry) -> Self {
        let condition_main = entry
            .weather
            .into_iter()
            .next()
            .map(|w| w.main)
            .unwrap_or_else(|| "Unknown".to_string());

        ForecastEntry { timestamp: entry.dt, temperature: entry.main.temp, condition_main }
    }
}

#[async_trait]
impl WeatherService for OpenWeatherClient {
    async fn current_by_coordinates(
        &self,
        coordinates: Coordinates,
    ) -> Result<CurrentConditions, FetchError> {
        let parsed: OwCurrentResponse =
            self.get_json("weather", &coordinate_query(coordinates)).await?;
        Ok(parsed.into())
    }

    async fn current_by_city(&self, city: &str) -> Result<CityMatch, FetchError> {
        let parsed: OwCurrentResponse =
            self.get_json("weather", &[("q", city.to_string())]).await?;

        let coord = parsed
            .coord
            .as_ref()
            .ok_or_else(|| FetchError::malformed("city lookup response has no coord"))?;
        let coordinates = Coordinates::new(coord.lat, coord.lon)
            .map_err(|e| FetchError::malformed(e.to_string()))?;

        Ok(CityMatch { coordinates, conditions: parsed.into() })
    }

    async fn forecast_by_coordinates(
        &self,
        coordinates: Coordinates,
        count: usize,
    ) -> Result<Vec<ForecastEntry>, FetchError> {
        let mut query = coordinate_query(coordinates);
        query.push(("cnt", count.to_string()));

        let parsed: OwForecastResponse = self.get_json("forecast", &query).await?;
        Ok(parsed.list.into_iter().map(ForecastEntry::from).collect())
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
