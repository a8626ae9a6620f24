use serde::{Deserialize, Serialize};

use crate::error::LocationError;

/// A point on Earth in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinates")]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

/// Unchecked wire form; deserialization goes through [`Coordinates::new`].
#[derive(Deserialize)]
struct RawCoordinates {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawCoordinates> for Coordinates {
    type Error = LocationError;

    fn try_from(raw: RawCoordinates) -> Result<Self, Self::Error> {
        Coordinates::new(raw.latitude, raw.longitude)
    }
}

impl Coordinates {
    /// Validates that latitude is within [-90, 90] and longitude within [-180, 180].
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, LocationError> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);

        if !valid {
            return Err(LocationError::InvalidCoordinates { latitude, longitude });
        }

        Ok(Self { latitude, longitude })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// What the user asked for: their own position, or a city by name.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    Coordinates(Coordinates),
    City(String),
}

/// Canonical location used for every weather request after resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLocation {
    pub coordinates: Coordinates,
    /// `None` on the coordinate path; the weather response supplies the name.
    pub name: Option<String>,
}

/// Current conditions as received. Temperatures are in Kelvin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub location_name: String,
    pub country_code: Option<String>,
    pub temperature: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub humidity: u8,
    pub pressure: u32,
    pub wind_speed: f64,
    pub wind_degrees: f64,
    pub visibility: Option<u32>,
    pub condition_main: String,
    pub condition_description: String,
    pub sunrise: i64,
    pub sunset: i64,
    /// Seconds east of UTC at the location.
    pub timezone_offset: i32,
}

/// One step of the short-term forecast. Temperature in Kelvin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub timestamp: i64,
    pub temperature: f64,
    pub condition_main: String,
}

/// Result of a successful city lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct CityMatch {
    pub coordinates: Coordinates,
    pub conditions: CurrentConditions,
}

/// Everything the `Ready` state shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub location: ResolvedLocation,
    pub current: CurrentConditions,
    pub forecast: Vec<ForecastEntry>,
}

impl WeatherReport {
    /// Display name, preferring the resolved name over the one in the payload.
    pub fn location_label(&self) -> String {
        let name = self.location.name.as_deref().unwrap_or(&self.current.location_name);
        match self.current.country_code.as_deref() {
            Some(cc) if !cc.is_empty() && !name.is_empty() => format!("{name}, {cc}"),
            _ if name.is_empty() => self.location.coordinates.to_string(),
            _ => name.to_string(),
        }
    }
}
