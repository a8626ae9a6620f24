//! Presentation-time unit conversion. Stored values stay in Kelvin / SI units.

use serde::{Deserialize, Serialize};

pub const KELVIN_OFFSET: f64 = 273.15;

const COMPASS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn symbol(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "°C",
            TemperatureUnit::Fahrenheit => "°F",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            TemperatureUnit::Celsius => TemperatureUnit::Fahrenheit,
            TemperatureUnit::Fahrenheit => TemperatureUnit::Celsius,
        }
    }
}

impl std::str::FromStr for TemperatureUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "c" | "celsius" => Ok(TemperatureUnit::Celsius),
            "f" | "fahrenheit" => Ok(TemperatureUnit::Fahrenheit),
            other => Err(format!("Unknown unit '{other}'. Use 'celsius' or 'fahrenheit'.")),
        }
    }
}

impl std::fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            TemperatureUnit::Celsius => "celsius",
            TemperatureUnit::Fahrenheit => "fahrenheit",
        })
    }
}

pub fn kelvin_to_celsius(kelvin: f64) -> f64 {
    kelvin - KELVIN_OFFSET
}

pub fn kelvin_to_fahrenheit(kelvin: f64) -> f64 {
    kelvin_to_celsius(kelvin) * 9.0 / 5.0 + 32.0
}

/// Whole degrees, rounded half away from zero: `291.15` → `"18°C"`.
pub fn format_temperature(kelvin: f64, unit: TemperatureUnit) -> String {
    let value = match unit {
        TemperatureUnit::Celsius => kelvin_to_celsius(kelvin),
        TemperatureUnit::Fahrenheit => kelvin_to_fahrenheit(kelvin),
    };
    format!("{}{}", round_whole(value), unit.symbol())
}

fn round_whole(value: f64) -> i64 {
    // `as` saturates, and -0.0 becomes 0
    value.round() as i64
}

/// Compass point for a meteorological wind direction.
pub fn wind_direction(degrees: f64) -> &'static str {
    if !degrees.is_finite() {
        return COMPASS[0];
    }
    let normalized = degrees.rem_euclid(360.0);
    let index = (normalized / 45.0).round() as usize % COMPASS.len();
    COMPASS[index]
}

pub fn format_wind(speed_mps: f64, degrees: f64) -> String {
    format!("{speed_mps:.1} m/s {}", wind_direction(degrees))
}

pub fn format_visibility(meters: u32) -> String {
    if meters >= 1000 {
        format!("{:.1} km", f64::from(meters) / 1000.0)
    } else {
        format!("{meters} m")
    }
}
