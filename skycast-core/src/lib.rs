//! Core library for the `skycast` weather app.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The weather service seam and its OpenWeather client
//! - Location resolution and concurrent weather fetching
//! - The view state controller and the render-ready view model
//! - Pure presentation helpers (units, wind compass, theme)
//!
//! It is used by `skycast-cli`, but any other front-end can drive
//! [`ViewController`] the same way.

pub mod config;
pub mod controller;
pub mod error;
pub mod fetch;
pub mod location;
pub mod model;
pub mod provider;
pub mod theme;
pub mod units;
pub mod view;

#[cfg(test)]
mod testing;

pub use config::{Config, HomeLocation};
pub use controller::{ErrorInfo, ViewController, ViewState};
pub use error::{AcquisitionError, ErrorKind, FetchError, LocationError, RecoveryAction};
pub use fetch::WeatherFetcher;
pub use location::{DeniedPosition, FixedPosition, GeolocationProvider, LocationResolver};
pub use model::{
    CityMatch, Coordinates, CurrentConditions, ForecastEntry, LocationQuery, ResolvedLocation,
    WeatherReport,
};
pub use provider::{WeatherService, openweather::OpenWeatherClient, service_from_config};
pub use theme::{ThemeDescriptor, ThemeMode, select_theme};
pub use units::{TemperatureUnit, format_temperature, wind_direction};
pub use view::{Daypart, ViewBody, ViewModel};
