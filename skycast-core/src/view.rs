//! Render-ready strings derived from [`ViewState`]. Nothing here mutates state.

use chrono::{DateTime, FixedOffset, Offset, Timelike, Utc};
use serde::Serialize;

use crate::{
    controller::ViewState,
    error::{ErrorKind, RecoveryAction},
    model::{CurrentConditions, ForecastEntry, WeatherReport},
    theme::{ThemeDescriptor, select_theme},
    units::{TemperatureUnit, format_temperature, format_visibility, format_wind},
};

pub const IDLE_PROMPT: &str = "Allow location access or search for a city.";
pub const LOADING_MESSAGE: &str = "Loading weather data...";

/// Local hour (inclusive) at which the evening begins.
pub const EVENING_STARTS_AT: u32 = 18;
/// Local hour (exclusive) at which the evening ends.
pub const EVENING_ENDS_AT: u32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Daypart {
    Day,
    Evening,
}

impl Daypart {
    pub fn from_local_hour(hour: u32) -> Self {
        if hour >= EVENING_STARTS_AT || hour < EVENING_ENDS_AT {
            Daypart::Evening
        } else {
            Daypart::Day
        }
    }

    pub fn at(now: DateTime<Utc>, timezone_offset: i32) -> Self {
        Self::from_local_hour(local_time(now, timezone_offset).hour())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastRow {
    pub time: String,
    pub temperature: String,
    pub condition: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadyView {
    pub title: String,
    pub temperature: String,
    pub feels_like: String,
    pub low: String,
    pub high: String,
    pub description: String,
    pub humidity: String,
    pub pressure: String,
    pub wind: String,
    pub visibility: Option<String>,
    pub sunrise: String,
    pub sunset: String,
    pub daypart: Daypart,
    pub forecast: Vec<ForecastRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ViewBody {
    Idle { prompt: String },
    Loading { message: String },
    Error { kind: ErrorKind, message: String, action: RecoveryAction },
    Ready(ReadyView),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewModel {
    pub theme: ThemeDescriptor,
    pub unit: TemperatureUnit,
    pub body: ViewBody,
}

impl ViewModel {
    pub fn build(state: &ViewState, unit: TemperatureUnit, now: DateTime<Utc>) -> Self {
        let body = match state {
            ViewState::Idle => ViewBody::Idle { prompt: IDLE_PROMPT.to_string() },
            ViewState::Loading => ViewBody::Loading { message: LOADING_MESSAGE.to_string() },
            ViewState::Error(info) => ViewBody::Error {
                kind: info.kind,
                message: info.message.clone(),
                action: info.action,
            },
            ViewState::Ready(report) => ViewBody::Ready(ready_view(report, unit, now)),
        };

        Self { theme: select_theme(state.report().map(|r| &r.current)), unit, body }
    }
}

fn ready_view(report: &WeatherReport, unit: TemperatureUnit, now: DateTime<Utc>) -> ReadyView {
    let c: &CurrentConditions = &report.current;
    let tz = c.timezone_offset;

    ReadyView {
        title: report.location_label(),
        temperature: format_temperature(c.temperature, unit),
        feels_like: format_temperature(c.feels_like, unit),
        low: format_temperature(c.temp_min, unit),
        high: format_temperature(c.temp_max, unit),
        description: capitalize(&c.condition_description),
        humidity: format!("{}%", c.humidity),
        pressure: format!("{} hPa", c.pressure),
        wind: format_wind(c.wind_speed, c.wind_degrees),
        visibility: c.visibility.map(format_visibility),
        sunrise: clock(c.sunrise, tz),
        sunset: clock(c.sunset, tz),
        daypart: Daypart::at(now, tz),
        forecast: report.forecast.iter().map(|e| forecast_row(e, unit, tz)).collect(),
    }
}

fn forecast_row(entry: &ForecastEntry, unit: TemperatureUnit, tz: i32) -> ForecastRow {
    ForecastRow {
        time: clock(entry.timestamp, tz),
        temperature: format_temperature(entry.temperature, unit),
        condition: entry.condition_main.clone(),
    }
}

fn offset(timezone_offset: i32) -> FixedOffset {
    FixedOffset::east_opt(timezone_offset).unwrap_or_else(|| Utc.fix())
}

fn local_time(instant: DateTime<Utc>, timezone_offset: i32) -> DateTime<FixedOffset> {
    instant.with_timezone(&offset(timezone_offset))
}

/// `HH:MM` at the location; `--:--` for timestamps chrono cannot represent.
fn clock(epoch_seconds: i64, timezone_offset: i32) -> String {
    DateTime::from_timestamp(epoch_seconds, 0)
        .map(|t| local_time(t, timezone_offset).format("%H:%M").to_string())
        .unwrap_or_else(|| "--:--".to_string())
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        controller::ErrorInfo,
        model::ResolvedLocation,
        testing::{self, coords},
        theme::ThemeMode,
    };
    use chrono::TimeZone;

    fn noon_utc() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn report() -> WeatherReport {
        let mut current = testing::conditions("Amsterdam", 291.15);
        current.condition_description = "scattered clouds".into();
        current.sunrise = 1_717_210_800; // 2024-06-01 03:00 UTC
        current.sunset = 1_717_272_000; // 2024-06-01 20:00 UTC
        current.timezone_offset = 7200;
        WeatherReport {
            location: ResolvedLocation { coordinates: coords(52.37, 4.89), name: None },
            current,
            forecast: testing::forecast(6),
        }
    }

    #[test]
    fn idle_and_loading_have_neutral_theme() {
        let idle = ViewModel::build(&ViewState::Idle, TemperatureUnit::Celsius, noon_utc());
        assert_eq!(idle.theme.mode, ThemeMode::Neutral);
        assert!(matches!(idle.body, ViewBody::Idle { .. }));

        let loading = ViewModel::build(&ViewState::Loading, TemperatureUnit::Celsius, noon_utc());
        assert_eq!(loading.body, ViewBody::Loading { message: LOADING_MESSAGE.into() });
    }

    #[test]
    fn error_is_passed_through() {
        let info = ErrorInfo {
            kind: ErrorKind::NetworkError,
            message: "offline".into(),
            action: RecoveryAction::TryAgain,
        };
        let vm = ViewModel::build(&ViewState::Error(info), TemperatureUnit::Celsius, noon_utc());
        assert_eq!(
            vm.body,
            ViewBody::Error {
                kind: ErrorKind::NetworkError,
                message: "offline".into(),
                action: RecoveryAction::TryAgain,
            }
        );
    }

    #[test]
    fn ready_view_formats_everything_in_local_time() {
        let state = ViewState::Ready(Box::new(report()));
        let vm = ViewModel::build(&state, TemperatureUnit::Celsius, noon_utc());

        assert_eq!(vm.theme.mode, ThemeMode::Warm);
        let ViewBody::Ready(view) = vm.body else { panic!("expected ready view") };
        assert_eq!(view.title, "Amsterdam, NL");
        assert_eq!(view.temperature, "18°C");
        assert_eq!(view.description, "Scattered clouds");
        assert_eq!(view.humidity, "65%");
        assert_eq!(view.pressure, "1015 hPa");
        assert_eq!(view.wind, "3.6 m/s E");
        assert_eq!(view.visibility.as_deref(), Some("10.0 km"));
        assert_eq!(view.sunrise, "05:00");
        assert_eq!(view.sunset, "22:00");
        assert_eq!(view.daypart, Daypart::Day);
        assert_eq!(view.forecast.len(), 6);
    }

    #[test]
    fn unit_changes_only_the_strings() {
        let state = ViewState::Ready(Box::new(report()));
        let vm = ViewModel::build(&state, TemperatureUnit::Fahrenheit, noon_utc());

        assert_eq!(vm.theme.mode, ThemeMode::Warm);
        let ViewBody::Ready(view) = vm.body else { panic!("expected ready view") };
        assert_eq!(view.temperature, "64°F");
        assert!(view.forecast.iter().all(|row| row.temperature.ends_with("°F")));
    }

    #[test]
    fn duplicate_forecast_timestamps_render_both_rows() {
        let mut report = report();
        report.forecast = vec![
            ForecastEntry { timestamp: 1_717_243_200, temperature: 280.0, condition_main: "Rain".into() },
            ForecastEntry { timestamp: 1_717_243_200, temperature: 290.0, condition_main: "Clear".into() },
        ];
        let vm = ViewModel::build(
            &ViewState::Ready(Box::new(report)),
            TemperatureUnit::Celsius,
            noon_utc(),
        );

        let ViewBody::Ready(view) = vm.body else { panic!("expected ready view") };
        assert_eq!(view.forecast.len(), 2);
        assert_eq!(view.forecast[0].time, view.forecast[1].time);
        assert_ne!(view.forecast[0].temperature, view.forecast[1].temperature);
    }

    #[test]
    fn evening_uses_location_clock() {
        assert_eq!(Daypart::from_local_hour(17), Daypart::Day);
        assert_eq!(Daypart::from_local_hour(18), Daypart::Evening);
        assert_eq!(Daypart::from_local_hour(5), Daypart::Evening);
        assert_eq!(Daypart::from_local_hour(6), Daypart::Day);

        // 16:30 UTC is 18:30 at UTC+2.
        let late = Utc.with_ymd_and_hms(2024, 6, 1, 16, 30, 0).unwrap();
        assert_eq!(Daypart::at(late, 7200), Daypart::Evening);
        assert_eq!(Daypart::at(late, 0), Daypart::Day);
    }

    #[test]
    fn missing_name_falls_back_to_coordinates() {
        let mut report = report();
        report.current.location_name = String::new();
        assert_eq!(report.location_label(), "52.3700, 4.8900");
    }
}
