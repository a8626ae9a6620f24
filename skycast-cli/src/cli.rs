use std::sync::Arc;

use anyhow::{Context, anyhow};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use inquire::{Confirm, CustomType, InquireError, Password, Select, Text};
use skycast_core::{
    Config, Coordinates, DeniedPosition, FixedPosition, GeolocationProvider, HomeLocation,
    TemperatureUnit, ViewBody, ViewController, service_from_config,
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skycast", version, about = "Current weather and a short forecast")]
pub struct Cli {
    /// Print debug logs to stderr (RUST_LOG takes precedence).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the API key, preferred unit and home location.
    Configure,

    /// Show weather for a city, or for your location when no city is given.
    Show {
        /// City name, e.g. "Amsterdam" or "Paris,FR".
        city: Option<String>,

        #[command(flatten)]
        location: LocationArgs,
    },

    /// Search repeatedly; `:u` toggles the unit, `:l` uses your location.
    Interactive {
        #[command(flatten)]
        location: LocationArgs,
    },
}

#[derive(Debug, Args)]
pub struct LocationArgs {
    /// Latitude to use as your location.
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    pub lat: Option<f64>,

    /// Longitude to use as your location.
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    pub lon: Option<f64>,

    /// Temperature unit: celsius or fahrenheit.
    #[arg(long)]
    pub unit: Option<TemperatureUnit>,

    /// Refuse location access; only searches work.
    #[arg(long)]
    pub no_locate: bool,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { city, location } => show(city, &location).await,
            Command::Interactive { location } => interactive(&location).await,
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut cfg = Config::load_from_disk()?;

    let api_key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .with_help_message("Get one at https://openweathermap.org/api")
        .prompt()?;
    if !api_key.trim().is_empty() {
        cfg.api_key = Some(api_key.trim().to_string());
    }

    let units = vec![TemperatureUnit::Celsius, TemperatureUnit::Fahrenheit];
    let start = units.iter().position(|u| *u == cfg.unit()).unwrap_or(0);
    cfg.unit = Some(Select::new("Temperature unit:", units).with_starting_cursor(start).prompt()?);

    if Confirm::new("Set a home location for `skycast show` without a city?")
        .with_default(cfg.home.is_some())
        .prompt()?
    {
        let latitude = CustomType::<f64>::new("Latitude:")
            .with_error_message("Enter a number between -90 and 90")
            .prompt()?;
        let longitude = CustomType::<f64>::new("Longitude:")
            .with_error_message("Enter a number between -180 and 180")
            .prompt()?;
        let home = HomeLocation { latitude, longitude };
        home.coordinates()?;
        cfg.home = Some(home);
    } else {
        cfg.home = None;
    }

    cfg.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

fn controller(location: &LocationArgs) -> anyhow::Result<ViewController> {
    let cfg = Config::load()?;
    let service = service_from_config(&cfg)?;
    let geolocation = geolocation(location, &cfg)?;
    let unit = location.unit.unwrap_or_else(|| cfg.unit());
    tracing::debug!(base_url = cfg.base_url(), %unit, "configuration loaded");

    Ok(ViewController::new(service, geolocation)
        .with_timeout(cfg.request_timeout())
        .with_unit(unit))
}

fn geolocation(
    location: &LocationArgs,
    cfg: &Config,
) -> anyhow::Result<Arc<dyn GeolocationProvider>> {
    if location.no_locate {
        return Ok(Arc::new(DeniedPosition));
    }

    let coordinates = match (location.lat, location.lon) {
        (Some(lat), Some(lon)) => {
            Some(Coordinates::new(lat, lon).context("Invalid --lat/--lon")?)
        }
        _ => cfg.home_coordinates()?,
    };

    Ok(Arc::new(FixedPosition::new(coordinates)))
}

async fn show(city: Option<String>, location: &LocationArgs) -> anyhow::Result<()> {
    let controller = controller(location)?;

    match city {
        Some(city) => controller.search(&city).await,
        None => controller.locate().await,
    };

    let vm = controller.view_model(Utc::now());
    let text = render::render(&vm);

    if matches!(vm.body, ViewBody::Error { .. }) {
        return Err(anyhow!(text.trim_end().to_string()));
    }

    print!("{text}");
    Ok(())
}

async fn interactive(location: &LocationArgs) -> anyhow::Result<()> {
    let controller = controller(location)?;

    controller.locate().await;
    print!("{}", render::render(&controller.view_model(Utc::now())));

    loop {
        let input = match Text::new("City:")
            .with_help_message(":u toggle unit, :l use my location, empty line to quit")
            .prompt()
        {
            Ok(input) => input,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e.into()),
        };

        match input.trim() {
            "" => break,
            ":u" => {
                controller.toggle_unit();
            }
            ":l" => {
                controller.locate().await;
            }
            city => {
                controller.search(city).await;
            }
        }

        println!();
        print!("{}", render::render(&controller.view_model(Utc::now())));
    }

    Ok(())
}
