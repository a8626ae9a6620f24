//! Owner of [`ViewState`]: runs acquisitions and decides which result is shown.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{
    error::{AcquisitionError, ErrorKind, RecoveryAction},
    fetch::WeatherFetcher,
    location::{GeolocationProvider, LocationResolver},
    model::{LocationQuery, WeatherReport},
    provider::WeatherService,
    theme::{ThemeDescriptor, select_theme},
    units::TemperatureUnit,
    view::ViewModel,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    pub message: String,
    pub action: RecoveryAction,
}

impl From<&AcquisitionError> for ErrorInfo {
    fn from(err: &AcquisitionError) -> Self {
        let kind = err.kind();
        Self { kind, message: err.user_message(), action: kind.recovery_action() }
    }
}

/// What the presentation layer should currently display.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ViewState {
    #[default]
    Idle,
    Loading,
    Error(ErrorInfo),
    Ready(Box<WeatherReport>),
}

impl ViewState {
    pub fn name(&self) -> &'static str {
        match self {
            ViewState::Idle => "idle",
            ViewState::Loading => "loading",
            ViewState::Error(_) => "error",
            ViewState::Ready(_) => "ready",
        }
    }

    pub fn report(&self) -> Option<&WeatherReport> {
        match self {
            ViewState::Ready(report) => Some(report.as_ref()),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ErrorInfo> {
        match self {
            ViewState::Error(info) => Some(info),
            _ => None,
        }
    }
}

/// Drives Location Resolver → Weather Fetcher and is the only writer of
/// [`ViewState`].
///
/// Every trigger (`locate`, `search`, `load`) takes a fresh generation number.
/// A finished acquisition is applied only while its generation is still the
/// latest, so a slow earlier request can never overwrite a newer one.
/// Generation bumps and checks happen inside the watch channel's write lock.
#[derive(Debug)]
pub struct ViewController {
    resolver: LocationResolver,
    fetcher: WeatherFetcher,
    geolocation: Arc<dyn GeolocationProvider>,
    state: watch::Sender<ViewState>,
    unit: watch::Sender<TemperatureUnit>,
    generation: AtomicU64,
}

impl ViewController {
    pub fn new(
        service: Arc<dyn WeatherService>,
        geolocation: Arc<dyn GeolocationProvider>,
    ) -> Self {
        let (state, _) = watch::channel(ViewState::Idle);
        let (unit, _) = watch::channel(TemperatureUnit::default());

        Self {
            resolver: LocationResolver::new(service.clone()),
            fetcher: WeatherFetcher::new(service),
            geolocation,
            state,
            unit,
            generation: AtomicU64::new(0),
        }
    }

    /// Per-call bound for the city lookup and both weather requests.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.resolver = self.resolver.with_timeout(timeout);
        self.fetcher = self.fetcher.with_timeout(timeout);
        self
    }

    pub fn with_unit(self, unit: TemperatureUnit) -> Self {
        self.unit.send_replace(unit);
        self
    }

    pub fn state(&self) -> ViewState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.state.subscribe()
    }

    pub fn unit(&self) -> TemperatureUnit {
        *self.unit.borrow()
    }

    pub fn subscribe_unit(&self) -> watch::Receiver<TemperatureUnit> {
        self.unit.subscribe()
    }

    pub fn set_unit(&self, unit: TemperatureUnit) {
        self.unit.send_if_modified(|current| {
            let changed = *current != unit;
            *current = unit;
            changed
        });
    }

    pub fn toggle_unit(&self) -> TemperatureUnit {
        let mut toggled = TemperatureUnit::default();
        self.unit.send_modify(|current| {
            *current = current.toggled();
            toggled = *current;
        });
        debug!(unit = %toggled, "temperature unit toggled");
        toggled
    }

    pub fn theme(&self) -> ThemeDescriptor {
        select_theme(self.state.borrow().report().map(|r| &r.current))
    }

    pub fn view_model(&self, now: DateTime<Utc>) -> ViewModel {
        ViewModel::build(&self.state.borrow(), self.unit(), now)
    }

    /// Use the device position. A denied or unsupported position goes
    /// straight to `Error`; `Loading` starts only once coordinates exist.
    pub async fn locate(&self) -> ViewState {
        let generation = self.next_generation();
        debug!(generation, "requesting device position");

        match self.geolocation.current_position().await {
            Ok(coordinates) => self.run(generation, LocationQuery::Coordinates(coordinates)).await,
            Err(e) => {
                warn!(generation, error = %e, "device position unavailable");
                self.apply(generation, Err(e.into()));
                self.state()
            }
        }
    }

    pub async fn search(&self, city: &str) -> ViewState {
        self.load(LocationQuery::City(city.to_string())).await
    }

    pub async fn load(&self, query: LocationQuery) -> ViewState {
        let generation = self.next_generation();
        self.run(generation, query).await
    }

    async fn run(&self, generation: u64, query: LocationQuery) -> ViewState {
        self.enter_loading(generation);

        let outcome = self.acquire(query).await;
        self.apply(generation, outcome);
        self.state()
    }

    async fn acquire(&self, query: LocationQuery) -> Result<WeatherReport, AcquisitionError> {
        let location = self.resolver.resolve(query).await?;
        Ok(self.fetcher.fetch_current_and_forecast(&location).await?)
    }

    fn next_generation(&self) -> u64 {
        let mut generation = 0;
        self.state.send_if_modified(|_| {
            generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            false
        });
        generation
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    fn enter_loading(&self, generation: u64) {
        self.state.send_if_modified(|state| {
            if !self.is_current(generation) {
                return false;
            }
            info!(generation, from = state.name(), "loading weather");
            *state = ViewState::Loading;
            true
        });
    }

    fn apply(&self, generation: u64, outcome: Result<WeatherReport, AcquisitionError>) -> bool {
        self.state.send_if_modified(|state| {
            if !self.is_current(generation) {
                debug!(
                    generation,
                    latest = self.generation.load(Ordering::SeqCst),
                    "dropping stale acquisition result"
                );
                return false;
            }

            *state = match outcome {
                Ok(report) => {
                    info!(generation, location = %report.location_label(), "weather ready");
                    ViewState::Ready(Box::new(report))
                }
                Err(e) => {
                    warn!(generation, kind = ?e.kind(), error = %e, "acquisition failed");
                    ViewState::Error(ErrorInfo::from(&e))
                }
            };
            true
        })
    }
}
