//! Application flows and the explicit dashboard state.
//!
//! [`Dashboard`] turns user intents (locate me, pick a capital, search) into
//! [`Update`]s. [`AppState`] owns what is currently on screen and only accepts
//! an update carrying the most recently issued [`Ticket`], so a slow response
//! to an older request can never replace a newer one.

use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    capitals::{self, Capital},
    config::Config,
    device::{DeviceError, DeviceLocator, DevicePosition},
    error::FetchError,
    geo::{self, GeoPoint, RefinedLocation},
    geocode::{Geocoder, Place},
    iplocate::{IpLocation, IpLocator},
    model::{TemperatureUnit, Theme, WeatherRequest, WeatherSnapshot},
    provider::WeatherService,
    render::{self, DashboardView, ViewOptions},
    zone::Zone,
};

pub const GPS_LOCATION: &str = "GPS Location";

const GENERAL_NOTICE: Duration = Duration::from_secs(5);
const LOCATION_NOTICE: Duration = Duration::from_secs(8);

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("Could not detect your location automatically")]
    Undetected,

    #[error(transparent)]
    Device(#[from] DeviceError),

    #[error("Location \"{0}\" not found")]
    NotFound(String),

    #[error("Please enter a location")]
    EmptyQuery,

    #[error("Location search failed: {0}")]
    Geocoding(#[from] FetchError),
}

impl DashboardError {
    /// Banner to show for this failure.
    pub fn notice(&self, now: DateTime<Utc>) -> Notice {
        match self {
            DashboardError::Undetected => Notice::location(
                self.to_string(),
                Some("Please search for a city manually.".into()),
                now,
            ),
            DashboardError::Device(e) => Notice::location(
                e.user_message().to_string(),
                Some(e.suggestion().to_string()),
                now,
            ),
            DashboardError::NotFound(_) => Notice::general(
                format!("{self}. Please check the spelling and try again."),
                now,
            ),
            DashboardError::EmptyQuery | DashboardError::Geocoding(_) => {
                Notice::general(self.to_string(), now)
            }
        }
    }
}

/// A transient banner.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub message: String,
    pub suggestion: Option<String>,
    pub raised_at: DateTime<Utc>,
    pub auto_hide: Duration,
}

impl Notice {
    pub fn general(message: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            message: message.into(),
            suggestion: None,
            raised_at: now,
            auto_hide: GENERAL_NOTICE,
        }
    }

    pub fn location(message: impl Into<String>, suggestion: Option<String>, now: DateTime<Utc>) -> Self {
        Self {
            message: message.into(),
            suggestion,
            raised_at: now,
            auto_hide: LOCATION_NOTICE,
        }
    }

    pub fn is_visible(&self, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.raised_at)
            .to_std()
            .ok()
            .is_none_or(|age| age < self.auto_hide)
    }
}

/// How the location of an [`Update`] was obtained.
#[derive(Debug, Clone, PartialEq)]
pub enum Origin {
    Ip(IpLocation),
    Device(DevicePosition),
    Capital,
    Search(Place),
    Coordinates,
}

/// A finished request, ready to be applied to [`AppState`].
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    pub origin: Origin,
    pub snapshot: WeatherSnapshot,
    /// Capital the location was refined to, or that a search name matched.
    pub capital: Option<RefinedLocation>,
}

impl Update {
    /// One-line description of where the weather is for.
    pub fn summary(&self) -> String {
        match (&self.origin, &self.capital) {
            (Origin::Ip(ip), Some(refined)) => format!(
                "📍 {} ({} km from detected {})",
                refined.capital.display_name(),
                refined.rounded_km(),
                ip.city
            ),
            (Origin::Device(fix), Some(refined)) => format!(
                "📍 {} ({} km away, {})",
                refined.capital.display_name(),
                refined.rounded_km(),
                fix.accuracy_level().label().to_lowercase()
            ),
            (Origin::Device(fix), None) => format!(
                "📍 {} ({}, ±{} m)",
                GPS_LOCATION,
                fix.point,
                fix.accuracy_m.round()
            ),
            (Origin::Ip(ip), None) => format!("🌐 {}", ip.display_name()),
            (Origin::Capital, _) => format!("🏛️ {}", self.snapshot.location_name),
            (Origin::Search(place), _) => format!("🔎 {}", place.display_name()),
            (Origin::Coordinates, _) => format!("📌 {}", self.snapshot.location_name),
        }
    }
}

#[derive(Debug)]
pub struct Dashboard {
    weather: WeatherService,
    geocoder: Geocoder,
    ip: IpLocator,
}

impl Dashboard {
    pub fn new(weather: WeatherService, geocoder: Geocoder, ip: IpLocator) -> Self {
        Self {
            weather,
            geocoder,
            ip,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            WeatherService::from_config(config),
            Geocoder::from_config(config),
            IpLocator::from_endpoints(&config.endpoints),
        )
    }

    pub fn geocoder(&self) -> &Geocoder {
        &self.geocoder
    }

    /// `false` when every fetch will serve sample data.
    pub fn is_weather_configured(&self) -> bool {
        self.weather.is_configured()
    }

    /// Weather for a located point: the nearest capital when one is in range,
    /// otherwise the point itself under `fallback_name`.
    async fn refined(&self, origin: Origin, point: GeoPoint, fallback_name: String) -> Update {
        match geo::refine(point) {
            Some(refined) => {
                info!(
                    "Refined {point} to {} ({} km)",
                    refined.capital.name,
                    refined.rounded_km()
                );
                let snapshot = self
                    .weather
                    .fetch(&WeatherRequest::for_capital(&refined.capital))
                    .await;
                Update {
                    origin,
                    snapshot,
                    capital: Some(refined),
                }
            }
            None => {
                let snapshot = self
                    .weather
                    .fetch(&WeatherRequest::named(point, fallback_name))
                    .await;
                Update {
                    origin,
                    snapshot,
                    capital: None,
                }
            }
        }
    }

    pub async fn locate_by_ip(&self) -> Result<Update, DashboardError> {
        let location = self.ip.detect().await.ok_or(DashboardError::Undetected)?;
        let point = location.point;
        let name = location.display_name();
        Ok(self.refined(Origin::Ip(location), point, name).await)
    }

    pub async fn locate_by_device(&self, locator: &DeviceLocator) -> Result<Update, DashboardError> {
        let fix = locator.locate().await?;
        Ok(self
            .refined(Origin::Device(fix), fix.point, GPS_LOCATION.to_string())
            .await)
    }

    pub async fn select_capital(&self, capital: &Capital) -> Update {
        debug!("Capital selected: {}", capital.label());
        let snapshot = self.weather.fetch(&WeatherRequest::for_capital(capital)).await;
        Update {
            origin: Origin::Capital,
            snapshot,
            capital: Some(RefinedLocation {
                capital: *capital,
                distance_km: 0.0,
            }),
        }
    }

    /// Weather for a geocoding suggestion.
    pub async fn select_place(&self, place: &Place) -> Update {
        let snapshot = self
            .weather
            .fetch(&WeatherRequest::named(place.point, place.display_name()))
            .await;
        let capital = capitals::find(&place.name).map(|c| RefinedLocation {
            capital: *c,
            distance_km: geo::haversine_km(place.point, c.point()),
        });
        Update {
            origin: Origin::Search(place.clone()),
            snapshot,
            capital,
        }
    }

    /// Free-text search: geocode, then fetch. A capital name still resolves
    /// when geocoding is unavailable.
    pub async fn search(&self, query: &str) -> Result<Update, DashboardError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(DashboardError::EmptyQuery);
        }

        let resolved = self.geocoder.resolve(query).await;
        match resolved {
            Ok(Some(place)) => Ok(self.select_place(&place).await),
            Ok(None) => match capitals::find(query) {
                Some(capital) => Ok(self.select_capital(capital).await),
                None => Err(DashboardError::NotFound(query.to_string())),
            },
            Err(e) => match capitals::find(query) {
                Some(capital) => {
                    debug!("Geocoding failed ({e}); using capital table for '{query}'");
                    Ok(self.select_capital(capital).await)
                }
                None => Err(e.into()),
            },
        }
    }

    /// Weather at raw coordinates, refined when near a capital.
    pub async fn weather_at(&self, point: GeoPoint, name: Option<String>) -> Update {
        let name = name.unwrap_or_else(|| point.to_string());
        self.refined(Origin::Coordinates, point, name).await
    }
}

/// Proof that a request was issued; only the latest one may be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub unit: TemperatureUnit,
    pub theme: Theme,
    current: Option<Update>,
    notices: Vec<Notice>,
    issued: u64,
}

impl AppState {
    pub fn new(unit: TemperatureUnit, theme: Theme) -> Self {
        Self {
            unit,
            theme,
            ..Self::default()
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.unit, config.theme)
    }

    /// Start a new request; every earlier ticket becomes stale.
    pub fn issue(&mut self) -> Ticket {
        self.issued += 1;
        Ticket(self.issued)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.issued
    }

    /// Apply a finished request. Returns `false` and changes nothing when stale.
    pub fn apply(&mut self, ticket: Ticket, update: Update) -> bool {
        if !self.is_current(ticket) {
            debug!(
                "Discarding stale update #{} for {} (latest is #{})",
                ticket.0, update.snapshot.location_name, self.issued
            );
            return false;
        }
        self.current = Some(update);
        true
    }

    /// Record a failed request as a banner. Stale failures are dropped.
    pub fn fail(&mut self, ticket: Ticket, error: &DashboardError, now: DateTime<Utc>) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.notify(error.notice(now));
        true
    }

    pub fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    /// Banners still visible at `now`; expired ones are dropped.
    pub fn notices(&mut self, now: DateTime<Utc>) -> &[Notice] {
        self.notices.retain(|n| n.is_visible(now));
        &self.notices
    }

    pub fn current(&self) -> Option<&Update> {
        self.current.as_ref()
    }

    pub fn snapshot(&self) -> Option<&WeatherSnapshot> {
        self.current.as_ref().map(|u| &u.snapshot)
    }

    pub fn selected_capital(&self) -> Option<&Capital> {
        self.current
            .as_ref()
            .and_then(|u| u.capital.as_ref())
            .map(|r| &r.capital)
    }

    pub fn view(&self, viewer_zone: Zone) -> Option<DashboardView> {
        let options = ViewOptions {
            unit: self.unit,
            viewer_zone,
        };
        self.snapshot().map(|s| render::render(s, &options))
    }
}
