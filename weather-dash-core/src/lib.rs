//! Core library for the `weather-dash` dashboard.
//!
//! This crate defines:
//! - The provincial capital table and the nearest-capital matcher
//! - Location acquisition (IP lookup, device position)
//! - Weather retrieval with a one-call → basic → sample fallback chain
//! - Pure rendering of a snapshot into text widgets
//! - The autocomplete search box and the explicit dashboard state
//!
//! It is used by `weather-dash-cli`, but can also back other front ends.

pub mod autocomplete;
pub mod capitals;
pub mod config;
pub mod dashboard;
pub mod device;
pub mod error;
pub mod fallback;
pub mod geo;
pub mod geocode;
mod http;
pub mod iplocate;
pub mod lookup;
pub mod model;
pub mod provider;
pub mod render;
pub mod zone;

pub use capitals::{CAPITALS, Capital};
pub use config::{Config, DeviceConfig, Endpoints};
pub use dashboard::{AppState, Dashboard, DashboardError, Notice, Update};
pub use error::FetchError;
pub use geo::{GeoPoint, RefinedLocation, nearest_capital};
pub use model::{Provenance, TemperatureUnit, Theme, WeatherRequest, WeatherSnapshot};
pub use provider::WeatherService;
pub use zone::Zone;
