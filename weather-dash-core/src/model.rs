use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{capitals::Capital, geo::GeoPoint, zone::Zone};

/// What to fetch weather for.
#[derive(Debug, Clone)]
pub struct WeatherRequest {
    pub point: GeoPoint,
    /// Display name; sources fall back to their own naming when absent.
    pub name: Option<String>,
    /// Set when the point came from the capital table; drives sample heuristics.
    pub capital: Option<Capital>,
}

impl WeatherRequest {
    pub fn at(point: GeoPoint) -> Self {
        Self {
            point,
            name: None,
            capital: None,
        }
    }

    pub fn named(point: GeoPoint, name: impl Into<String>) -> Self {
        Self {
            point,
            name: Some(name.into()),
            capital: None,
        }
    }

    pub fn for_capital(capital: &Capital) -> Self {
        Self {
            point: capital.point(),
            name: Some(capital.display_name()),
            capital: Some(*capital),
        }
    }
}

/// Which upstream produced a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    OneCall,
    Basic,
    Sample,
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::OneCall => "onecall",
            Provenance::Basic => "basic",
            Provenance::Sample => "sample",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Provenance::OneCall => "OpenWeatherMap One Call API",
            Provenance::Basic => "OpenWeatherMap Basic APIs",
            Provenance::Sample => "Sample Data",
        }
    }

    /// Whether the numbers came from a real upstream.
    pub fn is_real(&self) -> bool {
        !matches!(self, Provenance::Sample)
    }
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub condition: String,
    pub icon: String,
    pub humidity_pct: u8,
    pub wind_kmh: f64,
    pub wind_deg: f64,
    pub pressure_hpa: f64,
    pub visibility_km: f64,
    pub uv_index: f64,
    pub clouds_pct: u8,
    pub dew_point_c: Option<f64>,
    pub sunrise: Option<DateTime<Utc>>,
    pub sunset: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyPoint {
    pub time: DateTime<Utc>,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub icon: String,
    pub condition: String,
    pub humidity_pct: u8,
    pub wind_kmh: f64,
    pub wind_deg: f64,
    pub pressure_hpa: f64,
    pub clouds_pct: u8,
    pub precipitation_mm: f64,
    pub snow_mm: f64,
    pub uv_index: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPoint {
    pub date: DateTime<Utc>,
    pub high_c: f64,
    pub low_c: f64,
    pub morning_c: Option<f64>,
    pub evening_c: Option<f64>,
    pub night_c: Option<f64>,
    pub condition: String,
    pub icon: String,
    pub humidity_pct: Option<u8>,
    pub wind_kmh: Option<f64>,
    pub wind_deg: Option<f64>,
    pub pressure_hpa: Option<f64>,
    pub clouds_pct: Option<u8>,
    pub precipitation_mm: f64,
    pub snow_mm: f64,
    pub uv_index: Option<f64>,
    pub sunrise: Option<DateTime<Utc>>,
    pub sunset: Option<DateTime<Utc>>,
    pub moon_phase: Option<f64>,
}

/// Normalized weather for one location, whichever source produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub location_name: String,
    pub coordinates: Option<GeoPoint>,
    pub timezone: Option<Zone>,
    pub current: CurrentConditions,
    pub hourly: Vec<HourlyPoint>,
    pub daily: Vec<DailyPoint>,
    pub provenance: Provenance,
    pub fetched_at: DateTime<Utc>,
}

/// Display unit for temperatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    /// Convert from Celsius and round to a whole degree, halves rounding up.
    pub fn convert(&self, celsius: f64) -> i64 {
        let value = match self {
            TemperatureUnit::Celsius => celsius,
            TemperatureUnit::Fahrenheit => celsius * 9.0 / 5.0 + 32.0,
        };
        round_half_up(value)
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "°C",
            TemperatureUnit::Fahrenheit => "°F",
        }
    }
}

impl std::str::FromStr for TemperatureUnit {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "c" | "celsius" => Ok(TemperatureUnit::Celsius),
            "f" | "fahrenheit" => Ok(TemperatureUnit::Fahrenheit),
            _ => Err(anyhow::anyhow!(
                "Unknown unit '{value}'. Supported units: celsius, fahrenheit."
            )),
        }
    }
}

/// Colour theme; the only preference the app persists on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }
}

/// Round to the nearest integer with `.5` going towards positive infinity.
pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}
