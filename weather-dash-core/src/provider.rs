use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{info, warn};

use crate::{
    Config, WeatherRequest, WeatherSnapshot,
    error::FetchError,
    fallback::Fallback,
    lookup,
    provider::{basic::BasicSource, onecall::OneCallSource, sample::SampleGenerator},
};

pub mod basic;
pub mod onecall;
pub mod sample;

/// Weather for a request, never failing: one-call, then basic, then sample data.
#[derive(Debug)]
pub struct WeatherService {
    chain: Fallback<WeatherRequest, WeatherSnapshot>,
    sample: SampleGenerator,
    configured: bool,
}

impl WeatherService {
    pub fn new(chain: Fallback<WeatherRequest, WeatherSnapshot>, sample: SampleGenerator) -> Self {
        let configured = !chain.is_empty();
        Self {
            chain,
            sample,
            configured,
        }
    }

    /// Build the standard chain, or a sample-only service when no API key is configured.
    pub fn from_config(config: &Config) -> Self {
        let Some(api_key) = config.api_key() else {
            warn!("Weather API key not configured; sample data will be shown");
            return Self::new(Fallback::new(), SampleGenerator::default());
        };

        let endpoints = &config.endpoints;
        let chain = Fallback::new()
            .then(OneCallSource::new(endpoints.onecall_base.clone(), api_key))
            .then(BasicSource::new(endpoints.weather_base.clone(), api_key));

        Self::new(chain, SampleGenerator::default())
    }

    pub fn is_configured(&self) -> bool {
        self.configured
    }

    pub async fn fetch(&self, request: &WeatherRequest) -> WeatherSnapshot {
        if !self.configured {
            return self.sample.generate(request, Utc::now());
        }

        match self.chain.run(request).await {
            Ok(snapshot) => {
                info!(
                    "Weather for {} from {}: {:.1}°C, {}",
                    snapshot.location_name,
                    snapshot.provenance.label(),
                    snapshot.current.temperature_c,
                    snapshot.current.condition
                );
                snapshot
            }
            Err(e) => {
                warn!("Weather sources exhausted ({e}); falling back to sample data");
                self.sample.generate(request, Utc::now())
            }
        }
    }
}

/// `weather[]` entry shared by every OpenWeatherMap payload.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct OwCondition {
    description: String,
    icon: String,
}

/// The leading condition of a `weather[]` array, as `(description, icon)`.
///
/// A blank description is replaced by the generic name for the icon.
pub(crate) fn first_condition(
    endpoint: &'static str,
    weather: &[OwCondition],
) -> Result<(String, String), FetchError> {
    let first = weather
        .first()
        .ok_or_else(|| FetchError::payload(endpoint, "no weather condition in payload"))?;
    let description = match first.description.trim() {
        "" => lookup::icon_description(&first.icon).to_lowercase(),
        text => text.to_string(),
    };
    Ok((description, first.icon.clone()))
}

pub(crate) fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
}

pub(crate) fn ms_to_kmh(speed: f64) -> f64 {
    speed * 3.6
}

/// Visibility in metres to kilometres; a missing reading counts as 10 km.
pub(crate) fn visibility_km(metres: Option<f64>) -> f64 {
    metres.unwrap_or(10_000.0) / 1000.0
}

pub(crate) fn clamp_pct(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}
