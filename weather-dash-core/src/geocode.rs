//! Forward geocoding through the OpenWeatherMap direct geocoding API.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{config::Config, error::FetchError, geo::GeoPoint, http, lookup};

const ENDPOINT: &str = "geocoding";

/// A named place returned by a geocoding search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    pub state: Option<String>,
    /// Two-letter country code.
    pub country: String,
    pub point: GeoPoint,
}

impl Place {
    /// `"Springfield, Illinois, US"`, or `"Paris, FR"` without a state.
    pub fn display_name(&self) -> String {
        match self.state.as_deref().filter(|s| !s.is_empty()) {
            Some(state) => format!("{}, {}, {}", self.name, state, self.country),
            None => format!("{}, {}", self.name, self.country),
        }
    }

    /// Suggestion detail line: flag, optional state, country name.
    pub fn details(&self) -> String {
        let flag = lookup::country_flag(&self.country);
        let country = lookup::country_name(&self.country);
        match self.state.as_deref().filter(|s| !s.is_empty()) {
            Some(state) => format!("{flag} {state}, {country}"),
            None => format!("{flag} {country}"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwPlace {
    name: String,
    lat: f64,
    lon: f64,
    country: String,
    state: Option<String>,
}

impl From<OwPlace> for Place {
    fn from(p: OwPlace) -> Self {
        Self {
            name: p.name,
            state: p.state,
            country: p.country,
            point: GeoPoint::new(p.lat, p.lon),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Geocoder {
    base_url: String,
    api_key: Option<String>,
    http: Client,
}

impl Geocoder {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key,
            http: http::client(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.endpoints.geocoding_base.clone(),
            config.api_key().map(str::to_owned),
        )
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Up to `limit` places matching `query`.
    ///
    /// Without an API key this searches the built-in sample places instead.
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<Place>, FetchError> {
        let Some(api_key) = self.api_key.as_deref() else {
            debug!("Geocoding not configured, searching sample places for '{query}'");
            let mut places = sample_places(query);
            places.truncate(limit);
            return Ok(places);
        };

        let url = format!("{}/direct", self.base_url.trim_end_matches('/'));
        let limit = limit.to_string();
        let parsed: Vec<OwPlace> = http::get_json(
            &self.http,
            ENDPOINT,
            &url,
            &[("q", query), ("limit", limit.as_str()), ("appid", api_key)],
        )
        .await?;

        debug!("Geocoding '{query}' returned {} place(s)", parsed.len());
        Ok(parsed.into_iter().map(Place::from).collect())
    }

    /// The best match for `query`, if any.
    pub async fn resolve(&self, query: &str) -> Result<Option<Place>, FetchError> {
        Ok(self.search(query, 1).await?.into_iter().next())
    }
}

/// Built-in places offered when no geocoding key is configured.
pub fn sample_places(query: &str) -> Vec<Place> {
    let query = query.trim().to_lowercase();
    let samples: [(&str, Option<&str>, &str, f64, f64); 5] = [
        ("Tehran", Some("Tehran"), "IR", 35.6892, 51.3890),
        ("New York", Some("NY"), "US", 40.7128, -74.0060),
        ("London", None, "GB", 51.5074, -0.1278),
        ("Paris", None, "FR", 48.8566, 2.3522),
        ("Tokyo", None, "JP", 35.6762, 139.6503),
    ];

    samples
        .into_iter()
        .filter(|(name, _, country, _, _)| {
            name.to_lowercase().contains(&query) || country.to_lowercase().contains(&query)
        })
        .map(|(name, state, country, lat, lon)| Place {
            name: name.to_string(),
            state: state.map(str::to_string),
            country: country.to_string(),
            point: GeoPoint::new(lat, lon),
        })
        .collect()
}
