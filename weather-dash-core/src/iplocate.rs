//! Location detection from the caller's public IP address.
//!
//! The primary service is ip-api.com; ipapi.co is tried when it fails. Both are
//! queried without parameters and infer the caller's IP server-side.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    config::Endpoints,
    error::FetchError,
    fallback::{Fallback, Source},
    geo::GeoPoint,
    http,
};

/// A location reported by an IP geolocation service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IpLocation {
    pub ip: Option<String>,
    pub city: String,
    pub region: Option<String>,
    pub country: String,
    pub country_code: Option<String>,
    pub point: GeoPoint,
    pub timezone: Option<String>,
    pub isp: Option<String>,
}

impl IpLocation {
    /// `"<city>, <region>"`, or `"<city>, <country>"` when the region is unknown.
    pub fn display_name(&self) -> String {
        let area = self
            .region
            .as_deref()
            .filter(|r| !r.is_empty())
            .unwrap_or(&self.country);
        format!("{}, {}", self.city, area)
    }
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: Option<String>,
    message: Option<String>,
    query: Option<String>,
    city: Option<String>,
    #[serde(rename = "regionName")]
    region_name: Option<String>,
    country: Option<String>,
    #[serde(rename = "countryCode")]
    country_code: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
    timezone: Option<String>,
    isp: Option<String>,
}

/// ip-api.com; a payload counts only with `status == "success"` and a city.
#[derive(Debug, Clone)]
pub struct IpApiCom {
    url: String,
    http: Client,
}

impl IpApiCom {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            http: http::client(),
        }
    }
}

#[async_trait]
impl Source<(), IpLocation> for IpApiCom {
    fn name(&self) -> &'static str {
        "ip-api.com"
    }

    async fn fetch(&self, _input: &()) -> Result<IpLocation, FetchError> {
        let endpoint = self.name();
        let parsed: IpApiResponse = http::get_json(&self.http, endpoint, &self.url, &[]).await?;

        if parsed.status.as_deref() != Some("success") {
            return Err(FetchError::payload(
                endpoint,
                format!(
                    "status {:?}: {}",
                    parsed.status,
                    parsed.message.as_deref().unwrap_or("no message")
                ),
            ));
        }

        let city = parsed
            .city
            .filter(|c| !c.is_empty())
            .ok_or_else(|| FetchError::payload(endpoint, "missing city"))?;
        let (lat, lon) = parsed
            .lat
            .zip(parsed.lon)
            .ok_or_else(|| FetchError::payload(endpoint, "missing coordinates"))?;

        Ok(IpLocation {
            ip: parsed.query,
            city,
            region: parsed.region_name,
            country: parsed.country.unwrap_or_default(),
            country_code: parsed.country_code,
            point: GeoPoint::new(lat, lon),
            timezone: parsed.timezone,
            isp: parsed.isp,
        })
    }
}

#[derive(Debug, Deserialize)]
struct IpapiCoResponse {
    ip: Option<String>,
    city: Option<String>,
    region: Option<String>,
    country_name: Option<String>,
    country: Option<String>,
    country_code: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    timezone: Option<String>,
    org: Option<String>,
}

/// ipapi.co; a payload counts only with a city and a country.
#[derive(Debug, Clone)]
pub struct IpapiCo {
    url: String,
    http: Client,
}

impl IpapiCo {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            http: http::client(),
        }
    }
}

#[async_trait]
impl Source<(), IpLocation> for IpapiCo {
    fn name(&self) -> &'static str {
        "ipapi.co"
    }

    async fn fetch(&self, _input: &()) -> Result<IpLocation, FetchError> {
        let endpoint = self.name();
        let parsed: IpapiCoResponse = http::get_json(&self.http, endpoint, &self.url, &[]).await?;

        let city = parsed
            .city
            .filter(|c| !c.is_empty())
            .ok_or_else(|| FetchError::payload(endpoint, "missing city"))?;
        let country = parsed
            .country_name
            .or(parsed.country.clone())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| FetchError::payload(endpoint, "missing country"))?;
        let (lat, lon) = parsed
            .latitude
            .zip(parsed.longitude)
            .ok_or_else(|| FetchError::payload(endpoint, "missing coordinates"))?;

        Ok(IpLocation {
            ip: parsed.ip,
            city,
            region: parsed.region,
            country,
            country_code: parsed.country_code.or(parsed.country),
            point: GeoPoint::new(lat, lon),
            timezone: parsed.timezone,
            isp: parsed.org,
        })
    }
}

/// Primary-then-backup IP geolocation.
#[derive(Debug)]
pub struct IpLocator {
    chain: Fallback<(), IpLocation>,
}

impl IpLocator {
    pub fn new(chain: Fallback<(), IpLocation>) -> Self {
        Self { chain }
    }

    pub fn from_endpoints(endpoints: &Endpoints) -> Self {
        Self::new(
            Fallback::new()
                .then(IpApiCom::new(endpoints.ip_primary.clone()))
                .then(IpapiCo::new(endpoints.ip_backup.clone())),
        )
    }

    /// `None` means "undetected": every service failed.
    pub async fn detect(&self) -> Option<IpLocation> {
        match self.chain.run(&()).await {
            Ok(location) => {
                info!(
                    "IP location detected: {} ({})",
                    location.display_name(),
                    location.point
                );
                Some(location)
            }
            Err(e) => {
                warn!("Could not detect location from IP: {e}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(region: Option<&str>) -> IpLocation {
        IpLocation {
            ip: None,
            city: "Lyon".into(),
            region: region.map(Into::into),
            country: "France".into(),
            country_code: Some("FR".into()),
            point: GeoPoint::new(45.76, 4.84),
            timezone: None,
            isp: None,
        }
    }

    #[test]
    fn display_name_prefers_region() {
        assert_eq!(location(Some("Auvergne-Rhône-Alpes")).display_name(), "Lyon, Auvergne-Rhône-Alpes");
        assert_eq!(location(None).display_name(), "Lyon, France");
        assert_eq!(location(Some("")).display_name(), "Lyon, France");
    }

    #[test]
    fn default_chain_is_primary_then_backup() {
        let locator = IpLocator::from_endpoints(&Endpoints::default());
        assert_eq!(locator.chain.names(), vec!["ip-api.com", "ipapi.co"]);
    }
}
