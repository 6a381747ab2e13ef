use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    WeatherRequest, WeatherSnapshot,
    error::FetchError,
    fallback::Source,
    geo::GeoPoint,
    http,
    model::{CurrentConditions, DailyPoint, HourlyPoint, Provenance},
    zone::Zone,
};

use super::{OwCondition, clamp_pct, first_condition, ms_to_kmh, unix_to_utc, visibility_km};

const ENDPOINT: &str = "one-call";
const HOURLY_WINDOW: usize = 48;
const DAILY_WINDOW: usize = 7;

/// One Call API 3.0: current, 48 hourly and 7 daily points in a single request.
#[derive(Debug, Clone)]
pub struct OneCallSource {
    base_url: String,
    api_key: String,
    http: Client,
}

impl OneCallSource {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            http: http::client(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OcVolume {
    #[serde(rename = "1h")]
    one_hour: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OcCurrent {
    temp: f64,
    feels_like: f64,
    humidity: f64,
    pressure: f64,
    dew_point: Option<f64>,
    uvi: Option<f64>,
    clouds: f64,
    visibility: Option<f64>,
    wind_speed: f64,
    wind_deg: Option<f64>,
    sunrise: Option<i64>,
    sunset: Option<i64>,
    weather: Vec<OwCondition>,
}

#[derive(Debug, Deserialize)]
struct OcHourly {
    dt: i64,
    temp: f64,
    feels_like: f64,
    humidity: f64,
    pressure: f64,
    clouds: f64,
    wind_speed: f64,
    wind_deg: Option<f64>,
    uvi: Option<f64>,
    rain: Option<OcVolume>,
    snow: Option<OcVolume>,
    weather: Vec<OwCondition>,
}

#[derive(Debug, Deserialize)]
struct OcDailyTemp {
    min: f64,
    max: f64,
    morn: Option<f64>,
    eve: Option<f64>,
    night: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OcDaily {
    dt: i64,
    temp: OcDailyTemp,
    humidity: f64,
    pressure: f64,
    clouds: f64,
    wind_speed: f64,
    wind_deg: Option<f64>,
    uvi: Option<f64>,
    rain: Option<f64>,
    snow: Option<f64>,
    sunrise: Option<i64>,
    sunset: Option<i64>,
    moon_phase: Option<f64>,
    weather: Vec<OwCondition>,
}

#[derive(Debug, Deserialize)]
struct OcResponse {
    lat: f64,
    lon: f64,
    timezone: Option<String>,
    current: OcCurrent,
    #[serde(default)]
    hourly: Vec<OcHourly>,
    #[serde(default)]
    daily: Vec<OcDaily>,
}

fn timestamp(ts: i64) -> Result<chrono::DateTime<Utc>, FetchError> {
    unix_to_utc(ts).ok_or_else(|| FetchError::payload(ENDPOINT, format!("invalid timestamp {ts}")))
}

impl OcResponse {
    fn into_snapshot(self, name: Option<String>) -> Result<WeatherSnapshot, FetchError> {
        let (condition, icon) = first_condition(ENDPOINT, &self.current.weather)?;
        let c = &self.current;
        let current = CurrentConditions {
            temperature_c: c.temp,
            feels_like_c: c.feels_like,
            condition,
            icon,
            humidity_pct: clamp_pct(c.humidity),
            wind_kmh: ms_to_kmh(c.wind_speed),
            wind_deg: c.wind_deg.unwrap_or(0.0),
            pressure_hpa: c.pressure,
            visibility_km: visibility_km(c.visibility),
            uv_index: c.uvi.unwrap_or(0.0),
            clouds_pct: clamp_pct(c.clouds),
            dew_point_c: c.dew_point,
            sunrise: c.sunrise.and_then(unix_to_utc),
            sunset: c.sunset.and_then(unix_to_utc),
        };

        let hourly = self
            .hourly
            .iter()
            .take(HOURLY_WINDOW)
            .map(|h| {
                let (condition, icon) = first_condition(ENDPOINT, &h.weather)?;
                Ok(HourlyPoint {
                    time: timestamp(h.dt)?,
                    temperature_c: h.temp,
                    feels_like_c: h.feels_like,
                    icon,
                    condition,
                    humidity_pct: clamp_pct(h.humidity),
                    wind_kmh: ms_to_kmh(h.wind_speed),
                    wind_deg: h.wind_deg.unwrap_or(0.0),
                    pressure_hpa: h.pressure,
                    clouds_pct: clamp_pct(h.clouds),
                    precipitation_mm: h.rain.as_ref().and_then(|v| v.one_hour).unwrap_or(0.0),
                    snow_mm: h.snow.as_ref().and_then(|v| v.one_hour).unwrap_or(0.0),
                    uv_index: h.uvi.unwrap_or(0.0),
                })
            })
            .collect::<Result<Vec<_>, FetchError>>()?;

        let daily = self
            .daily
            .iter()
            .take(DAILY_WINDOW)
            .map(|d| {
                let (condition, icon) = first_condition(ENDPOINT, &d.weather)?;
                Ok(DailyPoint {
                    date: timestamp(d.dt)?,
                    high_c: d.temp.max,
                    low_c: d.temp.min,
                    morning_c: d.temp.morn,
                    evening_c: d.temp.eve,
                    night_c: d.temp.night,
                    condition,
                    icon,
                    humidity_pct: Some(clamp_pct(d.humidity)),
                    wind_kmh: Some(ms_to_kmh(d.wind_speed)),
                    wind_deg: Some(d.wind_deg.unwrap_or(0.0)),
                    pressure_hpa: Some(d.pressure),
                    clouds_pct: Some(clamp_pct(d.clouds)),
                    precipitation_mm: d.rain.unwrap_or(0.0),
                    snow_mm: d.snow.unwrap_or(0.0),
                    uv_index: Some(d.uvi.unwrap_or(0.0)),
                    sunrise: d.sunrise.and_then(unix_to_utc),
                    sunset: d.sunset.and_then(unix_to_utc),
                    moon_phase: d.moon_phase,
                })
            })
            .collect::<Result<Vec<_>, FetchError>>()?;

        let point = GeoPoint::new(self.lat, self.lon);
        Ok(WeatherSnapshot {
            location_name: name.unwrap_or_else(|| point.to_string()),
            coordinates: Some(point),
            timezone: self.timezone.map(Zone::Named),
            current,
            hourly,
            daily,
            provenance: Provenance::OneCall,
            fetched_at: Utc::now(),
        })
    }
}

#[async_trait]
impl Source<WeatherRequest, WeatherSnapshot> for OneCallSource {
    fn name(&self) -> &'static str {
        ENDPOINT
    }

    async fn fetch(&self, request: &WeatherRequest) -> Result<WeatherSnapshot, FetchError> {
        let url = format!("{}/onecall", self.base_url.trim_end_matches('/'));
        let lat = request.point.latitude.to_string();
        let lon = request.point.longitude.to_string();

        let parsed: OcResponse = http::get_json(
            &self.http,
            ENDPOINT,
            &url,
            &[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
                ("lang", "en"),
            ],
        )
        .await?;

        parsed.into_snapshot(request.name.clone())
    }
}
