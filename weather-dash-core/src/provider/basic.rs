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
    zone::{ResolvedZone, Zone, group_by_day},
};

use super::{OwCondition, clamp_pct, first_condition, ms_to_kmh, unix_to_utc, visibility_km};

const CURRENT_ENDPOINT: &str = "current weather";
const FORECAST_ENDPOINT: &str = "5-day forecast";
/// Eight 3-hour entries cover the next 24 hours.
const HOURLY_ENTRIES: usize = 8;
const DAILY_GROUPS: usize = 5;

/// Free-tier pair of endpoints: `/weather` and `/forecast`, fetched concurrently.
#[derive(Debug, Clone)]
pub struct BasicSource {
    base_url: String,
    api_key: String,
    http: Client,
}

impl BasicSource {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            http: http::client(),
        }
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &'static str,
        path: &str,
        point: GeoPoint,
    ) -> Result<T, FetchError> {
        let url = format!("{}/{path}", self.base_url.trim_end_matches('/'));
        let lat = point.latitude.to_string();
        let lon = point.longitude.to_string();

        http::get_json(
            &self.http,
            endpoint,
            &url,
            &[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
                ("lang", "en"),
            ],
        )
        .await
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: f64,
    pressure: f64,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
    deg: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct OwClouds {
    all: f64,
}

#[derive(Debug, Deserialize)]
struct OwCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Default, Deserialize)]
struct OwSys {
    sunrise: Option<i64>,
    sunset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct OwVolume {
    #[serde(rename = "3h")]
    three_hours: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    coord: OwCoord,
    #[serde(default)]
    name: String,
    main: OwMain,
    weather: Vec<OwCondition>,
    wind: OwWind,
    #[serde(default)]
    clouds: OwClouds,
    visibility: Option<f64>,
    #[serde(default)]
    sys: OwSys,
    /// Offset from UTC in seconds.
    timezone: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwMain,
    weather: Vec<OwCondition>,
    wind: OwWind,
    #[serde(default)]
    clouds: OwClouds,
    rain: Option<OwVolume>,
    snow: Option<OwVolume>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

/// Forecast entry with its timestamp and leading condition already validated.
struct Entry<'a> {
    time: chrono::DateTime<Utc>,
    condition: String,
    icon: String,
    raw: &'a OwForecastEntry,
}

/// The most frequent value; on equal counts the one that reached the count first wins.
fn most_frequent<'a>(values: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    let mut best: Option<(&str, usize)> = None;

    for value in values {
        let count = match counts.iter_mut().find(|(v, _)| *v == value) {
            Some((_, n)) => {
                *n += 1;
                *n
            }
            None => {
                counts.push((value, 1));
                1
            }
        };
        if best.is_none_or(|(_, max)| count > max) {
            best = Some((value, count));
        }
    }

    best.map(|(value, _)| value)
}

fn reshape(
    current: OwCurrentResponse,
    forecast: OwForecastResponse,
    name: Option<String>,
) -> Result<WeatherSnapshot, FetchError> {
    let (condition, icon) = first_condition(CURRENT_ENDPOINT, &current.weather)?;
    let zone = current.timezone.map(Zone::OffsetSeconds);

    let conditions = CurrentConditions {
        temperature_c: current.main.temp,
        feels_like_c: current.main.feels_like,
        condition,
        icon,
        humidity_pct: clamp_pct(current.main.humidity),
        wind_kmh: ms_to_kmh(current.wind.speed),
        wind_deg: current.wind.deg.unwrap_or(0.0),
        pressure_hpa: current.main.pressure,
        visibility_km: visibility_km(current.visibility),
        // Not reported by the current-weather endpoint.
        uv_index: 0.0,
        clouds_pct: clamp_pct(current.clouds.all),
        dew_point_c: None,
        sunrise: current.sys.sunrise.and_then(unix_to_utc),
        sunset: current.sys.sunset.and_then(unix_to_utc),
    };

    let entries = forecast
        .list
        .iter()
        .map(|raw| {
            let (condition, icon) = first_condition(FORECAST_ENDPOINT, &raw.weather)?;
            let time = unix_to_utc(raw.dt).ok_or_else(|| {
                FetchError::payload(FORECAST_ENDPOINT, format!("invalid timestamp {}", raw.dt))
            })?;
            Ok(Entry {
                time,
                condition,
                icon,
                raw,
            })
        })
        .collect::<Result<Vec<_>, FetchError>>()?;

    let hourly = entries
        .iter()
        .take(HOURLY_ENTRIES)
        .map(|e| HourlyPoint {
            time: e.time,
            temperature_c: e.raw.main.temp,
            feels_like_c: e.raw.main.feels_like,
            icon: e.icon.clone(),
            condition: e.condition.clone(),
            humidity_pct: clamp_pct(e.raw.main.humidity),
            wind_kmh: ms_to_kmh(e.raw.wind.speed),
            wind_deg: e.raw.wind.deg.unwrap_or(0.0),
            pressure_hpa: e.raw.main.pressure,
            clouds_pct: clamp_pct(e.raw.clouds.all),
            precipitation_mm: e.raw.rain.as_ref().and_then(|v| v.three_hours).unwrap_or(0.0),
            snow_mm: e.raw.snow.as_ref().and_then(|v| v.three_hours).unwrap_or(0.0),
            uv_index: 0.0,
        })
        .collect();

    let day_zone = ResolvedZone::pick(zone.as_ref(), &Zone::utc());
    let daily = group_by_day(&entries, day_zone, |e| e.time)
        .into_iter()
        .take(DAILY_GROUPS)
        .map(|group| {
            let temps = group.items.iter().map(|e| e.raw.main.temp);
            let high = temps.clone().fold(f64::NEG_INFINITY, f64::max);
            let low = temps.fold(f64::INFINITY, f64::min);
            let condition = most_frequent(group.items.iter().map(|e| e.condition.as_str()))
                .unwrap_or_default()
                .to_string();
            let icon = most_frequent(group.items.iter().map(|e| e.icon.as_str()))
                .unwrap_or_default()
                .to_string();
            let first = group.items.first().map(|e| e.time).unwrap_or_else(Utc::now);

            DailyPoint {
                date: first,
                high_c: high,
                low_c: low,
                morning_c: None,
                evening_c: None,
                night_c: None,
                condition,
                icon,
                humidity_pct: None,
                wind_kmh: None,
                wind_deg: None,
                pressure_hpa: None,
                clouds_pct: None,
                precipitation_mm: group
                    .items
                    .iter()
                    .filter_map(|e| e.raw.rain.as_ref().and_then(|v| v.three_hours))
                    .sum(),
                snow_mm: group
                    .items
                    .iter()
                    .filter_map(|e| e.raw.snow.as_ref().and_then(|v| v.three_hours))
                    .sum(),
                uv_index: None,
                sunrise: None,
                sunset: None,
                moon_phase: None,
            }
        })
        .collect();

    let point = GeoPoint::new(current.coord.lat, current.coord.lon);
    let location_name = name
        .or_else(|| Some(current.name).filter(|n| !n.is_empty()))
        .unwrap_or_else(|| point.to_string());

    Ok(WeatherSnapshot {
        location_name,
        coordinates: Some(point),
        timezone: zone,
        current: conditions,
        hourly,
        daily,
        provenance: Provenance::Basic,
        fetched_at: Utc::now(),
    })
}

#[async_trait]
impl Source<WeatherRequest, WeatherSnapshot> for BasicSource {
    fn name(&self) -> &'static str {
        "basic"
    }

    async fn fetch(&self, request: &WeatherRequest) -> Result<WeatherSnapshot, FetchError> {
        let (current, forecast) = tokio::join!(
            self.get::<OwCurrentResponse>(CURRENT_ENDPOINT, "weather", request.point),
            self.get::<OwForecastResponse>(FORECAST_ENDPOINT, "forecast", request.point),
        );

        reshape(current?, forecast?, request.name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn current_json() -> serde_json::Value {
        json!({
            "coord": { "lat": 35.69, "lon": 51.39 },
            "name": "Tehran",
            "main": { "temp": 18.3, "feels_like": 17.1, "humidity": 41, "pressure": 1016 },
            "weather": [{ "description": "few clouds", "icon": "02d" }],
            "wind": { "speed": 2.5, "deg": 200 },
            "clouds": { "all": 20 },
            "sys": { "sunrise": 1_767_010_000, "sunset": 1_767_050_000 },
            "timezone": 12600
        })
    }

    fn entry(dt: i64, temp: f64, description: &str, icon: &str) -> serde_json::Value {
        json!({
            "dt": dt,
            "main": { "temp": temp, "feels_like": temp, "humidity": 50, "pressure": 1010 },
            "weather": [{ "description": description, "icon": icon }],
            "wind": { "speed": 1.0 },
            "clouds": { "all": 40 }
        })
    }

    // 2026-01-01T00:00:00Z
    const MIDNIGHT: i64 = 1_767_225_600;

    fn forecast_json(entries: usize) -> serde_json::Value {
        let list: Vec<_> = (0..entries as i64)
            .map(|i| entry(MIDNIGHT + i * 3 * 3600, 10.0 + i as f64, "clear sky", "01d"))
            .collect();
        json!({ "list": list })
    }

    fn parse(current: serde_json::Value, forecast: serde_json::Value) -> WeatherSnapshot {
        let current: OwCurrentResponse = serde_json::from_value(current).expect("current");
        let forecast: OwForecastResponse = serde_json::from_value(forecast).expect("forecast");
        reshape(current, forecast, None).expect("reshape")
    }

    #[test]
    fn hourly_takes_first_eight_entries() {
        let snapshot = parse(current_json(), forecast_json(40));
        assert_eq!(snapshot.hourly.len(), 8);
        assert_eq!(snapshot.provenance, Provenance::Basic);
        assert_eq!(snapshot.timezone, Some(Zone::OffsetSeconds(12600)));
        assert_eq!(snapshot.location_name, "Tehran");
        assert_eq!(snapshot.current.wind_kmh, 9.0);
    }

    #[test]
    fn daily_groups_are_capped_at_five() {
        let snapshot = parse(current_json(), forecast_json(40));
        assert_eq!(snapshot.daily.len(), 5);
        for day in &snapshot.daily {
            assert!(day.high_c >= day.low_c);
        }
    }

    #[test]
    fn daily_groups_follow_reported_offset() {
        // With +03:30, 21:00Z already belongs to the next local day.
        let forecast = json!({ "list": [
            entry(MIDNIGHT + 18 * 3600, 5.0, "clear sky", "01n"),
            entry(MIDNIGHT + 21 * 3600, 4.0, "clear sky", "01n"),
        ]});
        let snapshot = parse(current_json(), forecast);
        assert_eq!(snapshot.daily.len(), 2);

        let mut utc = current_json();
        utc["timezone"] = json!(0);
        let forecast = json!({ "list": [
            entry(MIDNIGHT + 18 * 3600, 5.0, "clear sky", "01n"),
            entry(MIDNIGHT + 21 * 3600, 4.0, "clear sky", "01n"),
        ]});
        assert_eq!(parse(utc, forecast).daily.len(), 1);
    }

    #[test]
    fn daily_condition_is_most_frequent() {
        let forecast = json!({ "list": [
            entry(MIDNIGHT, 3.0, "light rain", "10n"),
            entry(MIDNIGHT + 3 * 3600, 9.0, "clear sky", "01d"),
            entry(MIDNIGHT + 6 * 3600, 7.0, "clear sky", "01d"),
        ]});
        let mut current = current_json();
        current["timezone"] = json!(0);
        let day = &parse(current, forecast).daily[0];
        assert_eq!(day.condition, "clear sky");
        assert_eq!(day.icon, "01d");
        assert_eq!(day.high_c, 9.0);
        assert_eq!(day.low_c, 3.0);
    }

    #[test]
    fn most_frequent_prefers_first_to_reach_max() {
        assert_eq!(most_frequent(["a", "b", "b", "a"]), Some("b"));
        assert_eq!(most_frequent(["a", "b"]), Some("a"));
        assert_eq!(most_frequent(std::iter::empty()), None);
    }

    #[test]
    fn name_falls_back_to_coordinates() {
        let mut current = current_json();
        current["name"] = json!("");
        let snapshot = parse(current, forecast_json(1));
        assert_eq!(snapshot.location_name, "35.6900, 51.3900");
    }
}
