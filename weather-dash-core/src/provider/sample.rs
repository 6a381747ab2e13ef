//! Synthetic weather used when no real source is available.

use chrono::{DateTime, Datelike, Duration, Utc};
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{
    capitals::Capital,
    model::{CurrentConditions, DailyPoint, HourlyPoint, Provenance, WeatherRequest, WeatherSnapshot},
};

pub const SAMPLE_LOCATION: &str = "Sample Location";
const HOURS: i64 = 48;
const DAYS: i64 = 7;

const HOURLY_SKY: [(&str, &str); 4] = [
    ("Clear", "01d"),
    ("Partly Cloudy", "02d"),
    ("Cloudy", "03d"),
    ("Overcast", "04d"),
];
const DAILY_SKY: [(&str, &str); 4] = [
    ("Sunny", "01d"),
    ("Partly Cloudy", "02d"),
    ("Cloudy", "03d"),
    ("Clear", "01d"),
];

/// Baseline for a location: temperature in °C, condition text and icon code.
#[derive(Debug, Clone, PartialEq)]
pub struct Climate {
    pub base_c: f64,
    pub condition: &'static str,
    pub icon: &'static str,
}

impl Climate {
    /// Seasonal and latitude heuristics for Iranian capitals; a mild default elsewhere.
    pub fn estimate(capital: Option<&Capital>, month: u32) -> Self {
        let mut climate = Climate {
            base_c: 22.0,
            condition: "Partly Cloudy",
            icon: "02d",
        };
        let Some(capital) = capital else {
            return climate;
        };

        let north = capital.latitude > 35.0;
        if (6..=9).contains(&month) {
            climate.base_c = if north { 28.0 } else { 35.0 };
            climate.condition = if capital.name == "Bandar Abbas" {
                "Hot and Humid"
            } else {
                "Sunny"
            };
            climate.icon = "01d";
        } else if month == 12 || month <= 3 {
            climate.base_c = if north { 5.0 } else { 15.0 };
            climate.condition = if capital.latitude > 37.0 { "Cold" } else { "Cool" };
            climate.icon = "03d";
        }

        climate.base_c += match capital.name {
            "Tehran" => 2.0,
            "Mashhad" => -3.0,
            "Bandar Abbas" => 8.0,
            "Tabriz" => -5.0,
            _ => 0.0,
        };
        climate
    }
}

/// Builds sample snapshots from a seeded generator.
///
/// Without an explicit seed the generator derives one from the coordinates and
/// the calendar day, so repeated requests for one place on one day agree.
#[derive(Debug, Clone, Default)]
pub struct SampleGenerator {
    seed: Option<u64>,
}

impl SampleGenerator {
    pub fn seeded(seed: u64) -> Self {
        Self { seed: Some(seed) }
    }

    fn rng_for(&self, request: &WeatherRequest, now: DateTime<Utc>) -> StdRng {
        let seed = self.seed.unwrap_or_else(|| {
            let lat = (request.point.latitude * 1e4).round() as i64 as u64;
            let lon = (request.point.longitude * 1e4).round() as i64 as u64;
            lat.rotate_left(32) ^ lon ^ now.num_days_from_ce() as u64
        });
        StdRng::seed_from_u64(seed)
    }

    pub fn generate(&self, request: &WeatherRequest, now: DateTime<Utc>) -> WeatherSnapshot {
        let mut rng = self.rng_for(request, now);
        let climate = Climate::estimate(request.capital.as_ref(), now.month());
        let base = climate.base_c;

        let current = CurrentConditions {
            temperature_c: base,
            feels_like_c: base + 3.0,
            condition: climate.condition.to_string(),
            icon: climate.icon.to_string(),
            humidity_pct: rng.random_range(40..70),
            wind_kmh: rng.random_range(5..25) as f64,
            wind_deg: rng.random_range(0..360) as f64,
            pressure_hpa: rng.random_range(1000..1050) as f64,
            visibility_km: rng.random_range(5..20) as f64,
            uv_index: rng.random_range(2..10) as f64,
            clouds_pct: rng.random_range(20..80),
            dew_point_c: None,
            sunrise: None,
            sunset: None,
        };

        let hourly = (0..HOURS)
            .map(|i| {
                let (condition, icon) = HOURLY_SKY[rng.random_range(0..HOURLY_SKY.len())];
                HourlyPoint {
                    time: now + Duration::hours(i),
                    temperature_c: (base + rng.random_range(-4.0..4.0)).round(),
                    feels_like_c: (base + rng.random_range(-2.0..6.0)).round(),
                    icon: icon.to_string(),
                    condition: condition.to_string(),
                    humidity_pct: rng.random_range(40..70),
                    wind_kmh: rng.random_range(5..25) as f64,
                    wind_deg: rng.random_range(0..360) as f64,
                    pressure_hpa: rng.random_range(1000..1050) as f64,
                    clouds_pct: rng.random_range(10..90),
                    precipitation_mm: if rng.random_bool(0.2) {
                        rng.random_range(0.0..3.0)
                    } else {
                        0.0
                    },
                    snow_mm: if rng.random_bool(0.05) {
                        rng.random_range(0.0..2.0)
                    } else {
                        0.0
                    },
                    uv_index: rng.random_range(1..9) as f64,
                }
            })
            .collect();

        let daily = (0..DAYS)
            .map(|i| {
                let date = now + Duration::days(i);
                let (condition, icon) = DAILY_SKY[rng.random_range(0..DAILY_SKY.len())];
                DailyPoint {
                    date,
                    high_c: (base + rng.random_range(0.0..10.0)).round(),
                    low_c: (base - rng.random_range(0.0..8.0)).round(),
                    morning_c: Some((base - 2.0 + rng.random_range(0.0..4.0)).round()),
                    evening_c: Some((base + rng.random_range(0.0..6.0)).round()),
                    night_c: Some((base - 5.0 + rng.random_range(0.0..4.0)).round()),
                    condition: condition.to_string(),
                    icon: icon.to_string(),
                    humidity_pct: Some(rng.random_range(40..70)),
                    wind_kmh: Some(rng.random_range(5..25) as f64),
                    wind_deg: Some(rng.random_range(0..360) as f64),
                    pressure_hpa: Some(rng.random_range(1000..1050) as f64),
                    clouds_pct: Some(rng.random_range(20..80)),
                    precipitation_mm: if rng.random_bool(0.3) {
                        rng.random_range(0..5) as f64
                    } else {
                        0.0
                    },
                    snow_mm: if rng.random_bool(0.1) {
                        rng.random_range(0..3) as f64
                    } else {
                        0.0
                    },
                    uv_index: Some(rng.random_range(2..10) as f64),
                    sunrise: Some(date + Duration::hours(6)),
                    sunset: Some(date + Duration::hours(18)),
                    moon_phase: Some(rng.random_range(0.0..1.0)),
                }
            })
            .collect();

        WeatherSnapshot {
            location_name: request
                .name
                .clone()
                .unwrap_or_else(|| SAMPLE_LOCATION.to_string()),
            coordinates: Some(request.point),
            timezone: None,
            current,
            hourly,
            daily,
            provenance: Provenance::Sample,
            fetched_at: now,
        }
    }
}
