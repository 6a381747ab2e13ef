//! Snapshot to text widgets.
//!
//! [`render`] is a pure function of its inputs: the reference "today" is the
//! snapshot's `fetched_at`, never the wall clock, so rendering the same
//! snapshot twice yields the same view.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};

use crate::{
    lookup,
    model::{HourlyPoint, Provenance, TemperatureUnit, Theme, WeatherSnapshot},
    zone::{ResolvedZone, Zone, group_by_day},
};

pub const HOURLY_LIMIT: usize = 48;
pub const DAILY_LIMIT: usize = 7;

/// Viewer-side display preferences.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewOptions {
    pub unit: TemperatureUnit,
    /// Used for day grouping when the snapshot carries no timezone.
    pub viewer_zone: Zone,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            unit: TemperatureUnit::Celsius,
            viewer_zone: Zone::local(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub location: String,
    pub date: String,
    pub provenance: Provenance,
    pub source_label: &'static str,
    /// Shown under the location for sample data.
    pub hint: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CurrentBlock {
    pub glyph: &'static str,
    pub temperature: String,
    pub condition: String,
    pub feels_like: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Detail {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum HourlyRow {
    DaySeparator(String),
    Hour {
        index: usize,
        time: String,
        glyph: &'static str,
        temperature: String,
        extras: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailyRow {
    pub day: String,
    pub date: String,
    pub glyph: &'static str,
    pub condition: String,
    pub high: String,
    pub low: String,
}

/// Everything the dashboard shows for one snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub header: Header,
    pub current: CurrentBlock,
    pub details: Vec<Detail>,
    pub hourly: Vec<HourlyRow>,
    pub daily: Vec<DailyRow>,
}

fn degrees(unit: TemperatureUnit, celsius: f64) -> String {
    format!("{}°", unit.convert(celsius))
}

fn trim_number(value: f64) -> String {
    let rounded = (value * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{rounded:.0}")
    } else {
        format!("{rounded:.1}")
    }
}

fn clock(zone: ResolvedZone, instant: DateTime<Utc>) -> String {
    zone.wall_clock(instant).format("%-I:%M %p").to_string()
}

pub fn render(snapshot: &WeatherSnapshot, options: &ViewOptions) -> DashboardView {
    let zone = ResolvedZone::pick(snapshot.timezone.as_ref(), &options.viewer_zone);
    let unit = options.unit;
    let today = zone.date(snapshot.fetched_at);
    let c = &snapshot.current;

    let header = Header {
        location: snapshot.location_name.clone(),
        date: today.format("%A, %B %-d, %Y").to_string(),
        provenance: snapshot.provenance,
        source_label: snapshot.provenance.label(),
        hint: (!snapshot.provenance.is_real()).then_some("Sample data - add an API key for real weather"),
    };

    let current = CurrentBlock {
        glyph: lookup::icon_glyph(&c.icon),
        temperature: degrees(unit, c.temperature_c),
        condition: c.condition.clone(),
        feels_like: format!("Feels like {}", degrees(unit, c.feels_like_c)),
    };

    let mut details = vec![
        Detail {
            label: "Humidity",
            value: format!("{}%", c.humidity_pct),
        },
        Detail {
            label: "Wind",
            value: format!(
                "{} km/h {}",
                c.wind_kmh.round(),
                lookup::wind_direction(c.wind_deg)
            ),
        },
        Detail {
            label: "Pressure",
            value: format!("{} hPa", c.pressure_hpa.round()),
        },
        Detail {
            label: "Visibility",
            value: format!("{} km", trim_number(c.visibility_km)),
        },
        Detail {
            label: "UV Index",
            value: trim_number(c.uv_index),
        },
        Detail {
            label: "Clouds",
            value: format!("{}%", c.clouds_pct),
        },
    ];
    if let Some(dew) = c.dew_point_c {
        details.push(Detail {
            label: "Dew Point",
            value: degrees(unit, dew),
        });
    }
    if let Some(sunrise) = c.sunrise {
        details.push(Detail {
            label: "Sunrise",
            value: clock(zone, sunrise),
        });
    }
    if let Some(sunset) = c.sunset {
        details.push(Detail {
            label: "Sunset",
            value: clock(zone, sunset),
        });
    }

    let hours = &snapshot.hourly[..snapshot.hourly.len().min(HOURLY_LIMIT)];
    let mut hourly = Vec::with_capacity(hours.len() + 3);
    let mut index = 0;
    for group in group_by_day(hours, zone, |h| h.time) {
        hourly.push(HourlyRow::DaySeparator(
            group.date.format("%a, %b %-d").to_string(),
        ));
        for hour in group.items {
            hourly.push(HourlyRow::Hour {
                index,
                time: zone.wall_clock(hour.time).format("%-I %p").to_string(),
                glyph: lookup::icon_glyph(&hour.icon),
                temperature: degrees(unit, hour.temperature_c),
                extras: hour_extras(hour),
            });
            index += 1;
        }
    }

    let daily = snapshot
        .daily
        .iter()
        .take(DAILY_LIMIT)
        .map(|day| {
            let date = zone.date(day.date);
            let label = match (date - today).num_days() {
                0 => "Today".to_string(),
                1 => "Tomorrow".to_string(),
                _ => date.format("%A").to_string(),
            };
            DailyRow {
                day: label,
                date: date.format("%b %-d").to_string(),
                glyph: lookup::icon_glyph(&day.icon),
                condition: day.condition.clone(),
                high: degrees(unit, day.high_c),
                low: degrees(unit, day.low_c),
            }
        })
        .collect();

    DashboardView {
        header,
        current,
        details,
        hourly,
        daily,
    }
}

fn hour_extras(hour: &HourlyPoint) -> Option<String> {
    let mut parts = Vec::new();
    if hour.precipitation_mm > 0.0 {
        parts.push(format!("💧 {}mm", trim_number(hour.precipitation_mm)));
    }
    if hour.snow_mm > 0.0 {
        parts.push(format!("❄️ {}mm", trim_number(hour.snow_mm)));
    }
    (!parts.is_empty()).then(|| parts.join(" "))
}

/// Expanded panel for one hourly entry, by its position in the hourly strip.
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyDetail {
    pub time: String,
    pub rows: Vec<Detail>,
}

pub fn hourly_detail(
    snapshot: &WeatherSnapshot,
    index: usize,
    options: &ViewOptions,
) -> Option<HourlyDetail> {
    let hour = snapshot.hourly.iter().take(HOURLY_LIMIT).nth(index)?;
    let zone = ResolvedZone::pick(snapshot.timezone.as_ref(), &options.viewer_zone);
    let unit = options.unit;

    let mut rows = vec![
        Detail {
            label: "Temperature",
            value: degrees(unit, hour.temperature_c),
        },
        Detail {
            label: "Feels Like",
            value: degrees(unit, hour.feels_like_c),
        },
        Detail {
            label: "Humidity",
            value: format!("{}%", hour.humidity_pct),
        },
        Detail {
            label: "Wind",
            value: format!(
                "{} km/h {}",
                hour.wind_kmh.round(),
                lookup::wind_direction(hour.wind_deg)
            ),
        },
        Detail {
            label: "Clouds",
            value: format!("{}%", hour.clouds_pct),
        },
        Detail {
            label: "Pressure",
            value: format!("{} hPa", hour.pressure_hpa.round()),
        },
    ];
    if hour.precipitation_mm > 0.0 {
        rows.push(Detail {
            label: "Precipitation",
            value: format!("{} mm", trim_number(hour.precipitation_mm)),
        });
    }
    if hour.snow_mm > 0.0 {
        rows.push(Detail {
            label: "Snow",
            value: format!("{} mm", trim_number(hour.snow_mm)),
        });
    }
    rows.push(Detail {
        label: "UV Index",
        value: trim_number(hour.uv_index),
    });

    Some(HourlyDetail {
        time: zone
            .wall_clock(hour.time)
            .format("%A, %B %-d, %-I:%M %p")
            .to_string(),
        rows,
    })
}

struct Palette {
    accent: &'static str,
    muted: &'static str,
    reset: &'static str,
}

impl Palette {
    fn for_theme(theme: Option<Theme>) -> Self {
        match theme {
            Some(Theme::Dark) => Palette {
                accent: "\x1b[1;96m",
                muted: "\x1b[90m",
                reset: "\x1b[0m",
            },
            Some(Theme::Light) => Palette {
                accent: "\x1b[1;34m",
                muted: "\x1b[2;37m",
                reset: "\x1b[0m",
            },
            None => Palette {
                accent: "",
                muted: "",
                reset: "",
            },
        }
    }
}

impl DashboardView {
    /// Plain-text layout; `None` disables colour.
    pub fn to_text(&self, theme: Option<Theme>) -> String {
        let p = Palette::for_theme(theme);
        let mut out = String::new();

        let _ = writeln!(out, "{}{}{}", p.accent, self.header.location, p.reset);
        let _ = writeln!(
            out,
            "{}{} · {}{}",
            p.muted, self.header.date, self.header.source_label, p.reset
        );
        if let Some(hint) = self.header.hint {
            let _ = writeln!(out, "{}📊 {hint}{}", p.muted, p.reset);
        }
        let _ = writeln!(out);

        let _ = writeln!(
            out,
            "{}  {}{}{}  {}",
            self.current.glyph,
            p.accent,
            self.current.temperature,
            p.reset,
            self.current.condition
        );
        let _ = writeln!(out, "{}{}{}", p.muted, self.current.feels_like, p.reset);
        let _ = writeln!(out);

        for detail in &self.details {
            let _ = writeln!(out, "  {:<11} {}", detail.label, detail.value);
        }

        if !self.hourly.is_empty() {
            let _ = writeln!(out, "\n{}Hourly{}", p.accent, p.reset);
            for row in &self.hourly {
                match row {
                    HourlyRow::DaySeparator(day) => {
                        let _ = writeln!(out, "{}── {day} ──{}", p.muted, p.reset);
                    }
                    HourlyRow::Hour {
                        time,
                        glyph,
                        temperature,
                        extras,
                        ..
                    } => {
                        let _ = write!(out, "  {time:>5}  {glyph}  {temperature:>5}");
                        if let Some(extras) = extras {
                            let _ = write!(out, "  {extras}");
                        }
                        let _ = writeln!(out);
                    }
                }
            }
        }

        if !self.daily.is_empty() {
            let _ = writeln!(out, "\n{}Daily{}", p.accent, p.reset);
            for day in &self.daily {
                let _ = writeln!(
                    out,
                    "  {:<10} {}{:<7}{} {}  {:>5} / {:<5} {}",
                    day.day, p.muted, day.date, p.reset, day.glyph, day.high, day.low, day.condition
                );
            }
        }

        out
    }
}

impl HourlyDetail {
    pub fn to_text(&self) -> String {
        let mut out = format!("Hourly Details · {}\n", self.time);
        for row in &self.rows {
            let _ = writeln!(out, "  {:<13} {}", row.label, row.value);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        geo::GeoPoint,
        model::{CurrentConditions, DailyPoint},
    };
    use chrono::{Duration, TimeZone};

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 5, 18, 0, 0)
            .single()
            .expect("valid instant")
    }

    fn hour(i: i64) -> HourlyPoint {
        HourlyPoint {
            time: start() + Duration::hours(i),
            temperature_c: 0.0,
            feels_like_c: -2.0,
            icon: "01n".into(),
            condition: "clear sky".into(),
            humidity_pct: 50,
            wind_kmh: 10.0,
            wind_deg: 90.0,
            pressure_hpa: 1012.0,
            clouds_pct: 0,
            precipitation_mm: if i == 0 { 1.25 } else { 0.0 },
            snow_mm: 0.0,
            uv_index: 0.0,
        }
    }

    fn day(i: i64) -> DailyPoint {
        DailyPoint {
            date: start() + Duration::days(i),
            high_c: 100.0,
            low_c: -40.0,
            morning_c: None,
            evening_c: None,
            night_c: None,
            condition: "clear sky".into(),
            icon: "01d".into(),
            humidity_pct: None,
            wind_kmh: None,
            wind_deg: None,
            pressure_hpa: None,
            clouds_pct: None,
            precipitation_mm: 0.0,
            snow_mm: 0.0,
            uv_index: None,
            sunrise: None,
            sunset: None,
            moon_phase: None,
        }
    }

    fn snapshot(hours: i64, days: i64, timezone: Option<Zone>) -> WeatherSnapshot {
        WeatherSnapshot {
            location_name: "Tehran, Tehran".into(),
            coordinates: Some(GeoPoint::new(35.6892, 51.389)),
            timezone,
            current: CurrentConditions {
                temperature_c: 21.5,
                feels_like_c: 20.4,
                condition: "clear sky".into(),
                icon: "01d".into(),
                humidity_pct: 30,
                wind_kmh: 18.0,
                wind_deg: 45.0,
                pressure_hpa: 1015.0,
                visibility_km: 10.0,
                uv_index: 4.6,
                clouds_pct: 0,
                dew_point_c: None,
                sunrise: None,
                sunset: None,
            },
            hourly: (0..hours).map(hour).collect(),
            daily: (0..days).map(day).collect(),
            provenance: Provenance::OneCall,
            fetched_at: start(),
        }
    }

    fn utc_options(unit: TemperatureUnit) -> ViewOptions {
        ViewOptions {
            unit,
            viewer_zone: Zone::utc(),
        }
    }

    fn hours_in(view: &DashboardView) -> usize {
        view.hourly
            .iter()
            .filter(|r| matches!(r, HourlyRow::Hour { .. }))
            .count()
    }

    fn separators(view: &DashboardView) -> usize {
        view.hourly.len() - hours_in(view)
    }

    #[test]
    fn fahrenheit_conversion_is_rounded() {
        let view = render(&snapshot(1, 1, None), &utc_options(TemperatureUnit::Fahrenheit));
        assert_eq!(view.current.temperature, "71°");
        assert_eq!(view.daily[0].high, "212°");
        assert_eq!(view.daily[0].low, "-40°");
        assert!(matches!(&view.hourly[1], HourlyRow::Hour { temperature, .. } if temperature == "32°"));
    }

    #[test]
    fn celsius_rounds_halves_up() {
        let view = render(&snapshot(0, 0, None), &utc_options(TemperatureUnit::Celsius));
        assert_eq!(view.current.temperature, "22°");
        assert_eq!(view.current.feels_like, "Feels like 20°");
    }

    #[test]
    fn windows_are_truncated() {
        let view = render(&snapshot(60, 10, None), &utc_options(TemperatureUnit::Celsius));
        assert_eq!(hours_in(&view), HOURLY_LIMIT);
        assert_eq!(view.daily.len(), DAILY_LIMIT);
    }

    #[test]
    fn hourly_is_grouped_in_snapshot_zone() {
        // 18:00Z plus 48 hours spans three UTC dates.
        let utc = render(&snapshot(48, 0, None), &utc_options(TemperatureUnit::Celsius));
        assert_eq!(separators(&utc), 3);

        // In Tehran 18:00Z is already 21:30, so the fourth hour starts a new day.
        let tehran = render(
            &snapshot(48, 0, Some(Zone::Named("Asia/Tehran".into()))),
            &utc_options(TemperatureUnit::Celsius),
        );
        assert_eq!(separators(&tehran), 3);
        assert!(matches!(&tehran.hourly[0], HourlyRow::DaySeparator(d) if d == "Mon, Jan 5"));
        assert!(matches!(&tehran.hourly[4], HourlyRow::DaySeparator(d) if d == "Tue, Jan 6"));
    }

    #[test]
    fn viewer_zone_used_without_snapshot_zone() {
        let options = ViewOptions {
            unit: TemperatureUnit::Celsius,
            viewer_zone: Zone::OffsetSeconds(6 * 3600),
        };
        let view = render(&snapshot(2, 0, None), &options);
        // 18:00Z is midnight at +06:00.
        assert!(matches!(&view.hourly[0], HourlyRow::DaySeparator(d) if d == "Tue, Jan 6"));
        assert!(matches!(&view.hourly[1], HourlyRow::Hour { time, .. } if time == "12 AM"));
    }

    #[test]
    fn daily_labels() {
        let view = render(&snapshot(0, 3, None), &utc_options(TemperatureUnit::Celsius));
        let labels: Vec<_> = view.daily.iter().map(|d| d.day.as_str()).collect();
        assert_eq!(labels, vec!["Today", "Tomorrow", "Wednesday"]);
        assert_eq!(view.daily[2].date, "Jan 7");
    }

    #[test]
    fn render_is_idempotent() {
        let snap = snapshot(48, 7, Some(Zone::Named("Asia/Tehran".into())));
        let options = utc_options(TemperatureUnit::Fahrenheit);
        assert_eq!(render(&snap, &options), render(&snap, &options));
    }

    #[test]
    fn details_include_compass_direction() {
        let view = render(&snapshot(0, 0, None), &utc_options(TemperatureUnit::Celsius));
        let wind = view.details.iter().find(|d| d.label == "Wind").expect("wind row");
        assert_eq!(wind.value, "18 km/h NE");
        let uv = view.details.iter().find(|d| d.label == "UV Index").expect("uv row");
        assert_eq!(uv.value, "4.6");
    }

    #[test]
    fn sample_snapshots_carry_a_hint() {
        let mut snap = snapshot(0, 0, None);
        snap.provenance = Provenance::Sample;
        let view = render(&snap, &utc_options(TemperatureUnit::Celsius));
        assert_eq!(view.header.source_label, "Sample Data");
        assert!(view.header.hint.is_some());
        assert!(view.to_text(None).contains("Sample Data"));
    }

    #[test]
    fn hourly_detail_lists_precipitation_only_when_present() {
        let snap = snapshot(2, 0, None);
        let options = utc_options(TemperatureUnit::Celsius);
        let wet = hourly_detail(&snap, 0, &options).expect("first hour");
        assert!(wet.rows.iter().any(|r| r.label == "Precipitation" && r.value == "1.3 mm"));
        let dry = hourly_detail(&snap, 1, &options).expect("second hour");
        assert!(dry.rows.iter().all(|r| r.label != "Precipitation"));
        assert!(hourly_detail(&snap, 5, &options).is_none());
    }

    #[test]
    fn plain_text_has_no_escape_codes() {
        let view = render(&snapshot(3, 2, None), &utc_options(TemperatureUnit::Celsius));
        assert!(!view.to_text(None).contains('\x1b'));
        assert!(view.to_text(Some(Theme::Dark)).contains("\x1b[1;96m"));
        assert!(view.to_text(Some(Theme::Light)).contains("\x1b[1;34m"));
    }
}
