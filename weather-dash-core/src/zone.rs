//! Timezone handling for forecast display and day grouping.

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, Offset, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Timezone reported with a snapshot or chosen by the viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Zone {
    /// IANA name, e.g. `"Asia/Tehran"`.
    Named(String),
    /// Fixed offset east of UTC, in seconds.
    OffsetSeconds(i32),
    /// The machine's timezone, with its daylight-saving rules.
    Local,
}

impl Zone {
    pub fn utc() -> Self {
        Zone::OffsetSeconds(0)
    }

    pub fn local() -> Self {
        Zone::Local
    }

    pub fn resolve(&self) -> Option<ResolvedZone> {
        match self {
            Zone::Named(name) => name.parse::<Tz>().ok().map(ResolvedZone::Named),
            Zone::OffsetSeconds(secs) => FixedOffset::east_opt(*secs).map(ResolvedZone::Fixed),
            Zone::Local => Some(ResolvedZone::Local),
        }
    }
}

/// A zone that can convert instants to wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResolvedZone {
    Named(Tz),
    Fixed(FixedOffset),
    /// Offset looked up per instant, so DST transitions are honoured.
    Local,
}

impl ResolvedZone {
    /// Pick `preferred` when it is present and valid, else `fallback`, else UTC.
    pub fn pick(preferred: Option<&Zone>, fallback: &Zone) -> Self {
        preferred
            .and_then(Zone::resolve)
            .or_else(|| fallback.resolve())
            .unwrap_or(ResolvedZone::Fixed(FixedOffset::east_opt(0).unwrap_or(Utc.fix())))
    }

    pub fn wall_clock(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        match self {
            ResolvedZone::Named(tz) => instant.with_timezone(tz).naive_local(),
            ResolvedZone::Fixed(offset) => instant.with_timezone(offset).naive_local(),
            ResolvedZone::Local => instant.with_timezone(&Local).naive_local(),
        }
    }

    pub fn date(&self, instant: DateTime<Utc>) -> NaiveDate {
        self.wall_clock(instant).date()
    }
}

/// Entries sharing one calendar date.
#[derive(Debug, Clone, PartialEq)]
pub struct DayGroup<'a, T> {
    pub date: NaiveDate,
    pub items: Vec<&'a T>,
}

/// Group `items` by calendar date in `zone`, in order of each date's first appearance.
pub fn group_by_day<'a, T, F>(items: &'a [T], zone: ResolvedZone, time: F) -> Vec<DayGroup<'a, T>>
where
    F: Fn(&T) -> DateTime<Utc>,
{
    let mut groups: Vec<DayGroup<'a, T>> = Vec::new();
    for item in items {
        let date = zone.date(time(item));
        match groups.iter_mut().find(|g| g.date == date) {
            Some(group) => group.items.push(item),
            None => groups.push(DayGroup {
                date,
                items: vec![item],
            }),
        }
    }
    groups
}
