//! Interactive prompts built on `inquire`.

use std::{
    fmt,
    sync::{Arc, Mutex},
    time::Duration,
};

use anyhow::{Context, Result, anyhow};
use inquire::{
    Autocomplete, Confirm, CustomUserError, Password, PasswordDisplayMode, Select, Text,
    autocompletion::Replacement,
};
use tokio::{runtime::Handle, sync::mpsc};
use tracing::{debug, warn};
use weather_dash_core::{
    Capital, Config, DeviceConfig, GeoPoint, TemperatureUnit,
    autocomplete::{DEBOUNCE, SearchBox, SuggestionBatch, SuggestionFeed},
    capitals::{self, PopulationTier},
    geocode::{Geocoder, Place},
};

/// Longest wait for a lookup once the debounce has passed; covers the HTTP timeout.
const LOOKUP_WAIT: Duration = Duration::from_secs(12);

/// What the user picked in the search prompt.
pub enum SearchChoice {
    Place(Place),
    Text(String),
}

/// Reports whether more keystrokes arrive within the given time.
type KeyCheck = fn(Duration) -> bool;

/// Peeks at the terminal without consuming input; `inquire` reads it next.
fn terminal_keys_pending(within: Duration) -> bool {
    crossterm::event::poll(within).unwrap_or(false)
}

/// Search box fed by debounced lookups.
struct LiveSearch {
    search: SearchBox,
    feed: SuggestionFeed,
    batches: mpsc::UnboundedReceiver<SuggestionBatch>,
}

impl LiveSearch {
    fn new(geocoder: Geocoder) -> Self {
        let (tx, batches) = mpsc::unbounded_channel();
        Self {
            search: SearchBox::new(),
            feed: SuggestionFeed::new(geocoder, tx),
            batches,
        }
    }

    /// Listing for `input`. The lookup is only awaited once typing has paused
    /// for [`DEBOUNCE`]; a keystroke before that leaves it to be cancelled by
    /// the next call.
    fn update(&mut self, input: &str, runtime: &Handle, keys_pending: KeyCheck) -> Vec<Place> {
        let Some(pending) = self.search.input(input) else {
            self.feed.cancel();
            return Vec::new();
        };
        let generation = pending.generation;
        {
            let _guard = runtime.enter();
            self.feed.schedule(pending);
        }

        if keys_pending(DEBOUNCE) {
            debug!("Still typing; lookup #{generation} left pending");
            return Vec::new();
        }

        let batches = &mut self.batches;
        let received = runtime.block_on(async {
            tokio::time::timeout(LOOKUP_WAIT, async {
                while let Some(batch) = batches.recv().await {
                    if batch.generation == generation {
                        return Some(batch);
                    }
                }
                None
            })
            .await
        });

        let places = match received {
            Ok(Some(batch)) => batch.result.unwrap_or_else(|e| {
                warn!("Suggestions for '{}' unavailable: {e}", batch.query);
                Vec::new()
            }),
            Ok(None) | Err(_) => {
                warn!("No suggestions arrived for '{}'", input.trim());
                Vec::new()
            }
        };
        self.search.deliver(generation, places);
        self.search.suggestions().to_vec()
    }
}

/// Suggestion source for `inquire`: looks places up as the user types and
/// remembers what it offered so a picked line maps back to its [`Place`].
#[derive(Clone)]
struct PlaceCompleter {
    runtime: Handle,
    keys_pending: KeyCheck,
    live: Arc<Mutex<LiveSearch>>,
    offered: Arc<Mutex<Vec<Place>>>,
}

impl PlaceCompleter {
    fn new(geocoder: &Geocoder, runtime: Handle, keys_pending: KeyCheck) -> Self {
        Self {
            runtime,
            keys_pending,
            live: Arc::new(Mutex::new(LiveSearch::new(geocoder.clone()))),
            offered: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn line(place: &Place) -> String {
        format!("{}  {}", place.display_name(), place.details())
    }

    fn picked(&self, answer: &str) -> Result<Option<Place>> {
        Ok(self
            .offered
            .lock()
            .map_err(|_| anyhow!("Suggestion list is unavailable"))?
            .iter()
            .find(|p| Self::line(p) == answer)
            .cloned())
    }
}

impl Autocomplete for PlaceCompleter {
    fn get_suggestions(&mut self, input: &str) -> Result<Vec<String>, CustomUserError> {
        let suggestions = self
            .live
            .lock()
            .map_err(|_| "suggestion state is unavailable")?
            .update(input, &self.runtime, self.keys_pending);

        let lines = suggestions.iter().map(Self::line).collect();
        if let Ok(mut offered) = self.offered.lock() {
            *offered = suggestions;
        }
        Ok(lines)
    }

    fn get_completion(
        &mut self,
        _input: &str,
        highlighted_suggestion: Option<String>,
    ) -> Result<Replacement, CustomUserError> {
        Ok(highlighted_suggestion)
    }
}

/// Free-text location prompt with live suggestions.
///
/// Must run on a multi-threaded runtime: the prompt blocks its thread while
/// suggestions are fetched on the runtime.
pub fn search(geocoder: &Geocoder, initial: Option<&str>) -> Result<SearchChoice> {
    let completer = PlaceCompleter::new(geocoder, Handle::current(), terminal_keys_pending);
    let help = if geocoder.is_configured() {
        "Type at least 2 characters; ↑↓ to move, Enter to pick, Esc to cancel"
    } else {
        "No API key: suggestions come from a few sample places"
    };

    let answer = tokio::task::block_in_place(|| {
        let mut prompt = Text::new("Search location:")
            .with_autocomplete(completer.clone())
            .with_help_message(help);
        if let Some(initial) = initial {
            prompt = prompt.with_initial_value(initial);
        }
        prompt.prompt()
    })
    .context("Search cancelled")?;

    Ok(match completer.picked(&answer)? {
        Some(place) => SearchChoice::Place(place),
        None => SearchChoice::Text(answer.trim().to_string()),
    })
}

struct CapitalOption(&'static Capital);

impl fmt::Display for CapitalOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = match self.0.tier() {
            PopulationTier::Large => "●",
            PopulationTier::Medium => "◐",
            PopulationTier::Small => "○",
        };
        write!(f, "{marker} {}", self.0.label())
    }
}

/// Capital picker, largest population first.
pub fn capital() -> Result<&'static Capital> {
    let options: Vec<CapitalOption> = capitals::by_population()
        .into_iter()
        .map(CapitalOption)
        .collect();

    let picked = Select::new("Iranian provincial capital:", options)
        .with_page_size(12)
        .prompt()
        .context("No capital selected")?;
    Ok(picked.0)
}

pub fn parse_point(value: &str) -> Result<GeoPoint, String> {
    let (lat, lon) = value
        .split_once(',')
        .ok_or_else(|| format!("expected LAT,LON, got '{value}'"))?;
    let lat: f64 = lat
        .trim()
        .parse()
        .map_err(|_| format!("invalid latitude '{}'", lat.trim()))?;
    let lon: f64 = lon
        .trim()
        .parse()
        .map_err(|_| format!("invalid longitude '{}'", lon.trim()))?;

    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err(format!("coordinates out of range: {lat}, {lon}"));
    }
    Ok(GeoPoint::new(lat, lon))
}

/// Only the last four characters of a stored key are shown.
fn masked(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
    format!("••••{tail}")
}

/// Blank keeps the stored key, `-` removes it, anything else replaces it.
fn apply_api_key(config: &mut Config, answer: &str) {
    match answer.trim() {
        "" => {}
        "-" => config.api_key = None,
        key => config.set_api_key(key.to_string()),
    }
}

/// Interactive edit of the stored configuration.
pub fn configure(config: &mut Config) -> Result<()> {
    let help = match config.api_key() {
        Some(key) => format!("Current key {}; leave empty to keep it, '-' to remove it", masked(key)),
        None => "Leave empty to keep using sample data".to_string(),
    };
    let answer = Password::new("OpenWeatherMap API key:")
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .with_help_message(&help)
        .prompt()
        .context("Failed to read API key")?;
    apply_api_key(config, &answer);

    let units = vec![TemperatureUnit::Celsius, TemperatureUnit::Fahrenheit];
    let start = units.iter().position(|u| *u == config.unit).unwrap_or(0);
    let labels: Vec<&str> = units
        .iter()
        .map(|u| match u {
            TemperatureUnit::Celsius => "Celsius (°C)",
            TemperatureUnit::Fahrenheit => "Fahrenheit (°F)",
        })
        .collect();
    let picked = Select::new("Temperature unit:", labels.clone())
        .with_starting_cursor(start)
        .prompt()
        .context("Failed to read unit")?;
    config.unit = units[labels.iter().position(|l| *l == picked).unwrap_or(0)];

    let use_device = Confirm::new("Set a fixed device position for `here --gps`?")
        .with_default(config.device.is_some())
        .prompt()
        .context("Failed to read answer")?;
    config.device = if use_device {
        let initial = config
            .device
            .map(|d| format!("{},{}", d.latitude, d.longitude))
            .unwrap_or_default();
        let raw = Text::new("Position (LAT,LON):")
            .with_initial_value(&initial)
            .with_validator(|input: &str| {
                Ok(match parse_point(input) {
                    Ok(_) => inquire::validator::Validation::Valid,
                    Err(e) => inquire::validator::Validation::Invalid(e.into()),
                })
            })
            .prompt()
            .context("Failed to read position")?;
        let point = parse_point(&raw).map_err(|e| anyhow!(e))?;
        Some(DeviceConfig {
            latitude: point.latitude,
            longitude: point.longitude,
            accuracy_m: config.device.map_or(50.0, |d| d.accuracy_m),
        })
    } else {
        None
    };

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::runtime::Runtime;

    fn completer(geocoder: Geocoder, keys_pending: KeyCheck) -> (Runtime, PlaceCompleter) {
        let runtime = Runtime::new().expect("runtime");
        let completer = PlaceCompleter::new(&geocoder, runtime.handle().clone(), keys_pending);
        (runtime, completer)
    }

    fn offline() -> Geocoder {
        Geocoder::new("http://unused.invalid", None)
    }

    #[test]
    fn unreachable_geocoder_yields_empty_listing() {
        let geocoder = Geocoder::new("http://127.0.0.1:1/geo/1.0", Some("KEY".into()));
        let (_runtime, mut completer) = completer(geocoder, |_| false);
        let lines = completer.get_suggestions("Paris").expect("lookup errors are absorbed");
        assert!(lines.is_empty());
    }

    #[test]
    fn paused_typing_lists_matches() {
        let (_runtime, mut completer) = completer(offline(), |_| false);
        let lines = completer.get_suggestions("teh").expect("suggestions");
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("Tehran, Tehran, IR"));

        let picked = completer.picked(&lines[0]).expect("list available");
        assert_eq!(picked.map(|p| p.name), Some("Tehran".to_string()));
    }

    #[test]
    fn continued_typing_defers_the_lookup() {
        let (_runtime, mut completer) = completer(offline(), |_| true);
        assert!(completer.get_suggestions("tok").expect("suggestions").is_empty());

        completer.keys_pending = |_| false;
        let lines = completer.get_suggestions("toky").expect("suggestions");
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("Tokyo, JP"));
    }

    #[test]
    fn short_input_clears_listing() {
        let (_runtime, mut completer) = completer(offline(), |_| false);
        assert!(!completer.get_suggestions("lon").expect("suggestions").is_empty());
        assert!(completer.get_suggestions("l").expect("suggestions").is_empty());
    }

    #[test]
    fn api_key_answer_keeps_replaces_or_removes() {
        let mut config = Config::default();
        config.set_api_key("OLDKEY1234".into());

        apply_api_key(&mut config, "  ");
        assert_eq!(config.api_key(), Some("OLDKEY1234"));

        apply_api_key(&mut config, " NEWKEY ");
        assert_eq!(config.api_key(), Some("NEWKEY"));

        apply_api_key(&mut config, "-");
        assert!(!config.is_api_configured());
    }

    #[test]
    fn masked_key_shows_only_its_tail() {
        assert_eq!(masked("abcdef123456"), "••••3456");
        assert_eq!(masked("ab"), "••••ab");
    }

    #[test]
    fn parses_coordinates() {
        let point = parse_point(" 35.7 , 51.4 ").expect("valid");
        assert_eq!(point, GeoPoint::new(35.7, 51.4));
    }

    #[test]
    fn rejects_bad_coordinates() {
        assert!(parse_point("35.7").is_err());
        assert!(parse_point("north,east").is_err());
        assert!(parse_point("95,10").is_err());
    }

    #[test]
    fn capital_option_marks_tier() {
        let tehran = capitals::find("Tehran").expect("capital");
        assert_eq!(CapitalOption(tehran).to_string(), "● Tehran (Tehran)");
    }
}
