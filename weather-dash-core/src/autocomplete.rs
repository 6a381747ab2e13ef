//! Search-box autocomplete.
//!
//! [`SearchBox`] is the synchronous state machine a front end drives with
//! keystrokes; [`SuggestionFeed`] runs the debounced geocoding lookups and
//! cancels whichever one a newer keystroke has superseded.

use std::time::Duration;

use tokio::{sync::mpsc, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::{
    error::FetchError,
    geocode::{Geocoder, Place},
};

pub const DEBOUNCE: Duration = Duration::from_millis(300);
pub const MAX_SUGGESTIONS: usize = 8;
/// Shorter input hides the list without searching.
pub const MIN_QUERY_LEN: usize = 2;

/// A lookup the front end should run after the debounce delay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingQuery {
    pub query: String,
    pub generation: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchState {
    Idle,
    /// Waiting for the results of `generation`.
    Typing { generation: u64 },
    Listing {
        suggestions: Vec<Place>,
        highlighted: Option<usize>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Down,
    Up,
    Enter,
    Escape,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchAction {
    None,
    Highlighted(usize),
    /// Fetch weather for this suggestion.
    Select(Place),
    /// Enter without a highlighted suggestion: run a free-text search.
    Submit(String),
    Dismissed,
}

#[derive(Debug, Clone)]
pub struct SearchBox {
    text: String,
    state: SearchState,
    generation: u64,
}

impl Default for SearchBox {
    fn default() -> Self {
        Self {
            text: String::new(),
            state: SearchState::Idle,
            generation: 0,
        }
    }
}

impl SearchBox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn suggestions(&self) -> &[Place] {
        match &self.state {
            SearchState::Listing { suggestions, .. } => suggestions,
            _ => &[],
        }
    }

    pub fn highlighted(&self) -> Option<usize> {
        match &self.state {
            SearchState::Listing { highlighted, .. } => *highlighted,
            _ => None,
        }
    }

    /// Replace the input text. Returns the lookup to schedule, if any.
    ///
    /// Every call supersedes whatever lookup was outstanding.
    pub fn input(&mut self, text: &str) -> Option<PendingQuery> {
        self.text = text.to_string();
        self.generation += 1;

        let query = text.trim();
        if query.chars().count() < MIN_QUERY_LEN {
            self.state = SearchState::Idle;
            return None;
        }

        self.state = SearchState::Typing {
            generation: self.generation,
        };
        Some(PendingQuery {
            query: query.to_string(),
            generation: self.generation,
        })
    }

    /// Show results for `generation`. Returns `false` and ignores them when stale.
    pub fn deliver(&mut self, generation: u64, mut results: Vec<Place>) -> bool {
        match self.state {
            SearchState::Typing { generation: waiting } if waiting == generation => {
                results.truncate(MAX_SUGGESTIONS);
                self.state = SearchState::Listing {
                    suggestions: results,
                    highlighted: None,
                };
                true
            }
            _ => {
                debug!("Dropping stale suggestions for generation {generation}");
                false
            }
        }
    }

    pub fn key(&mut self, key: Key) -> SearchAction {
        match key {
            Key::Down | Key::Up => self.step(key == Key::Down),
            Key::Enter => {
                let picked = match &self.state {
                    SearchState::Listing {
                        suggestions,
                        highlighted: Some(i),
                    } => suggestions.get(*i).cloned(),
                    _ => None,
                };
                self.close();
                match picked {
                    Some(place) => SearchAction::Select(place),
                    None => SearchAction::Submit(self.text.trim().to_string()),
                }
            }
            Key::Escape => {
                if self.state == SearchState::Idle {
                    return SearchAction::None;
                }
                self.close();
                SearchAction::Dismissed
            }
        }
    }

    fn step(&mut self, forward: bool) -> SearchAction {
        let SearchState::Listing {
            suggestions,
            highlighted,
        } = &mut self.state
        else {
            return SearchAction::None;
        };
        let len = suggestions.len();
        if len == 0 {
            return SearchAction::None;
        }

        let next = match (*highlighted, forward) {
            (None, true) => 0,
            (Some(i), true) => (i + 1) % len,
            (None | Some(0), false) => len - 1,
            (Some(i), false) => i - 1,
        };
        *highlighted = Some(next);
        SearchAction::Highlighted(next)
    }

    fn close(&mut self) {
        self.generation += 1;
        self.state = SearchState::Idle;
    }
}

/// Result of one debounced lookup.
#[derive(Debug)]
pub struct SuggestionBatch {
    pub generation: u64,
    pub query: String,
    pub result: Result<Vec<Place>, FetchError>,
}

/// Runs debounced geocoding lookups; at most one is live at a time.
#[derive(Debug)]
pub struct SuggestionFeed {
    geocoder: Geocoder,
    delay: Duration,
    tx: mpsc::UnboundedSender<SuggestionBatch>,
    current: Option<CancellationToken>,
}

impl SuggestionFeed {
    pub fn new(geocoder: Geocoder, tx: mpsc::UnboundedSender<SuggestionBatch>) -> Self {
        Self {
            geocoder,
            delay: DEBOUNCE,
            tx,
            current: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Cancel the live lookup, if any, and start one for `pending`.
    pub fn schedule(&mut self, pending: PendingQuery) -> JoinHandle<()> {
        self.cancel();
        let token = CancellationToken::new();
        self.current = Some(token.clone());

        let geocoder = self.geocoder.clone();
        let tx = self.tx.clone();
        let delay = self.delay;

        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    debug!("Lookup for '{}' cancelled during debounce", pending.query);
                    return;
                }
                _ = tokio::time::sleep(delay) => {}
            }

            let result = tokio::select! {
                _ = token.cancelled() => {
                    debug!("Lookup for '{}' cancelled in flight", pending.query);
                    return;
                }
                result = geocoder.search(&pending.query, MAX_SUGGESTIONS) => result,
            };

            // The receiver may already be gone when the front end has closed.
            let _ = tx.send(SuggestionBatch {
                generation: pending.generation,
                query: pending.query,
                result,
            });
        })
    }

    pub fn cancel(&mut self) {
        if let Some(token) = self.current.take() {
            token.cancel();
        }
    }
}

impl Drop for SuggestionFeed {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geocode::sample_places;

    fn listing(n: usize) -> SearchBox {
        let mut search = SearchBox::new();
        let pending = search.input("an").expect("long enough");
        let places: Vec<Place> = sample_places("").into_iter().cycle().take(n).collect();
        assert!(search.deliver(pending.generation, places));
        search
    }

    #[test]
    fn short_input_does_not_search() {
        let mut search = SearchBox::new();
        assert!(search.input("t").is_none());
        assert!(search.input("  t ").is_none());
        assert_eq!(search.state(), &SearchState::Idle);
        assert_eq!(search.input(" te").map(|p| p.query), Some("te".to_string()));
    }

    #[test]
    fn down_wraps_to_first() {
        let mut search = listing(3);
        let steps: Vec<_> = (0..4).map(|_| search.key(Key::Down)).collect();
        assert_eq!(
            steps,
            vec![
                SearchAction::Highlighted(0),
                SearchAction::Highlighted(1),
                SearchAction::Highlighted(2),
                SearchAction::Highlighted(0),
            ]
        );
    }

    #[test]
    fn up_wraps_to_last() {
        let mut search = listing(3);
        assert_eq!(search.key(Key::Up), SearchAction::Highlighted(2));
        assert_eq!(search.key(Key::Up), SearchAction::Highlighted(1));
        search.key(Key::Up);
        assert_eq!(search.key(Key::Up), SearchAction::Highlighted(2));
    }

    #[test]
    fn navigation_is_inert_without_suggestions() {
        let mut search = listing(0);
        assert_eq!(search.key(Key::Down), SearchAction::None);
        assert_eq!(search.highlighted(), None);
    }

    #[test]
    fn results_are_capped() {
        let search = listing(12);
        assert_eq!(search.suggestions().len(), MAX_SUGGESTIONS);
    }

    #[test]
    fn enter_selects_highlighted_and_closes() {
        let mut search = listing(3);
        search.key(Key::Down);
        search.key(Key::Down);
        let expected = search.suggestions()[1].clone();
        assert_eq!(search.key(Key::Enter), SearchAction::Select(expected));
        assert_eq!(search.state(), &SearchState::Idle);
    }

    #[test]
    fn enter_without_highlight_submits_text() {
        let mut search = listing(3);
        assert_eq!(search.key(Key::Enter), SearchAction::Submit("an".into()));
    }

    #[test]
    fn escape_dismisses_and_drops_late_results() {
        let mut search = SearchBox::new();
        let pending = search.input("par").expect("long enough");
        assert_eq!(search.key(Key::Escape), SearchAction::Dismissed);
        assert!(!search.deliver(pending.generation, sample_places("par")));
        assert_eq!(search.key(Key::Escape), SearchAction::None);
    }

    #[test]
    fn newer_input_supersedes_older_results() {
        let mut search = SearchBox::new();
        let old = search.input("lo").expect("long enough");
        let new = search.input("lon").expect("long enough");
        assert!(!search.deliver(old.generation, sample_places("lo")));
        assert!(search.deliver(new.generation, sample_places("lon")));
        assert_eq!(search.suggestions()[0].name, "London");
    }

    #[tokio::test(start_paused = true)]
    async fn feed_delivers_after_debounce() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut feed = SuggestionFeed::new(Geocoder::new("http://unused.invalid", None), tx);
        let mut search = SearchBox::new();

        let handle = feed.schedule(search.input("tok").expect("long enough"));
        handle.await.expect("task completes");

        let batch = rx.recv().await.expect("one batch");
        let places = batch.result.expect("sample search");
        assert!(search.deliver(batch.generation, places));
        assert_eq!(search.suggestions()[0].name, "Tokyo");
    }

    #[tokio::test(start_paused = true)]
    async fn rescheduling_cancels_previous_lookup() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut feed = SuggestionFeed::new(Geocoder::new("http://unused.invalid", None), tx);
        let mut search = SearchBox::new();

        let first = feed.schedule(search.input("lo").expect("long enough"));
        let second = feed.schedule(search.input("lon").expect("long enough"));
        first.await.expect("first task ends");
        second.await.expect("second task ends");
        drop(feed);

        let batch = rx.recv().await.expect("one batch");
        assert_eq!(batch.query, "lon");
        assert!(rx.recv().await.is_none());
    }
}
