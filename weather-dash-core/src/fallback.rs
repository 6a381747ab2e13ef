//! Ordered list of interchangeable sources, tried until one succeeds.

use async_trait::async_trait;
use std::fmt::Debug;
use tracing::{debug, warn};

use crate::error::{Exhausted, FetchError};

/// One upstream able to turn an `I` into an `O`.
#[async_trait]
pub trait Source<I, O>: Send + Sync + Debug {
    /// Short name used in logs and in [`Exhausted`] reports.
    fn name(&self) -> &'static str;

    async fn fetch(&self, input: &I) -> Result<O, FetchError>;
}

/// Tries each source in insertion order and returns the first success.
#[derive(Debug)]
pub struct Fallback<I, O> {
    sources: Vec<Box<dyn Source<I, O>>>,
}

impl<I, O> Default for Fallback<I, O> {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
        }
    }
}

impl<I, O> Fallback<I, O> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a source to try after the ones already added.
    pub fn then(mut self, source: impl Source<I, O> + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    pub async fn run(&self, input: &I) -> Result<O, Exhausted> {
        let mut failures = Vec::new();

        for source in &self.sources {
            match source.fetch(input).await {
                Ok(value) => {
                    debug!("{} succeeded after {} failure(s)", source.name(), failures.len());
                    return Ok(value);
                }
                Err(e) => {
                    warn!("{} failed: {e}", source.name());
                    failures.push((source.name(), e));
                }
            }
        }

        Err(Exhausted { failures })
    }
}
