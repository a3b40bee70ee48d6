//! City autocomplete: a TTL cache in front of the geocoder and a debouncer that
//! turns a stream of keystrokes into at most one lookup per pause in typing.

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use parking_lot::Mutex;
use tokio::{sync::watch, task::JoinHandle, time::Instant};

use crate::{config::SuggestConfig, model::SuggestionRecord, provider::CitySearch};

/// Queries shorter than this (after trimming) never reach the geocoder.
pub const MIN_QUERY_CHARS: usize = 2;

/// Lowercased, trimmed cache key, or `None` if the query is too short.
pub fn normalize_query(raw: &str) -> Option<String> {
    let key = raw.trim().to_lowercase();
    (key.chars().count() >= MIN_QUERY_CHARS).then_some(key)
}

#[derive(Debug)]
struct CachedSuggestions {
    fetched_at: Instant,
    records: Vec<SuggestionRecord>,
}

/// Result sets keyed by normalized query. Stale entries are dropped when read.
#[derive(Debug)]
pub struct SuggestionCache {
    ttl: Duration,
    entries: HashMap<String, CachedSuggestions>,
}

impl SuggestionCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    pub fn get(&mut self, key: &str, now: Instant) -> Option<Vec<SuggestionRecord>> {
        let cached = self.entries.get(key)?;
        if now.saturating_duration_since(cached.fetched_at) < self.ttl {
            return Some(cached.records.clone());
        }
        self.entries.remove(key);
        None
    }

    pub fn insert(&mut self, key: String, records: Vec<SuggestionRecord>, now: Instant) {
        self.entries.insert(
            key,
            CachedSuggestions {
                fetched_at: now,
                records,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Cached autocomplete lookups over a [`CitySearch`] source.
#[derive(Debug)]
pub struct Suggester<S> {
    source: S,
    cache: Mutex<SuggestionCache>,
}

impl<S: CitySearch> Suggester<S> {
    pub fn new(source: S, ttl: Duration) -> Self {
        Self {
            source,
            cache: Mutex::new(SuggestionCache::new(ttl)),
        }
    }

    pub fn from_config(source: S, config: &SuggestConfig) -> Self {
        Self::new(source, config.ttl())
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Suggestions for `raw`, served from the cache when fresh.
    ///
    /// Lookup failures yield an empty list and are not cached.
    pub async fn lookup(&self, raw: &str) -> Vec<SuggestionRecord> {
        let Some(key) = normalize_query(raw) else {
            return Vec::new();
        };

        let now = Instant::now();
        let cached = self.cache.lock().get(&key, now);
        if let Some(records) = cached {
            tracing::trace!(query = %key, "suggestion cache hit");
            return records;
        }

        match self.source.search_cities(raw.trim()).await {
            Ok(records) => {
                tracing::debug!(query = %key, count = records.len(), "suggestions fetched");
                self.cache.lock().insert(key, records.clone(), now);
                records
            }
            Err(err) => {
                tracing::debug!(query = %key, error = %format!("{err:#}"), "suggestion lookup failed");
                Vec::new()
            }
        }
    }
}

/// Runs [`Suggester::lookup`] once typing pauses for the quiet period.
///
/// Every keystroke cancels the pending lookup. Results are published on a
/// watch channel only if no newer keystroke arrived while the lookup ran.
#[derive(Debug)]
pub struct Debouncer<S> {
    suggester: Arc<Suggester<S>>,
    quiet: Duration,
    generation: Arc<AtomicU64>,
    pending: Mutex<Option<JoinHandle<()>>>,
    results: Arc<watch::Sender<Vec<SuggestionRecord>>>,
}

impl<S: CitySearch + 'static> Debouncer<S> {
    pub fn new(suggester: Arc<Suggester<S>>, quiet: Duration) -> Self {
        let (results, _) = watch::channel(Vec::new());
        Self {
            suggester,
            quiet,
            generation: Arc::new(AtomicU64::new(0)),
            pending: Mutex::new(None),
            results: Arc::new(results),
        }
    }

    pub fn from_config(suggester: Arc<Suggester<S>>, config: &SuggestConfig) -> Self {
        Self::new(suggester, config.debounce())
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<SuggestionRecord>> {
        self.results.subscribe()
    }

    pub fn suggester(&self) -> &Arc<Suggester<S>> {
        &self.suggester
    }

    /// Records a keystroke. Must be called from within a Tokio runtime.
    pub fn input(&self, raw: &str) {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let suggester = Arc::clone(&self.suggester);
        let generation = Arc::clone(&self.generation);
        let results = Arc::clone(&self.results);
        let quiet = self.quiet;
        let raw = raw.to_string();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(quiet).await;
            let records = suggester.lookup(&raw).await;
            if generation.load(Ordering::SeqCst) == ticket {
                results.send_replace(records);
            } else {
                tracing::trace!(ticket, "dropping superseded suggestions");
            }
        });

        if let Some(previous) = self.pending.lock().replace(handle) {
            previous.abort();
        }
    }

    /// Cancels any pending lookup and empties the published list, e.g. once a
    /// suggestion has been picked.
    pub fn clear(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(previous) = self.pending.lock().take() {
            previous.abort();
        }
        self.results.send_replace(Vec::new());
    }
}

impl<S> Drop for Debouncer<S> {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.get_mut().take() {
            pending.abort();
        }
    }
}
