// src/app/search.rs
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, error, info};

use crate::app::catalog::{CatalogError, CatalogSource};
use crate::app::debounce::Debouncer;
use crate::app::ledger::PopularityLedger;
use crate::app::types::{CatalogDone, FetchState, MovieSummary};

pub const NO_MOVIES_FOUND: &str = "No movies found";
pub const FETCH_ERROR_MESSAGE: &str = "Error fetching movies. Please try again later.";
pub const MISCONFIGURED_MESSAGE: &str = "Missing TMDB API key. Set TMDB_API_KEY and restart.";

const MAX_DONE_PER_FRAME: usize = 8;

/// Ledger key for a query: trimmed and lowercased so "Batman " and "batman" share a counter.
pub fn ledger_key(query: &str) -> String {
    query.trim().to_lowercase()
}

/// Follow-up write requested by a successful non-empty search.
#[derive(Clone, Debug, PartialEq)]
pub struct LedgerWrite {
    pub key: String,
    pub top_result: MovieSummary,
}

/// Fetch-cycle state machine. Every cycle gets a fresh generation; only the
/// completion carrying the current generation may change what is shown.
pub struct SearchOrchestrator {
    generation: u64,
    active_query: String,
    state: FetchState,
}

impl Default for SearchOrchestrator {
    fn default() -> Self {
        Self {
            generation: 0,
            active_query: String::new(),
            state: FetchState::Idle,
        }
    }
}

impl SearchOrchestrator {
    /// Start a cycle for `query`; anything still in flight becomes stale.
    pub fn begin_cycle(&mut self, query: &str) -> u64 {
        self.generation += 1;
        self.active_query = query.to_string();
        self.state = FetchState::Loading;
        self.generation
    }

    /// Apply a completion. Returns the ledger write to dispatch, if any.
    pub fn resolve(&mut self, done: CatalogDone) -> Option<LedgerWrite> {
        if done.generation != self.generation || self.state != FetchState::Loading {
            debug!(
                "Dropping stale result for `{}` (cycle {}, current {})",
                done.query, done.generation, self.generation
            );
            return None;
        }

        match done.result {
            Ok(results) if results.is_empty() => {
                info!("No movies found for `{}`", done.query);
                self.state = FetchState::Shown(results);
                None
            }
            Ok(results) => {
                let key = ledger_key(&done.query);
                let write = (!key.is_empty()).then(|| LedgerWrite {
                    key,
                    top_result: results[0].clone(),
                });
                self.state = FetchState::Shown(results);
                write
            }
            Err(CatalogError::Misconfigured(err)) => {
                error!("Error fetching movies: {err}");
                self.state = FetchState::Errored(MISCONFIGURED_MESSAGE.into());
                None
            }
            Err(err) => {
                error!("Error fetching movies: {err}");
                self.state = FetchState::Errored(FETCH_ERROR_MESSAGE.into());
                None
            }
        }
    }

    pub fn state(&self) -> &FetchState {
        &self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn active_query(&self) -> &str {
        &self.active_query
    }

    pub fn is_loading(&self) -> bool {
        self.state == FetchState::Loading
    }

    /// Text shown in place of the results list, if any.
    pub fn message(&self) -> Option<&str> {
        match &self.state {
            FetchState::Errored(msg) => Some(msg.as_str()),
            FetchState::Shown(results) if results.is_empty() => Some(NO_MOVIES_FOUND),
            _ => None,
        }
    }

    pub fn results(&self) -> &[MovieSummary] {
        match &self.state {
            FetchState::Shown(results) => results,
            _ => &[],
        }
    }
}

/// Wires the debounce gate, the orchestrator and the worker threads together.
/// Owned by the UI thread and pumped once per frame.
pub struct SearchSession {
    catalog: Arc<dyn CatalogSource>,
    ledger: Arc<dyn PopularityLedger>,
    debounce: Debouncer,
    orchestrator: SearchOrchestrator,
    done_tx: Sender<CatalogDone>,
    done_rx: Receiver<CatalogDone>,
}

impl SearchSession {
    /// Creates the session and immediately fires the browse-popular cycle.
    pub fn start(
        catalog: Arc<dyn CatalogSource>,
        ledger: Arc<dyn PopularityLedger>,
        debounce_delay: Duration,
    ) -> Self {
        let (done_tx, done_rx) = mpsc::channel();
        let mut session = Self {
            catalog,
            ledger,
            debounce: Debouncer::new(debounce_delay, ""),
            orchestrator: SearchOrchestrator::default(),
            done_tx,
            done_rx,
        };
        session.start_cycle(String::new());
        session
    }

    /// Feed the live search box text.
    pub fn input_changed(&mut self, text: &str, now: Instant) {
        self.debounce.observe(text, now);
    }

    /// Settle debounced input and apply finished fetches. Returns true if anything changed.
    pub fn pump(&mut self, now: Instant) -> bool {
        let mut changed = false;

        if let Some(query) = self.debounce.poll(now) {
            self.start_cycle(query);
            changed = true;
        }

        for _ in 0..MAX_DONE_PER_FRAME {
            match self.done_rx.try_recv() {
                Ok(done) => {
                    let current = done.generation == self.orchestrator.generation();
                    if let Some(write) = self.orchestrator.resolve(done) {
                        self.spawn_ledger_write(write);
                    }
                    changed |= current;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }

        changed
    }

    fn start_cycle(&mut self, query: String) {
        let generation = self.orchestrator.begin_cycle(&query);
        debug!("Fetch cycle {generation} for `{query}`");

        let catalog = Arc::clone(&self.catalog);
        let tx = self.done_tx.clone();
        thread::spawn(move || {
            let result = catalog.fetch_catalog(&query);
            let _ = tx.send(CatalogDone {
                generation,
                query,
                result,
            });
        });
    }

    // Fire and forget: the outcome is only logged by the ledger.
    fn spawn_ledger_write(&self, write: LedgerWrite) {
        let ledger = Arc::clone(&self.ledger);
        thread::spawn(move || {
            ledger.record_search(&write.key, &write.top_result);
        });
    }

    pub fn orchestrator(&self) -> &SearchOrchestrator {
        &self.orchestrator
    }

    pub fn settled_query(&self) -> &str {
        self.debounce.settled()
    }

    /// How soon the UI should wake up again without user input.
    pub fn next_wakeup(&self, now: Instant) -> Option<Duration> {
        let debounce = self.debounce.time_remaining(now);
        let loading = self
            .orchestrator
            .is_loading()
            .then_some(Duration::from_millis(50));
        match (debounce, loading) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}
