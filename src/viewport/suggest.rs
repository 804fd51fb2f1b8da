use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use async_trait::async_trait;
use tokio::{sync::watch, task::JoinHandle, time::sleep};
use tracing::{debug, warn};

use super::ViewportConfig;
use crate::{error::DirectoryError, types::dto::candidate::PlaceCandidate};

/// Where typed place names are looked up.
#[async_trait]
pub trait CandidateSource: Send + Sync {
    async fn candidates(&self, query: &str) -> Result<Vec<PlaceCandidate>, DirectoryError>;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Suggestions {
    pub query: String,
    pub searching: bool,
    pub results: Vec<PlaceCandidate>,
}

/// Debounced place lookup for the authoring form.
///
/// Every keystroke restarts the timer. Only the most recently issued query may
/// publish results, whatever order the lookups finish in.
pub struct SuggestionSearch {
    source: Arc<dyn CandidateSource>,
    delay: Duration,
    min_chars: usize,
    issued: Arc<AtomicU64>,
    pending: Option<JoinHandle<()>>,
    state: Arc<watch::Sender<Suggestions>>,
}

impl SuggestionSearch {
    pub fn new(source: Arc<dyn CandidateSource>, config: &ViewportConfig) -> Self {
        let (state, _) = watch::channel(Suggestions::default());
        SuggestionSearch {
            source,
            delay: config.suggest_debounce,
            min_chars: config.suggest_min_chars,
            issued: Arc::new(AtomicU64::new(0)),
            pending: None,
            state: Arc::new(state),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Suggestions> {
        self.state.subscribe()
    }

    pub fn current(&self) -> Suggestions {
        self.state.borrow().clone()
    }

    fn restart(&mut self) -> u64 {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// The search box changed. Must be called inside a tokio runtime.
    pub fn input(&mut self, text: &str) {
        let generation = self.restart();
        let query = text.trim().to_string();
        if query.chars().count() < self.min_chars {
            self.state.send_replace(Suggestions::default());
            return;
        }

        let source = self.source.clone();
        let issued = self.issued.clone();
        let state = self.state.clone();
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            sleep(delay).await;
            if issued.load(Ordering::SeqCst) != generation {
                return;
            }
            // Later keystrokes only cancel the timer, a started lookup runs to completion
            tokio::spawn(lookup(source, issued, state, generation, query));
        }));
    }

    pub fn clear(&mut self) {
        self.restart();
        self.state.send_replace(Suggestions::default());
    }
}

async fn lookup(
    source: Arc<dyn CandidateSource>,
    issued: Arc<AtomicU64>,
    state: Arc<watch::Sender<Suggestions>>,
    generation: u64,
    query: String,
) {
    state.send_modify(|suggestions| {
        suggestions.query = query.clone();
        suggestions.searching = true;
    });
    let results = source.candidates(&query).await.unwrap_or_else(|err| {
        warn!("place suggestions failed for {query:?}: {err}");
        Vec::new()
    });
    if issued.load(Ordering::SeqCst) != generation {
        debug!("dropping stale suggestions for {query:?}");
        return;
    }
    state.send_replace(Suggestions {
        query,
        searching: false,
        results,
    });
}

impl Drop for SuggestionSearch {
    fn drop(&mut self) {
        self.restart();
    }
}
