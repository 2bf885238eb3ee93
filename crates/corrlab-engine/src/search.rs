/*
[INPUT]:  Keystrokes (term + market filter) and the caller's selection set
[OUTPUT]: At most one pending lookup; latest result batch on a watch channel
[POS]:    Concurrency unit - debounced single-flight symbol search
[UPDATE]: When debounce, supersession, or filtering rules change
*/

use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use corrlab_adapter::{ApiClient, Market, Stock};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::request::{Outcome, issue};

/// One completed lookup
#[derive(Debug, Clone, Default)]
pub struct SearchBatch {
    /// Lookup epoch that produced this batch
    pub epoch: u64,
    /// Term the lookup ran with
    pub term: String,
    pub stocks: Vec<Stock>,
}

impl SearchBatch {
    /// Drop hits already in the caller's selection.
    ///
    /// Evaluated at consumption time, so a selection made while the lookup
    /// was in flight is respected.
    pub fn without_selected(&self, selected: &HashSet<String>) -> Vec<Stock> {
        self.stocks
            .iter()
            .filter(|stock| !selected.contains(&stock.ticker))
            .cloned()
            .collect()
    }
}

/// Debounced, cancellable search-as-you-type resolver.
///
/// Every `input` call supersedes the previous lookup: the armed debounce
/// timer and any in-flight request are cancelled, and a stale response is
/// dropped by epoch comparison at arrival time. Lookup failures degrade to
/// an empty batch since search is advisory, not task-critical.
pub struct SearchResolver {
    client: Arc<ApiClient>,
    debounce: Duration,
    limit: u32,
    epoch: Arc<AtomicU64>,
    token: Mutex<CancellationToken>,
    batch_tx: Arc<watch::Sender<SearchBatch>>,
}

impl SearchResolver {
    pub fn new(client: Arc<ApiClient>, debounce: Duration, limit: u32) -> Self {
        let (batch_tx, _) = watch::channel(SearchBatch::default());
        Self {
            client,
            debounce,
            limit,
            epoch: Arc::new(AtomicU64::new(0)),
            token: Mutex::new(CancellationToken::new()),
            batch_tx: Arc::new(batch_tx),
        }
    }

    /// Observe result batches
    pub fn subscribe(&self) -> watch::Receiver<SearchBatch> {
        self.batch_tx.subscribe()
    }

    /// Feed the current input.
    ///
    /// Call on every keystroke and on every market-filter change; a lookup
    /// is only issued once the debounce window elapses with no newer input.
    pub fn input(&self, term: &str, market: Market) {
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        let token = {
            let mut slot = self.token.lock().unwrap_or_else(|err| err.into_inner());
            slot.cancel();
            *slot = CancellationToken::new();
            slot.clone()
        };

        let term = term.trim().to_string();
        if term.is_empty() {
            // An empty box clears suggestions without a round-trip.
            self.batch_tx.send_replace(SearchBatch {
                epoch,
                ..SearchBatch::default()
            });
            return;
        }

        let client = self.client.clone();
        let debounce = self.debounce;
        let limit = self.limit;
        let epoch_counter = self.epoch.clone();
        let batch_tx = self.batch_tx.clone();

        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => return,
                _ = tokio::time::sleep(debounce) => {}
            }

            let outcome = issue(&token, client.search_stocks(&term, market, limit)).await;

            // Stale lookups are dropped at arrival time, not send time.
            if epoch_counter.load(Ordering::SeqCst) != epoch {
                return;
            }

            let stocks = match outcome {
                Outcome::Cancelled => return,
                Outcome::Completed(Ok(response)) => response.stocks,
                Outcome::Completed(Err(err)) => {
                    debug!(term = %term, "stock search failed: {err}");
                    Vec::new()
                }
            };

            batch_tx.send_replace(SearchBatch {
                epoch,
                term,
                stocks,
            });
        });
    }

    /// Clear any pending lookup without issuing a new one.
    pub fn clear(&self) {
        self.input("", Market::All);
    }
}
