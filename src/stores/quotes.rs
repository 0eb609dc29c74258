use chrono::{NaiveDate, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::metrics::DashboardMetrics;
use crate::api::QuoteApi;
use crate::models::{Quote, QuoteStatus};
use crate::utils::{AdminError, Result};

/// Local cache of quotes kept in step with the quotes API.
///
/// Every request takes a ticket from one monotonic counter. A fetched list
/// is applied only if no newer fetch was started, and a successful write is
/// applied unless a newer write to the same quote has already been applied.
/// The lock is never held across a request, so callers may overlap freely.
pub struct QuoteStore {
    api: Arc<dyn QuoteApi>,
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    quotes: Vec<Quote>,
    in_flight: usize,
    last_error: Option<String>,
    next_ticket: u64,
    latest_fetch: u64,
    /// Write bookkeeping per quote id, pruned whenever a fetch is applied
    writes: HashMap<String, WriteState>,
}

#[derive(Debug, Default)]
struct WriteState {
    in_flight: usize,
    /// Ticket of the write whose result is currently cached
    applied: Option<u64>,
}

impl Inner {
    fn issue_ticket(&mut self) -> u64 {
        self.next_ticket += 1;
        self.next_ticket
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.quotes.iter().position(|q| q.id == id)
    }
}

/// Keeps the loading flag raised while a request is outstanding, including
/// when the request future is dropped early
struct InFlight<'a> {
    inner: &'a Mutex<Inner>,
}

impl<'a> InFlight<'a> {
    fn start(inner: &'a Mutex<Inner>) -> Self {
        inner.lock().in_flight += 1;
        Self { inner }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.inner.lock().in_flight -= 1;
    }
}

/// A write to one quote, from request to response.
///
/// Dropping it releases the quote's bookkeeping, whether or not the
/// response was applied.
struct PendingWrite<'a> {
    inner: &'a Mutex<Inner>,
    id: String,
    ticket: u64,
}

impl<'a> PendingWrite<'a> {
    fn start(inner: &'a Mutex<Inner>, id: &str) -> Self {
        let mut guard = inner.lock();
        let ticket = guard.issue_ticket();
        guard.writes.entry(id.to_string()).or_default().in_flight += 1;
        Self {
            inner,
            id: id.to_string(),
            ticket,
        }
    }

    /// Apply `change` to the cache unless a newer write to this quote already was
    fn finish(&self, change: impl FnOnce(&mut Vec<Quote>)) {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        inner.last_error = None;

        let state = inner.writes.entry(self.id.clone()).or_default();
        if state.applied.is_some_and(|applied| applied > self.ticket) {
            debug!("Discarding stale response #{} for quote {}", self.ticket, self.id);
            return;
        }
        state.applied = Some(self.ticket);
        change(&mut inner.quotes);
    }
}

impl Drop for PendingWrite<'_> {
    fn drop(&mut self) {
        let mut inner = self.inner.lock();
        if let Some(state) = inner.writes.get_mut(&self.id) {
            state.in_flight = state.in_flight.saturating_sub(1);
            if state.in_flight == 0 && state.applied.is_none() {
                inner.writes.remove(&self.id);
            }
        }
    }
}

impl QuoteStore {
    pub fn new(api: Arc<dyn QuoteApi>) -> Self {
        Self {
            api,
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Current cache contents
    pub fn list(&self) -> Vec<Quote> {
        self.inner.lock().quotes.clone()
    }

    pub fn get(&self, id: &str) -> Option<Quote> {
        let inner = self.inner.lock();
        inner.position(id).map(|i| inner.quotes[i].clone())
    }

    pub fn is_loading(&self) -> bool {
        self.inner.lock().in_flight > 0
    }

    /// Message of the most recent failed request, if the last one failed
    pub fn last_error(&self) -> Option<String> {
        self.inner.lock().last_error.clone()
    }

    pub fn metrics(&self, today: NaiveDate) -> DashboardMetrics {
        DashboardMetrics::from_quotes(&self.inner.lock().quotes, today)
    }

    fn record_failure(&self, action: &str, err: AdminError) -> AdminError {
        let message = err.user_message();
        warn!("{} failed: {}", action, err);
        self.inner.lock().last_error = Some(message);
        err
    }

    /// Load every quote and replace the cache wholesale.
    ///
    /// On failure the cache is left exactly as it was.
    pub async fn fetch_all(&self) -> Result<Vec<Quote>> {
        let ticket = {
            let mut inner = self.inner.lock();
            let ticket = inner.issue_ticket();
            inner.latest_fetch = ticket;
            ticket
        };
        let _loading = InFlight::start(&self.inner);

        let fetched = match self.api.list_quotes().await {
            Ok(quotes) => quotes,
            Err(e) => return Err(self.record_failure("Fetching quotes", e)),
        };

        let mut inner = self.inner.lock();
        inner.last_error = None;

        if inner.latest_fetch != ticket {
            debug!("Discarding quote list from superseded fetch #{}", ticket);
            return Ok(fetched);
        }

        // Writes that landed after this fetch started are newer than the list
        let mut merged = Vec::with_capacity(fetched.len());
        for quote in &fetched {
            let newer = inner
                .writes
                .get(&quote.id)
                .and_then(|w| w.applied)
                .is_some_and(|applied| applied > ticket);
            match inner.position(&quote.id) {
                Some(i) if newer => merged.push(inner.quotes[i].clone()),
                _ => merged.push(quote.clone()),
            }
        }

        info!("Loaded {} quotes", merged.len());
        inner.quotes = merged;

        // Only quotes with writes outstanding, or written after this fetch
        // started, still need their tickets
        inner
            .writes
            .retain(|_, w| w.in_flight > 0 || w.applied.is_some_and(|applied| applied > ticket));
        Ok(fetched)
    }

    /// Send the full quote so the server recalculates it, then cache the result
    pub async fn recalculate(&self, id: &str, payload: &Quote) -> Result<Quote> {
        if payload.id != id {
            return Err(AdminError::ValidationError(format!(
                "Payload is for quote {} but quote {} was requested",
                payload.id, id
            )));
        }

        let write = PendingWrite::start(&self.inner, id);
        let _loading = InFlight::start(&self.inner);

        let updated = match self.api.update_quote(id, payload).await {
            Ok(quote) => quote,
            Err(e) => return Err(self.record_failure("Recalculating quote", e)),
        };

        write.finish(|quotes| {
            match quotes.iter_mut().find(|q| q.id == id) {
                Some(cached) => *cached = updated.clone(),
                None => quotes.push(updated.clone()),
            }
        });
        info!("Quote {} recalculated", id);
        Ok(updated)
    }

    /// Record an advisor decision on a quote.
    ///
    /// Only `approved` and `rejected` may be set, and a cached quote must be
    /// in a state that allows the move. Invalid requests are refused before
    /// anything is sent. On success only `status` and `updated_at` of the
    /// cached entry change.
    pub async fn set_status(&self, id: &str, status: QuoteStatus) -> Result<Quote> {
        if !status.is_decision() {
            return Err(AdminError::ValidationError(format!(
                "Status can only be set to approved or rejected, not {}",
                status
            )));
        }
        if let Some(current) = self.get(id).map(|q| q.status) {
            if !current.can_transition_to(status) {
                return Err(AdminError::ValidationError(format!(
                    "Quote {} is {} and cannot become {}",
                    id, current, status
                )));
            }
        }

        let write = PendingWrite::start(&self.inner, id);
        let _loading = InFlight::start(&self.inner);

        let updated = match self.api.update_status(id, status).await {
            Ok(quote) => quote,
            Err(e) => return Err(self.record_failure("Updating quote status", e)),
        };

        let updated_at = updated
            .updated_at
            .clone()
            .unwrap_or_else(|| Utc::now().to_rfc3339());
        write.finish(|quotes| {
            if let Some(cached) = quotes.iter_mut().find(|q| q.id == id) {
                cached.status = updated.status;
                cached.updated_at = Some(updated_at);
            }
        });
        info!("Quote {} marked {}", id, updated.status);
        Ok(updated)
    }
}
