//! Message sync session
//!
//! Drives one subject's recurring fetch-transform-store cycle and
//! mediates between the network boundary, the shared transcript store
//! and the caller's callbacks.
//!
//! Cycle body: fetch (network, or local cache on playground pages),
//! filter rows to the current principal, derive grid columns, publish
//! the snapshot into the store. Cycles for one subject never overlap:
//! a cycle requested while another is executing fails fast with
//! [`RequestInFlightError`], never queued.

use anyhow::{anyhow, Result};
use std::collections::{BTreeMap, HashSet};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{PollingCoordinator, PollingJob, TickFn};
use crate::api::{AuthContext, MessageFetcher, MessagesQuery};
use crate::columns::extract_columns_from_rows;
use crate::models::{ColumnDef, MergeMode, MessageRow, SubjectId};
use crate::sanitize::sanitize_message;
use crate::scope::filter_rows_for_user;
use crate::store::{LocalTranscriptCache, TranscriptStore};

/// Fixed polling cadence
pub const POLLING_INTERVAL: Duration = Duration::from_millis(5000);

/// Request key used when no subject id is given
pub const DEFAULT_REQUEST_KEY: &str = "default";

/// A cycle for this subject is already executing
///
/// Overlapping calls are rejected, not queued: another cycle for the
/// same tick is already underway, so callers typically ignore this.
#[derive(Debug, thiserror::Error)]
#[error("request already in progress for {id}")]
pub struct RequestInFlightError {
    pub id: String,
}

/// Result of one fetch-transform-store cycle
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessagesResponse {
    pub rows: Vec<MessageRow>,
    pub columns: Vec<ColumnDef>,
}

/// Parameters for one messages cycle (single-shot or per tick)
#[derive(Clone, Default)]
pub struct GetMessages {
    /// Polling subject; also supplies the `flow_id` query parameter
    pub id: Option<SubjectId>,
    pub mode: MergeMode,
    /// Fields dropped from union-mode column inference
    pub excluded_fields: Vec<String>,
    /// Caller query parameters, merged into the request
    pub params: BTreeMap<String, String>,
}

impl GetMessages {
    pub fn for_subject(id: impl Into<SubjectId>, mode: MergeMode) -> Self {
        Self {
            id: Some(id.into()),
            mode,
            ..Self::default()
        }
    }
}

/// Called with the result of every committed cycle
pub type OnSuccess = Arc<dyn Fn(&MessagesResponse) + Send + Sync>;
/// Polling ends when this returns true for a cycle result
pub type StopPredicate = Arc<dyn Fn(&MessagesResponse) -> bool + Send + Sync>;

/// Parameters for starting a recurring poll
#[derive(Clone, Default)]
pub struct PollRequest {
    pub query: GetMessages,
    pub on_success: Option<OnSuccess>,
    pub stop_polling_on: Option<StopPredicate>,
}

struct SessionInner {
    fetcher: Arc<dyn MessageFetcher>,
    store: Arc<dyn TranscriptStore>,
    cache: Option<Arc<LocalTranscriptCache>>,
    auth: AuthContext,
    coordinator: Arc<PollingCoordinator>,
    interval: Duration,
    in_flight: Mutex<HashSet<String>>,
}

/// Handle driving fetch cycles for transcript subjects
///
/// Cheap to clone; clones share the in-flight bookkeeping and the
/// injected coordinator.
#[derive(Clone)]
pub struct MessageSyncSession {
    inner: Arc<SessionInner>,
}

impl MessageSyncSession {
    pub fn new(
        fetcher: Arc<dyn MessageFetcher>,
        store: Arc<dyn TranscriptStore>,
        cache: Option<Arc<LocalTranscriptCache>>,
        auth: AuthContext,
        coordinator: Arc<PollingCoordinator>,
    ) -> Self {
        Self::with_interval(fetcher, store, cache, auth, coordinator, POLLING_INTERVAL)
    }

    /// Like [`MessageSyncSession::new`] with a non-default cadence
    pub fn with_interval(
        fetcher: Arc<dyn MessageFetcher>,
        store: Arc<dyn TranscriptStore>,
        cache: Option<Arc<LocalTranscriptCache>>,
        auth: AuthContext,
        coordinator: Arc<PollingCoordinator>,
        interval: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                fetcher,
                store,
                cache,
                auth,
                coordinator,
                interval,
                in_flight: Mutex::new(HashSet::new()),
            }),
        }
    }

    /// Run one single-shot cycle and publish the snapshot
    pub fn get_messages(&self, query: &GetMessages) -> Result<MessagesResponse> {
        let result = self.run_cycle(query, None)?;
        // With no epoch gate the cycle always commits.
        Ok(result.unwrap_or_default())
    }

    /// Start polling the subject at the session cadence
    ///
    /// The registration itself runs the first cycle synchronously and
    /// its result is returned; subsequent cycles report only through
    /// `on_success`. Any job already registered for the subject is
    /// stopped first, and any other subject's job is superseded by the
    /// coordinator's last-writer-wins policy.
    pub fn start_polling(&self, request: PollRequest) -> Result<MessagesResponse> {
        let key = request_key(request.query.id.as_ref());

        if self.inner.in_flight.lock().unwrap().contains(&key) {
            return Err(RequestInFlightError { id: key }.into());
        }

        if self.inner.coordinator.is_active(&key) {
            self.inner.coordinator.stop(&key);
        }

        let epoch = self.inner.coordinator.next_epoch();

        // One-shot handoff of the registration-time cycle result back
        // to this caller; later ticks find the sender gone.
        let (first_tx, first_rx) = mpsc::channel();
        let first_tx = Arc::new(Mutex::new(Some(first_tx)));

        let tick: TickFn = {
            let session = self.clone();
            let query = request.query.clone();
            let on_success = request.on_success.clone();
            let stop_polling_on = request.stop_polling_on.clone();
            let key = key.clone();
            let first_tx = Arc::clone(&first_tx);

            Arc::new(move || {
                let outcome = session.run_cycle(&query, Some((&key, epoch)));

                match &outcome {
                    Ok(Some(data)) => {
                        if let Some(on_success) = &on_success {
                            on_success(data);
                        }
                        if stop_polling_on.as_ref().is_some_and(|stop| stop(data)) {
                            session.inner.coordinator.stop(&key);
                        }
                    }
                    // Superseded mid-cycle; the result is discarded.
                    Ok(None) => {}
                    Err(err) => {
                        if err.downcast_ref::<RequestInFlightError>().is_some() {
                            log::debug!(
                                "Skipping poll tick for {}: previous cycle still running",
                                key
                            );
                        } else {
                            // Cycle failures are local to one tick; the
                            // timer keeps running at its cadence.
                            log::warn!(
                                "Poll cycle for {} failed: {}",
                                key,
                                sanitize_message(&format!("{:#}", err))
                            );
                        }
                    }
                }

                if let Some(tx) = first_tx.lock().unwrap().take() {
                    let _ = tx.send(outcome);
                }
            })
        };

        self.inner.coordinator.enqueue(PollingJob::new(
            key.clone(),
            self.inner.interval,
            epoch,
            tick,
        ));

        match first_rx.try_recv() {
            Ok(Ok(Some(data))) => Ok(data),
            // Stopped before the first cycle committed.
            Ok(Ok(None)) => Ok(MessagesResponse::default()),
            Ok(Err(err)) => Err(err),
            Err(_) => Err(anyhow!("polling job for {} did not run its first cycle", key)),
        }
    }

    /// Stop polling the subject; no-op if it is not being polled
    pub fn stop_polling(&self, id: Option<&SubjectId>) {
        self.inner.coordinator.stop(&request_key(id));
    }

    /// Whether the subject currently has an active polling job
    pub fn is_polling(&self, id: Option<&SubjectId>) -> bool {
        self.inner.coordinator.is_active(&request_key(id))
    }

    /// Stop every polling job owned by the coordinator
    pub fn shutdown(&self) {
        self.inner.coordinator.stop_all();
    }

    /// One guarded cycle; `gate` is the (key, epoch) pair of the owning
    /// polling job, used to discard results of superseded registrations
    fn run_cycle(
        &self,
        query: &GetMessages,
        gate: Option<(&str, u64)>,
    ) -> Result<Option<MessagesResponse>> {
        let key = request_key(query.id.as_ref());
        let _guard = self.begin_cycle(&key)?;

        let rows = self.fetch_rows(query)?;
        let rows = filter_rows_for_user(rows, &self.inner.auth);
        let columns = extract_columns_from_rows(&rows, query.mode, &query.excluded_fields);

        // The publish happens atomically with the currency check, so a
        // stop() racing this cycle either lands before the check (and
        // the snapshot is discarded) or waits until the store is
        // consistent.
        let committed = match gate {
            Some((id, epoch)) => self
                .inner
                .coordinator
                .run_if_current(id, epoch, || self.inner.store.set_messages(rows.clone())),
            None => Some(self.inner.store.set_messages(rows.clone())),
        };
        match committed {
            Some(result) => {
                result?;
                Ok(Some(MessagesResponse { rows, columns }))
            }
            None => {
                log::debug!("Discarding stale poll result for {}", key);
                Ok(None)
            }
        }
    }

    /// Read rows from the network, or from the local cache on
    /// playground pages
    fn fetch_rows(&self, query: &GetMessages) -> Result<Vec<MessageRow>> {
        if self.inner.auth.playground_page {
            return match (&self.inner.cache, query.id.as_ref()) {
                (Some(cache), Some(id)) => cache.load(id),
                // No cache or no subject: an empty transcript.
                _ => Ok(Vec::new()),
            };
        }

        let request = MessagesQuery::build(query.id.as_ref(), &query.params, &self.inner.auth);
        self.inner.fetcher.fetch_messages(&request)
    }

    /// Mark the key in flight, or fail fast if it already is
    fn begin_cycle(&self, key: &str) -> Result<InFlightGuard> {
        let mut in_flight = self.inner.in_flight.lock().unwrap();
        if !in_flight.insert(key.to_string()) {
            return Err(RequestInFlightError {
                id: key.to_string(),
            }
            .into());
        }
        Ok(InFlightGuard {
            inner: Arc::clone(&self.inner),
            key: key.to_string(),
        })
    }
}

/// Clears the in-flight flag on every exit path
struct InFlightGuard {
    inner: Arc<SessionInner>,
    key: String,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.inner.in_flight.lock().unwrap().remove(&self.key);
    }
}

fn request_key(id: Option<&SubjectId>) -> String {
    id.map(|id| id.as_str().to_string())
        .unwrap_or_else(|| DEFAULT_REQUEST_KEY.to_string())
}
