//! Single-slot polling coordinator
//!
//! One coordinator instance is the sole authority over which recurring
//! polling job (if any) is running. It is constructor-injected and
//! passed around as an `Arc` by whatever composes the application; it
//! holds no process-global state.
//!
//! Timers are plain threads ticking on a fixed interval. Cancellation
//! drops the job's mpsc sender: the ticker wakes from its timed wait
//! and exits before the next tick can fire, so a stale timer never
//! double-fires.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// Tick callback run once per interval (and once at registration)
pub type TickFn = Arc<dyn Fn() + Send + Sync + 'static>;

/// A recurring polling job, owned by the coordinator once enqueued
pub struct PollingJob {
    id: String,
    interval: Duration,
    epoch: u64,
    tick: TickFn,
}

impl PollingJob {
    pub fn new(id: impl Into<String>, interval: Duration, epoch: u64, tick: TickFn) -> Self {
        Self {
            id: id.into(),
            interval,
            epoch,
            tick,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Bookkeeping for a promoted job
///
/// Dropping the entry drops `cancel`, which ends the ticker thread.
struct ActiveEntry {
    epoch: u64,
    #[allow(dead_code)] // held only so dropping the entry cancels the ticker
    cancel: mpsc::Sender<()>,
}

#[derive(Default)]
struct CoordinatorState {
    queued: HashMap<String, Vec<PollingJob>>,
    active: HashMap<String, ActiveEntry>,
}

/// Coordinator enforcing the at-most-one-active-job policy
#[derive(Default)]
pub struct PollingCoordinator {
    state: Mutex<CoordinatorState>,
    epochs: AtomicU64,
}

impl PollingCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a registration epoch
    ///
    /// Results produced under an epoch that is no longer active must be
    /// discarded (see [`PollingCoordinator::run_if_current`]).
    pub fn next_epoch(&self) -> u64 {
        self.epochs.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Register a job, superseding every active job system-wide
    ///
    /// Last writer wins: all active timers (for any id) are cancelled,
    /// the queue is cleared, and the new job becomes the sole queued
    /// entry before being promoted. Only one subject ever polls at a
    /// time; the per-id maps deliberately never hold more than one
    /// entry between operations.
    ///
    /// Promotion runs the job's first tick synchronously on the calling
    /// thread, so the caller observes data before the first interval
    /// elapses.
    pub fn enqueue(&self, job: PollingJob) {
        let id = job.id().to_string();
        {
            let mut state = self.state.lock().unwrap();
            // Dropping the active entries drops their cancel senders,
            // which ends the ticker threads.
            state.active.clear();
            state.queued.clear();
            state.queued.insert(id.clone(), vec![job]);
        }
        self.promote_next(&id);
    }

    /// Promote the head of the id's queue to active
    fn promote_next(&self, id: &str) {
        let (job, cancelled) = {
            let mut state = self.state.lock().unwrap();
            let next = state
                .queued
                .get_mut(id)
                .filter(|queue| !queue.is_empty())
                .map(|queue| queue.remove(0));
            if state.queued.get(id).is_some_and(|queue| queue.is_empty()) {
                state.queued.remove(id);
            }

            let Some(job) = next else {
                state.active.remove(id);
                return;
            };

            let (cancel, cancelled) = mpsc::channel();
            state.active.insert(
                id.to_string(),
                ActiveEntry {
                    epoch: job.epoch,
                    cancel,
                },
            );
            (job, cancelled)
        };

        // First tick runs at registration time, not after the first
        // interval elapses. The state lock is released first: the tick
        // body may call back into stop(). The interval ticker starts
        // only after the first tick returns, so a first cycle that
        // outlasts one interval is never raced by a ticker tick.
        (job.tick)();
        spawn_ticker(&job.id, Arc::clone(&job.tick), job.interval, cancelled);
    }

    /// Cancel the id's timer and forget it; no-op for unknown ids
    ///
    /// Only future ticks are cancelled. A cycle already executing is
    /// not aborted, but its publish will fail the epoch check and be
    /// discarded.
    pub fn stop(&self, id: &str) {
        let mut state = self.state.lock().unwrap();
        if state.active.remove(id).is_some() {
            state.queued.remove(id);
        }
    }

    /// Cancel every timer and clear all state
    pub fn stop_all(&self) {
        let mut state = self.state.lock().unwrap();
        state.active.clear();
        state.queued.clear();
    }

    /// Whether the id currently has an active job
    pub fn is_active(&self, id: &str) -> bool {
        self.state.lock().unwrap().active.contains_key(id)
    }

    /// Whether the id's active job is the one registered under `epoch`
    pub fn is_current(&self, id: &str, epoch: u64) -> bool {
        self.state
            .lock()
            .unwrap()
            .active
            .get(id)
            .is_some_and(|entry| entry.epoch == epoch)
    }

    /// Run `f` only if the id's active job is still the one registered
    /// under `epoch`, holding the slot against concurrent stop() and
    /// enqueue() until `f` returns
    ///
    /// Used to commit a cycle's result atomically with the currency
    /// check, so a stop landing between check and commit cannot let a
    /// cancelled cycle's data through. `f` must not call back into the
    /// coordinator.
    pub fn run_if_current<T>(&self, id: &str, epoch: u64, f: impl FnOnce() -> T) -> Option<T> {
        let state = self.state.lock().unwrap();
        let current = state
            .active
            .get(id)
            .is_some_and(|entry| entry.epoch == epoch);
        current.then(f)
    }

    /// The epoch of the id's active job, if any
    pub fn active_epoch(&self, id: &str) -> Option<u64> {
        self.state.lock().unwrap().active.get(id).map(|e| e.epoch)
    }

    /// Number of active jobs (at most one by policy)
    pub fn active_count(&self) -> usize {
        self.state.lock().unwrap().active.len()
    }
}

/// Run the tick on a fixed cadence until the cancel sender is dropped
///
/// One named thread per job; the name shows up in panics and debuggers.
fn spawn_ticker(id: &str, tick: TickFn, interval: Duration, cancelled: mpsc::Receiver<()>) {
    let spawned = thread::Builder::new()
        .name(format!("poll-{id}"))
        .spawn(move || {
            loop {
                match cancelled.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => tick(),
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
        });
    if let Err(err) = spawned {
        log::error!("Failed to spawn ticker thread for {id}: {err}");
    }
}
