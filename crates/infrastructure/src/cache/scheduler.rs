use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::future::BoxFuture;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info};
use zone_manager_domain::ZoneIdentity;

/// Work run when a zone's timer fires.
pub type RefreshTask = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

struct ScheduledEntry {
    token: CancellationToken,
    interval: Duration,
    generation: u64,
}

/// One cancellable timer task per [`ZoneIdentity`].
///
/// Every mutation goes through the map's entry API, so replacing a timer
/// holds the key's lock across cancel-old and install-new. An `unschedule`
/// racing a `reschedule` either removes the new timer or makes the
/// reschedule a no-op; it never leaves a timer behind.
///
/// After [`shutdown`](Self::shutdown) every scheduling call is refused
/// until [`reopen`](Self::reopen).
pub struct RefreshScheduler {
    entries: Arc<DashMap<ZoneIdentity, ScheduledEntry>>,
    generation: AtomicU64,
    closed: AtomicBool,
    tracker: TaskTracker,
}

impl Default for RefreshScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl RefreshScheduler {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            generation: AtomicU64::new(0),
            closed: AtomicBool::new(false),
            tracker: TaskTracker::new(),
        }
    }

    /// Starts a recurring timer. Returns `false` and keeps the existing
    /// timer when the zone is already scheduled.
    pub fn schedule(&self, identity: ZoneIdentity, interval: Duration, task: RefreshTask) -> bool {
        match self.entries.entry(identity) {
            Entry::Vacant(vacant) if self.is_closed() => {
                debug!(zone = %vacant.key(), "Scheduler closed, timer not started");
                false
            }
            Entry::Occupied(occupied) => {
                debug!(zone = %occupied.key(), "Zone already scheduled");
                false
            }
            Entry::Vacant(vacant) => {
                let entry = self.spawn_recurring(vacant.key().clone(), interval, task);
                debug!(zone = %vacant.key(), interval_secs = interval.as_secs(), "Zone scheduled");
                vacant.insert(entry);
                true
            }
        }
    }

    /// Replaces a zone's timer with one at `interval`. Returns `false` when
    /// the zone is not scheduled; nothing is started in that case.
    pub fn reschedule(&self, identity: &ZoneIdentity, interval: Duration, task: RefreshTask) -> bool {
        match self.entries.entry(identity.clone()) {
            Entry::Occupied(_) if self.is_closed() => false,
            Entry::Occupied(mut occupied) => {
                occupied.get().token.cancel();
                let entry = self.spawn_recurring(identity.clone(), interval, task);
                occupied.insert(entry);
                info!(zone = %identity, interval_secs = interval.as_secs(), "Zone rescheduled");
                true
            }
            Entry::Vacant(_) => false,
        }
    }

    /// Cancels and forgets a zone's timer.
    pub fn unschedule(&self, identity: &ZoneIdentity) -> bool {
        match self.entries.remove(identity) {
            Some((_, entry)) => {
                entry.token.cancel();
                debug!(zone = %identity, "Zone unscheduled");
                true
            }
            None => false,
        }
    }

    /// Runs `task` once after `delay`; the entry removes itself before the
    /// task runs.
    pub fn schedule_once(&self, identity: ZoneIdentity, delay: Duration, task: RefreshTask) -> bool {
        match self.entries.entry(identity) {
            Entry::Occupied(_) => false,
            Entry::Vacant(_) if self.is_closed() => false,
            Entry::Vacant(vacant) => {
                let token = CancellationToken::new();
                let generation = self.next_generation();
                let entries = self.entries.clone();
                let key = vacant.key().clone();
                let cancelled = token.clone();

                self.tracker.spawn(async move {
                    tokio::select! {
                        _ = cancelled.cancelled() => return,
                        _ = tokio::time::sleep(delay) => {}
                    }
                    entries.remove_if(&key, |_, e| e.generation == generation);
                    task().await;
                });

                vacant.insert(ScheduledEntry {
                    token,
                    interval: delay,
                    generation,
                });
                true
            }
        }
    }

    pub fn is_scheduled(&self, identity: &ZoneIdentity) -> bool {
        self.entries.contains_key(identity)
    }

    pub fn interval(&self, identity: &ZoneIdentity) -> Option<Duration> {
        self.entries.get(identity).map(|e| e.interval)
    }

    pub fn identities(&self) -> Vec<ZoneIdentity> {
        self.entries.iter().map(|e| e.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cancel_all(&self) {
        self.entries.retain(|_, entry| {
            entry.token.cancel();
            false
        });
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Accepts new timers again after a shutdown.
    pub fn reopen(&self) {
        self.closed.store(false, Ordering::SeqCst);
    }

    /// Refuses new timers, cancels every timer and waits for running tasks
    /// to return.
    pub async fn shutdown(&self) {
        // Set before cancelling: a call that passed the check still holds
        // its shard lock, so `cancel_all` sees its entry.
        self.closed.store(true, Ordering::SeqCst);
        self.cancel_all();
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();
        debug!("Refresh scheduler drained");
    }

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::Relaxed)
    }

    fn spawn_recurring(
        &self,
        identity: ZoneIdentity,
        interval: Duration,
        task: RefreshTask,
    ) -> ScheduledEntry {
        let token = CancellationToken::new();
        let cancelled = token.clone();

        self.tracker.spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = cancelled.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                // A running refresh is never interrupted.
                task().await;
            }
            debug!(zone = %identity, "Zone timer stopped");
        });

        ScheduledEntry {
            token,
            interval,
            generation: self.next_generation(),
        }
    }
}
