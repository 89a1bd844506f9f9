use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::{DashMap, DashSet};
use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};
use zone_manager_application::ports::{
    ConfigurationRepository, ZoneCachePort, ZoneExecutorFactory,
};
use zone_manager_domain::config::NotifyConfig;
use zone_manager_domain::{
    find_soa, normalize_zone_name, DomainError, Record, View, Zone, ZoneIdentity,
};

use super::scheduler::{RefreshScheduler, RefreshTask};
use crate::dns::notify::{NotifyHandle, NotifyListener, NotifySink};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CacheState {
    Stopped = 0,
    Starting = 1,
    Suspended = 2,
    Available = 3,
}

impl CacheState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => CacheState::Starting,
            2 => CacheState::Suspended,
            3 => CacheState::Available,
            _ => CacheState::Stopped,
        }
    }
}

/// A cached copy of one zone.
#[derive(Debug, Clone)]
pub struct ZoneSnapshot {
    pub serial: u32,
    pub refresh_interval: Duration,
    pub records: Vec<Record>,
    pub refreshed_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ZoneCacheSettings {
    /// Refresh interval for zones without an SOA record.
    pub default_refresh: Duration,
    /// Delay between start and the cache becoming available.
    pub bootstrap_delay: Duration,
    /// `None` runs the cache without a NOTIFY listener.
    pub notify: Option<NotifyConfig>,
}

/// In-memory zone snapshots kept current by per-zone refresh timers and
/// NOTIFY messages.
///
/// Lifecycle: `Stopped` → `Starting` → `Suspended` → `Available`. Timer
/// and NOTIFY triggered refreshes only run while `Available`; reads are
/// served in every state.
pub struct ZoneCache {
    this: Weak<ZoneCache>,
    config_repo: Arc<dyn ConfigurationRepository>,
    executor_factory: Arc<dyn ZoneExecutorFactory>,
    settings: ZoneCacheSettings,
    state: AtomicU8,
    snapshots: DashMap<ZoneIdentity, ZoneSnapshot>,
    pending: DashSet<ZoneIdentity>,
    scheduler: RefreshScheduler,
    refresh_lock: Mutex<()>,
    listener: Mutex<Option<NotifyHandle>>,
}

impl ZoneCache {
    pub fn new(
        config_repo: Arc<dyn ConfigurationRepository>,
        executor_factory: Arc<dyn ZoneExecutorFactory>,
        settings: ZoneCacheSettings,
    ) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            this: this.clone(),
            config_repo,
            executor_factory,
            settings,
            state: AtomicU8::new(CacheState::Stopped as u8),
            snapshots: DashMap::new(),
            pending: DashSet::new(),
            scheduler: RefreshScheduler::new(),
            refresh_lock: Mutex::new(()),
            listener: Mutex::new(None),
        })
    }

    pub fn state(&self) -> CacheState {
        CacheState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn is_stopped(&self) -> bool {
        self.state() == CacheState::Stopped
    }

    fn transition(&self, from: CacheState, to: CacheState) -> bool {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Loads every configured zone, starts the NOTIFY listener and arms the
    /// bootstrap timer that makes the cache available.
    pub async fn start(&self) -> Result<(), DomainError> {
        if !self.transition(CacheState::Stopped, CacheState::Starting) {
            warn!(state = ?self.state(), "Zone cache already started");
            return Ok(());
        }
        info!("Zone cache starting");

        self.scheduler.reopen();
        self.refresh().await;

        if let Some(config) = &self.settings.notify {
            let sink: Arc<dyn NotifySink> = match self.this.upgrade() {
                Some(cache) => cache,
                None => return Err(DomainError::Service("Zone cache dropped".to_string())),
            };
            let handle = match NotifyListener::bind(config, sink) {
                Ok(listener) => listener.spawn(),
                Err(e) => {
                    self.scheduler.shutdown().await;
                    self.state.store(CacheState::Stopped as u8, Ordering::Release);
                    return Err(e);
                }
            };
            *self.listener.lock().await = Some(handle);
        }

        self.state
            .store(CacheState::Suspended as u8, Ordering::Release);

        let this = self.this.clone();
        let bootstrap: RefreshTask = Arc::new(move || {
            let this = this.clone();
            Box::pin(async move {
                if let Some(cache) = this.upgrade() {
                    cache.resume();
                }
            })
        });
        self.scheduler
            .schedule_once(ZoneIdentity::none(), self.settings.bootstrap_delay, bootstrap);

        info!(
            zones = self.snapshots.len(),
            bootstrap_secs = self.settings.bootstrap_delay.as_secs(),
            "Zone cache started"
        );
        Ok(())
    }

    /// Stops the listener, cancels every timer and drops the snapshots.
    pub async fn stop(&self) {
        let previous = CacheState::from_u8(
            self.state
                .swap(CacheState::Stopped as u8, Ordering::AcqRel),
        );
        if previous == CacheState::Stopped {
            return;
        }

        if let Some(handle) = self.listener.lock().await.take() {
            handle.stop().await;
        }
        self.scheduler.shutdown().await;

        let _guard = self.refresh_lock.lock().await;
        self.snapshots.clear();
        self.pending.clear();
        info!("Zone cache stopped");
    }

    pub fn suspend(&self) -> bool {
        let suspended = self.transition(CacheState::Available, CacheState::Suspended);
        if suspended {
            info!("Zone cache suspended");
        }
        suspended
    }

    pub fn resume(&self) -> bool {
        let resumed = self.transition(CacheState::Suspended, CacheState::Available);
        if resumed {
            info!("Zone cache available");
        }
        resumed
    }

    /// Flags every zone with this name, across views.
    pub fn flag_zone_for_refresh(&self, zone_name: &str) {
        let name = normalize_zone_name(zone_name);
        let mut known: HashSet<ZoneIdentity> =
            self.snapshots.iter().map(|e| e.key().clone()).collect();
        known.extend(self.scheduler.identities());

        for identity in known.into_iter().filter(|id| id.zone() == name) {
            self.pending.insert(identity);
        }
    }

    pub fn is_flagged(&self, identity: &ZoneIdentity) -> bool {
        self.pending.contains(identity)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn snapshot(&self, identity: &ZoneIdentity) -> Option<ZoneSnapshot> {
        self.snapshots.get(identity).map(|s| s.value().clone())
    }

    pub fn zone_count(&self) -> usize {
        self.snapshots.len()
    }

    /// Address the NOTIFY listener is bound to, once started.
    pub async fn notify_addr(&self) -> Option<SocketAddr> {
        self.listener.lock().await.as_ref().map(|h| h.local_addr())
    }

    pub fn refresh_interval(&self, identity: &ZoneIdentity) -> Option<Duration> {
        self.scheduler.interval(identity)
    }

    /// Reconciles the snapshots with the configuration and brings flagged
    /// zones current, then clears the flags it saw. Does nothing once the
    /// cache is stopped.
    #[instrument(skip(self))]
    pub async fn refresh(&self) {
        let _guard = self.refresh_lock.lock().await;
        if self.is_stopped() {
            debug!("Zone cache stopped, refresh skipped");
            return;
        }
        let flagged: Vec<ZoneIdentity> = self.pending.iter().map(|id| id.key().clone()).collect();

        let views = match self.config_repo.find_views().await {
            Ok(views) => views,
            Err(e) => {
                warn!(error = %e, "Cannot read views, keeping cached zones");
                return;
            }
        };

        let mut configured = HashSet::new();
        for view in &views {
            let zones = match self.config_repo.find_zones(&view.name).await {
                Ok(zones) => zones,
                Err(e) => {
                    warn!(view = %view.name, error = %e, "Cannot read zones of view");
                    continue;
                }
            };

            for zone in zones {
                if self.is_stopped() {
                    return;
                }
                let identity = zone.identity();
                configured.insert(identity.clone());

                if !self.snapshots.contains_key(&identity) {
                    self.load_zone(view, &zone).await;
                } else if flagged.contains(&identity) {
                    self.update_zone(view, &zone).await;
                }
            }
        }

        let removed: Vec<ZoneIdentity> = self
            .snapshots
            .iter()
            .map(|e| e.key().clone())
            .chain(self.scheduler.identities())
            .filter(|id| !id.is_none() && !configured.contains(id))
            .collect();
        for identity in removed {
            self.snapshots.remove(&identity);
            if self.scheduler.unschedule(&identity) {
                info!(zone = %identity, "Zone removed from configuration");
            }
        }

        for identity in &flagged {
            self.pending.remove(identity);
        }
        debug!(zones = self.snapshots.len(), "Zone cache refreshed");
    }

    async fn load_zone(&self, view: &View, zone: &Zone) {
        let identity = zone.identity();
        let records = match self.executor_factory.create(view, zone).await {
            Ok(executor) => executor.find_records().await,
            Err(e) => Err(e),
        };
        if self.is_stopped() {
            debug!(zone = %identity, "Zone cache stopped, load discarded");
            return;
        }

        match records {
            Ok(records) if !records.is_empty() => {
                let snapshot = self.build_snapshot(records);
                info!(
                    zone = %identity,
                    serial = snapshot.serial,
                    records = snapshot.records.len(),
                    "Zone loaded"
                );
                self.scheduler.schedule(
                    identity.clone(),
                    snapshot.refresh_interval,
                    self.refresh_task(identity.clone()),
                );
                self.snapshots.insert(identity, snapshot);
            }
            Ok(_) => {
                warn!(zone = %identity, "Zone transfer returned no records, retrying later");
                self.scheduler.schedule(
                    identity.clone(),
                    self.settings.default_refresh,
                    self.refresh_task(identity),
                );
            }
            Err(e) => {
                warn!(zone = %identity, error = %e, "Cannot load zone, retrying later");
                self.scheduler.schedule(
                    identity.clone(),
                    self.settings.default_refresh,
                    self.refresh_task(identity),
                );
            }
        }
    }

    async fn update_zone(&self, view: &View, zone: &Zone) {
        let identity = zone.identity();
        let Some(current) = self.snapshot(&identity) else {
            return;
        };

        let executor = match self.executor_factory.create(view, zone).await {
            Ok(executor) => executor,
            Err(e) => {
                warn!(zone = %identity, error = %e, "Cannot update zone");
                return;
            }
        };

        let mut records = current.records;
        let serial = match executor.update_records(&mut records, current.serial).await {
            Ok(serial) => serial,
            Err(e) => {
                warn!(zone = %identity, error = %e, "Zone update failed, keeping stale records");
                return;
            }
        };

        if self.is_stopped() {
            debug!(zone = %identity, "Zone cache stopped, update discarded");
            return;
        }

        let mut snapshot = self.build_snapshot(records);
        snapshot.serial = serial;

        if self.scheduler.interval(&identity) != Some(snapshot.refresh_interval)
            && !self.scheduler.reschedule(
                &identity,
                snapshot.refresh_interval,
                self.refresh_task(identity.clone()),
            )
        {
            self.scheduler.schedule(
                identity.clone(),
                snapshot.refresh_interval,
                self.refresh_task(identity.clone()),
            );
        }

        debug!(
            zone = %identity,
            from = current.serial,
            to = serial,
            "Zone updated"
        );
        self.snapshots.insert(identity, snapshot);
    }

    fn build_snapshot(&self, records: Vec<Record>) -> ZoneSnapshot {
        let soa = find_soa(&records);
        let serial = soa
            .and_then(|soa| u32::try_from(soa.serial_number).ok())
            .unwrap_or(0);
        let refresh_interval = soa
            .and_then(|soa| u64::try_from(soa.refresh_interval).ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(self.settings.default_refresh);

        ZoneSnapshot {
            serial,
            refresh_interval,
            records,
            refreshed_at: Utc::now(),
        }
    }

    fn refresh_task(&self, identity: ZoneIdentity) -> RefreshTask {
        let this = self.this.clone();
        Arc::new(move || {
            let this = this.clone();
            let identity = identity.clone();
            Box::pin(async move {
                let Some(cache) = this.upgrade() else {
                    return;
                };
                cache.pending.insert(identity);
                if cache.state() == CacheState::Available {
                    cache.refresh().await;
                }
            })
        })
    }
}

#[async_trait]
impl ZoneCachePort for ZoneCache {
    fn cached_records(&self, identity: &ZoneIdentity) -> Option<Vec<Record>> {
        self.snapshots.get(identity).map(|s| s.records.clone())
    }

    fn flag_for_refresh(&self, identity: &ZoneIdentity) {
        self.pending.insert(identity.clone());
    }

    async fn refresh(&self) {
        ZoneCache::refresh(self).await;
    }
}

#[async_trait]
impl NotifySink for ZoneCache {
    async fn on_notify(&self, zone_name: &str) {
        self.flag_zone_for_refresh(zone_name);
        if self.state() == CacheState::Available {
            ZoneCache::refresh(self).await;
        } else {
            debug!(zone = %zone_name, state = ?self.state(), "NOTIFY flagged, refresh deferred");
        }
    }
}
