#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use zone_manager_application::ports::{
    ConfigurationRepository, ZoneCachePort, ZoneExecutor, ZoneExecutorFactory,
};
use zone_manager_domain::{
    DomainError, Record, RecordData, RecordType, Resolver, TsigAlgorithm, TsigKey, View, Zone,
    ZoneIdentity, ZoneType,
};

// ============================================================================
// Fixtures
// ============================================================================

pub fn sample_view() -> View {
    View {
        name: "internal".to_string(),
        resolvers: vec![Resolver::new("10.0.0.53", 53), Resolver::new("10.0.1.53", 53)],
    }
}

pub fn sample_zone() -> Zone {
    Zone::new("zone.test", ZoneType::Forward, "internal")
}

pub fn sample_records() -> Vec<Record> {
    vec![
        Record::new("@", RecordData::ns("ns1.zone.test.")),
        Record::new("www", RecordData::a("10.0.0.1")),
        Record::new("mail", RecordData::a("10.0.0.2")),
        Record::new("@", RecordData::mx("mail", 10)),
    ]
}

pub fn sample_key() -> TsigKey {
    TsigKey {
        name: "update-key".to_string(),
        algorithm: TsigAlgorithm::HmacSha256,
        secret: "c2VjcmV0".to_string(),
    }
}

// ============================================================================
// Mock ConfigurationRepository
// ============================================================================

pub struct MockConfigurationRepository {
    views: Vec<View>,
    zones: Vec<Zone>,
    keys: Vec<TsigKey>,
}

impl MockConfigurationRepository {
    pub fn new() -> Self {
        Self {
            views: vec![sample_view()],
            zones: vec![sample_zone()],
            keys: vec![sample_key()],
        }
    }

    pub fn with(views: Vec<View>, zones: Vec<Zone>) -> Self {
        Self {
            views,
            zones,
            keys: Vec::new(),
        }
    }
}

#[async_trait]
impl ConfigurationRepository for MockConfigurationRepository {
    async fn find_view(&self, view: &str) -> Result<Option<View>, DomainError> {
        Ok(self.views.iter().find(|v| v.name == view).cloned())
    }

    async fn find_views(&self) -> Result<Vec<View>, DomainError> {
        Ok(self.views.clone())
    }

    async fn find_zone(&self, view: &str, zone: &str) -> Result<Option<Zone>, DomainError> {
        let wanted = ZoneIdentity::new(view, zone);
        Ok(self.zones.iter().find(|z| z.identity() == wanted).cloned())
    }

    async fn find_zones(&self, view: &str) -> Result<Vec<Zone>, DomainError> {
        if !self.views.iter().any(|v| v.name == view) {
            return Err(DomainError::ViewNotFound(view.to_string()));
        }
        Ok(self.zones.iter().filter(|z| z.view == view).cloned().collect())
    }

    async fn find_resolvers(&self) -> Result<Vec<Resolver>, DomainError> {
        let mut seen = HashSet::new();
        Ok(self
            .views
            .iter()
            .flat_map(|v| v.resolvers.iter().cloned())
            .filter(|r| seen.insert(r.clone()))
            .collect())
    }

    async fn find_tsig_keys(&self) -> Result<Vec<TsigKey>, DomainError> {
        Ok(self.keys.clone())
    }

    async fn find_tsig_key(&self, name: &str) -> Result<Option<TsigKey>, DomainError> {
        Ok(self.keys.iter().find(|k| k.name == name).cloned())
    }
}

// ============================================================================
// Mock ZoneExecutor
// ============================================================================

#[derive(Clone)]
pub enum UpdateOutcome {
    Accept,
    Reject,
    Fail,
}

pub struct MockZoneExecutor {
    records: Vec<Record>,
    update_outcome: Mutex<UpdateOutcome>,
    transfers: AtomicUsize,
    submitted: Mutex<Vec<Record>>,
}

impl MockZoneExecutor {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records,
            update_outcome: Mutex::new(UpdateOutcome::Accept),
            transfers: AtomicUsize::new(0),
            submitted: Mutex::new(Vec::new()),
        }
    }

    pub fn set_update_outcome(&self, outcome: UpdateOutcome) {
        *self.update_outcome.lock().unwrap() = outcome;
    }

    pub fn transfer_count(&self) -> usize {
        self.transfers.load(Ordering::SeqCst)
    }

    pub fn submitted(&self) -> Vec<Record> {
        self.submitted.lock().unwrap().clone()
    }
}

#[async_trait]
impl ZoneExecutor for MockZoneExecutor {
    async fn find_records(&self) -> Result<Vec<Record>, DomainError> {
        self.transfers.fetch_add(1, Ordering::SeqCst);
        Ok(self.records.clone())
    }

    async fn lookup(
        &self,
        record_type: Option<RecordType>,
        name: &str,
    ) -> Result<Vec<Record>, DomainError> {
        let wanted = record_type.unwrap_or(RecordType::ANY);
        Ok(self
            .records
            .iter()
            .filter(|r| r.name == name && wanted.matches(r.record_type()))
            .cloned()
            .collect())
    }

    async fn process_record_operations(&self, records: &[Record]) -> Result<bool, DomainError> {
        self.submitted.lock().unwrap().extend_from_slice(records);
        match self.update_outcome.lock().unwrap().clone() {
            UpdateOutcome::Accept => Ok(true),
            UpdateOutcome::Reject => Ok(false),
            UpdateOutcome::Fail => Err(DomainError::Transport("connection refused".to_string())),
        }
    }

    async fn update_records(
        &self,
        _records: &mut Vec<Record>,
        last_serial: u32,
    ) -> Result<u32, DomainError> {
        Ok(last_serial)
    }
}

pub struct MockExecutorFactory {
    executor: Arc<MockZoneExecutor>,
}

impl MockExecutorFactory {
    pub fn new(executor: Arc<MockZoneExecutor>) -> Self {
        Self { executor }
    }
}

/// Fails every executor creation, as when a TSIG key cannot be loaded.
pub struct FailingExecutorFactory;

#[async_trait]
impl ZoneExecutorFactory for FailingExecutorFactory {
    async fn create(&self, _view: &View, _zone: &Zone) -> Result<Arc<dyn ZoneExecutor>, DomainError> {
        Err(DomainError::Tsig("unsupported algorithm".to_string()))
    }
}

#[async_trait]
impl ZoneExecutorFactory for MockExecutorFactory {
    async fn create(&self, _view: &View, _zone: &Zone) -> Result<Arc<dyn ZoneExecutor>, DomainError> {
        Ok(self.executor.clone())
    }
}

// ============================================================================
// Mock ZoneCachePort
// ============================================================================

#[derive(Default)]
pub struct MockZoneCache {
    snapshot: Mutex<Option<(ZoneIdentity, Vec<Record>)>>,
    flagged: Mutex<Vec<ZoneIdentity>>,
    refreshes: AtomicUsize,
}

impl MockZoneCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(identity: ZoneIdentity, records: Vec<Record>) -> Self {
        let cache = Self::default();
        *cache.snapshot.lock().unwrap() = Some((identity, records));
        cache
    }

    pub fn flagged(&self) -> Vec<ZoneIdentity> {
        self.flagged.lock().unwrap().clone()
    }

    pub fn refresh_count(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ZoneCachePort for MockZoneCache {
    fn cached_records(&self, identity: &ZoneIdentity) -> Option<Vec<Record>> {
        self.snapshot
            .lock()
            .unwrap()
            .as_ref()
            .filter(|(id, _)| id == identity)
            .map(|(_, records)| records.clone())
    }

    fn flag_for_refresh(&self, identity: &ZoneIdentity) {
        self.flagged.lock().unwrap().push(identity.clone());
    }

    async fn refresh(&self) {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
    }
}
