use async_trait::async_trait;
use std::sync::Arc;
use zone_manager_domain::{DomainError, Record, RecordType, View, Zone};

/// DNS operations against the resolvers of one zone.
#[async_trait]
pub trait ZoneExecutor: Send + Sync {
    /// Full zone transfer. Resolvers are tried in order; the first success
    /// wins and an empty list is returned when every resolver fails.
    async fn find_records(&self) -> Result<Vec<Record>, DomainError>;

    /// Uncached lookup of `name` within the zone. `None` or `ANY` returns
    /// every type.
    async fn lookup(
        &self,
        record_type: Option<RecordType>,
        name: &str,
    ) -> Result<Vec<Record>, DomainError>;

    /// Sends every record's operation in a single signed dynamic update.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - The server answered NOERROR
    /// * `Ok(false)` - The server answered with any other response code
    /// * `Err(DomainError)` - No resolver accepted the connection, a record
    ///   could not be converted, or the exchange failed
    async fn process_record_operations(&self, records: &[Record]) -> Result<bool, DomainError>;

    /// Incremental zone transfer from `last_serial`, applied in place to
    /// `records`. Returns the serial the records are now at.
    async fn update_records(
        &self,
        records: &mut Vec<Record>,
        last_serial: u32,
    ) -> Result<u32, DomainError>;
}

/// Builds executors bound to a zone, its view's resolvers and its keys.
#[async_trait]
pub trait ZoneExecutorFactory: Send + Sync {
    async fn create(&self, view: &View, zone: &Zone) -> Result<Arc<dyn ZoneExecutor>, DomainError>;
}
