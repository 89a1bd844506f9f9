use async_trait::async_trait;
use zone_manager_domain::{DomainError, Resolver, TsigKey, View, Zone};

/// Read access to the configuration store holding views, zones, resolvers
/// and TSIG keys.
///
/// Implementations own the canonical copies; every call returns an owned
/// snapshot that callers may hold for the duration of a request.
#[async_trait]
pub trait ConfigurationRepository: Send + Sync {
    /// Retrieves a view by its name.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(View))` - If the view exists
    /// * `Ok(None)` - If no view with this name exists
    /// * `Err(DomainError)` - If retrieval fails
    async fn find_view(&self, view: &str) -> Result<Option<View>, DomainError>;

    /// Retrieves all views in configuration order.
    async fn find_views(&self) -> Result<Vec<View>, DomainError>;

    /// Retrieves a zone of a view. Zone names compare case-insensitively and
    /// ignore a trailing dot.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(Zone))` - If the view contains the zone
    /// * `Ok(None)` - If the view or the zone does not exist
    /// * `Err(DomainError)` - If retrieval fails
    async fn find_zone(&self, view: &str, zone: &str) -> Result<Option<Zone>, DomainError>;

    /// Retrieves all zones of a view.
    ///
    /// # Errors
    ///
    /// * `DomainError::ViewNotFound` - If the view doesn't exist
    async fn find_zones(&self, view: &str) -> Result<Vec<Zone>, DomainError>;

    /// Retrieves every resolver referenced by any view, without duplicates.
    async fn find_resolvers(&self) -> Result<Vec<Resolver>, DomainError>;

    /// Retrieves all TSIG keys.
    async fn find_tsig_keys(&self) -> Result<Vec<TsigKey>, DomainError>;

    /// Retrieves a TSIG key by its name.
    async fn find_tsig_key(&self, name: &str) -> Result<Option<TsigKey>, DomainError>;
}
