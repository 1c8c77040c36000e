use crate::cache::CacheBackend;
use crate::db::Pagination;
use crate::entities::{employee, store, NamedEntity};
use crate::errors::ServiceError;
use crate::repositories::{DirectoryRepository, NameFilter};
use sea_orm::{DatabaseConnection, IntoActiveModel};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Store and employee listings, memoized through the injected cache.
///
/// Cache failures are logged and the listing is read from the database instead.
#[derive(Clone)]
pub struct DirectoryService {
    stores: DirectoryRepository<store::Entity>,
    employees: DirectoryRepository<employee::Entity>,
    cache: Arc<dyn CacheBackend>,
    ttl: Duration,
}

impl DirectoryService {
    pub fn new(db: Arc<DatabaseConnection>, cache: Arc<dyn CacheBackend>, ttl: Duration) -> Self {
        Self {
            stores: DirectoryRepository::new(db.clone()),
            employees: DirectoryRepository::new(db),
            cache,
            ttl,
        }
    }

    #[instrument(skip(self))]
    pub async fn list_stores(
        &self,
        pagination: Pagination,
        name: Option<&str>,
    ) -> Result<Vec<store::Model>, ServiceError> {
        self.cached_listing(&self.stores, "store", pagination, NameFilter::parse(name))
            .await
    }

    #[instrument(skip(self))]
    pub async fn list_employees(
        &self,
        pagination: Pagination,
        name: Option<&str>,
    ) -> Result<Vec<employee::Model>, ServiceError> {
        self.cached_listing(&self.employees, "employee", pagination, NameFilter::parse(name))
            .await
    }

    /// Drop every memoized listing
    pub async fn invalidate(&self) {
        if let Err(e) = self.cache.clear().await {
            warn!(error = %e, "Failed to invalidate directory cache");
        }
    }

    async fn cached_listing<E>(
        &self,
        repository: &DirectoryRepository<E>,
        entity: &str,
        pagination: Pagination,
        filter: NameFilter,
    ) -> Result<Vec<E::Model>, ServiceError>
    where
        E: NamedEntity,
        E::Model: IntoActiveModel<E::ActiveModel> + Serialize + DeserializeOwned + Send + Sync,
        E::ActiveModel: Send,
    {
        let key = format!(
            "directory:{}:page={}:per_page={}:name={}",
            entity,
            pagination.page(),
            pagination.per_page(),
            filter.cache_fragment()
        );

        match self.cache.get(&key).await {
            Ok(Some(hit)) => match serde_json::from_str::<Vec<E::Model>>(&hit) {
                Ok(models) => {
                    debug!(key = %key, "directory cache hit");
                    return Ok(models);
                }
                Err(e) => warn!(key = %key, error = %e, "Discarding unreadable cache entry"),
            },
            Ok(None) => {}
            Err(e) => warn!(key = %key, error = %e, "Directory cache read failed"),
        }

        let models = repository.list_page(pagination, &filter).await?;

        match serde_json::to_string(&models) {
            Ok(serialized) => {
                if let Err(e) = self.cache.set(&key, &serialized, Some(self.ttl)).await {
                    warn!(key = %key, error = %e, "Directory cache write failed");
                }
            }
            Err(e) => warn!(key = %key, error = %e, "Failed to serialize directory listing"),
        }

        Ok(models)
    }
}
