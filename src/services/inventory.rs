use crate::{
    db::Pagination,
    entities::inventory::{Model as InventoryModel, NewInventory},
    errors::ServiceError,
    repositories::{ClearSummary, InventoryChanges, InventoryRepository},
    services::directory::DirectoryService,
    services::inventory_filter::{apply_filter, FilterStrategy, InventoryFilter},
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tracing::{error, info, instrument};

/// Service for querying and maintaining inventory records
#[derive(Clone)]
pub struct InventoryService {
    repository: InventoryRepository,
    directory: DirectoryService,
    strategy: FilterStrategy,
}

impl InventoryService {
    /// Creates a new inventory service instance
    pub fn new(
        db_pool: Arc<DatabaseConnection>,
        directory: DirectoryService,
        strategy: FilterStrategy,
    ) -> Self {
        Self {
            repository: InventoryRepository::new(db_pool),
            directory,
            strategy,
        }
    }

    /// Filtered listing for raw query pairs. Every value is validated before the store is read.
    #[instrument(skip(self, query))]
    pub async fn list(
        &self,
        query: &[(String, String)],
        pagination: Pagination,
    ) -> Result<Vec<InventoryModel>, ServiceError> {
        let filter =
            InventoryFilter::from_query_pairs(query.iter().map(|(k, v)| (k.as_str(), v.as_str())))?;
        apply_filter(&self.repository, &filter, pagination, self.strategy).await
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i32) -> Result<InventoryModel, ServiceError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Inventory record {} not found", id)))
    }

    #[instrument(skip(self))]
    pub async fn create(&self, new: NewInventory) -> Result<InventoryModel, ServiceError> {
        if let Some(store_id) = new.store_id {
            self.ensure_store(store_id).await?;
        }
        if let Some(employee_id) = new.employee_id {
            self.ensure_employee(employee_id).await?;
        }
        self.repository.create(new).await
    }

    #[instrument(skip(self))]
    pub async fn update(
        &self,
        id: i32,
        changes: InventoryChanges,
    ) -> Result<InventoryModel, ServiceError> {
        if let Some(employee_id) = changes.employee_id {
            self.ensure_employee(employee_id).await?;
        }
        self.repository
            .update(id, changes)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Inventory record {} not found", id)))
    }

    /// Remove all inventory, employees and stores
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<ClearSummary, ServiceError> {
        let summary = self.repository.clear_all().await.map_err(|e| {
            error!(error = %e, "Failed to clear inventory data");
            e
        })?;
        self.directory.invalidate().await;
        info!(
            inventory = summary.inventory,
            employees = summary.employees,
            stores = summary.stores,
            "Cleared all data"
        );
        Ok(summary)
    }

    async fn ensure_store(&self, id: i32) -> Result<(), ServiceError> {
        if self.repository.store_exists(id).await? {
            Ok(())
        } else {
            Err(ServiceError::ValidationError(format!("store {} does not exist", id)))
        }
    }

    async fn ensure_employee(&self, id: i32) -> Result<(), ServiceError> {
        if self.repository.employee_exists(id).await? {
            Ok(())
        } else {
            Err(ServiceError::ValidationError(format!(
                "employee {} does not exist",
                id
            )))
        }
    }
}
