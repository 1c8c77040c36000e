use async_trait::async_trait;
use sea_orm::sea_query::SimpleExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use std::sync::Arc;
use tracing::{info, instrument};

use crate::db::query_builder::case_insensitive_like;
use crate::db::Pagination;
use crate::entities::inventory::{
    self, ActiveModel as InventoryActiveModel, Column, Entity as Inventory,
    Model as InventoryModel, NewInventory,
};
use crate::entities::{employee, store};
use crate::errors::ServiceError;
use crate::repositories::Repository;
use crate::services::inventory_filter::{Comparison, InventoryGateway, Predicate};

use super::BaseRepository;

/// Rows per multi-row INSERT during bulk loads
pub const INSERT_CHUNK_SIZE: usize = 100;

/// Fields a caller may change on an existing record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventoryChanges {
    pub quantity: Option<i32>,
    pub employee_id: Option<i32>,
}

impl InventoryChanges {
    pub fn is_empty(&self) -> bool {
        self.quantity.is_none() && self.employee_id.is_none()
    }
}

/// Row counts removed by a full reset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClearSummary {
    pub inventory: u64,
    pub employees: u64,
    pub stores: u64,
}

fn compare<V>(column: Column, op: Comparison, value: V) -> SimpleExpr
where
    V: Into<sea_orm::Value>,
{
    match op {
        Comparison::Eq => column.eq(value),
        Comparison::Gt => column.gt(value),
        Comparison::Gte => column.gte(value),
        Comparison::Lt => column.lt(value),
        Comparison::Lte => column.lte(value),
    }
}

/// Translate one typed predicate into a SQL condition
pub fn predicate_condition(predicate: &Predicate) -> SimpleExpr {
    match predicate {
        Predicate::FlavorIn(values) => Column::Flavor.is_in(values.iter().cloned()),
        Predicate::FlavorLike(pattern) => case_insensitive_like(Column::Flavor, pattern),
        Predicate::EmployeeIn(ids) => Column::EmployeeId.is_in(ids.iter().copied()),
        Predicate::EmployeeEq(id) => Column::EmployeeId.eq(*id),
        Predicate::StoreIn(ids) => Column::StoreId.is_in(ids.iter().copied()),
        Predicate::StoreEq(id) => Column::StoreId.eq(*id),
        Predicate::Quantity(op, value) => compare(Column::Quantity, *op, *value),
        Predicate::Date(op, value) => compare(Column::Date, *op, *value),
        Predicate::SeasonFlavor(value) => Column::IsSeasonFlavor.eq(*value),
    }
}

/// Repository for inventory records
#[derive(Debug, Clone)]
pub struct InventoryRepository {
    base: BaseRepository,
}

impl InventoryRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// One page of the unfiltered listing, ordered by id
    pub async fn list_page(&self, pagination: Pagination) -> Result<Vec<InventoryModel>, ServiceError> {
        let select = pagination.apply(Inventory::find().order_by_asc(Column::Id));
        self.base
            .access()
            .execute("inventory.list_page", |db| select.all(db))
            .await
    }

    /// Every record matching a single predicate, ordered by id
    pub async fn filter_one(&self, predicate: &Predicate) -> Result<Vec<InventoryModel>, ServiceError> {
        let select = Inventory::find()
            .filter(predicate_condition(predicate))
            .order_by_asc(Column::Id);
        self.base
            .access()
            .execute("inventory.filter_one", |db| select.all(db))
            .await
    }

    /// Records matching a single predicate, restricted to the given ids
    pub async fn filter_one_within(
        &self,
        predicate: &Predicate,
        ids: &[i32],
    ) -> Result<Vec<InventoryModel>, ServiceError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let select = Inventory::find()
            .filter(predicate_condition(predicate))
            .filter(Column::Id.is_in(ids.iter().copied()))
            .order_by_asc(Column::Id);
        self.base
            .access()
            .execute("inventory.filter_one_within", |db| select.all(db))
            .await
    }

    /// Conjunction of all predicates over the whole table, then paginated
    pub async fn filter_page(
        &self,
        predicates: &[Predicate],
        pagination: Pagination,
    ) -> Result<Vec<InventoryModel>, ServiceError> {
        let condition = predicates
            .iter()
            .fold(Condition::all(), |condition, predicate| {
                condition.add(predicate_condition(predicate))
            });
        let select = pagination.apply(
            Inventory::find()
                .filter(condition)
                .order_by_asc(Column::Id),
        );
        self.base
            .access()
            .execute("inventory.filter_page", |db| select.all(db))
            .await
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<InventoryModel>, ServiceError> {
        self.base
            .access()
            .execute("inventory.find_by_id", |db| Inventory::find_by_id(id).one(db))
            .await
    }

    #[instrument(skip(self))]
    pub async fn create(&self, new: NewInventory) -> Result<InventoryModel, ServiceError> {
        let txn = self.base.get_db().begin().await?;
        let model = new.into_active_model().insert(&txn).await?;
        txn.commit().await?;

        info!(inventory_id = model.id, "Inventory record created");
        Ok(model)
    }

    /// Apply `changes` to record `id`; `None` when the record does not exist
    #[instrument(skip(self))]
    pub async fn update(
        &self,
        id: i32,
        changes: InventoryChanges,
    ) -> Result<Option<InventoryModel>, ServiceError> {
        let txn = self.base.get_db().begin().await?;

        let Some(existing) = Inventory::find_by_id(id).one(&txn).await? else {
            return Ok(None);
        };

        if changes.is_empty() {
            txn.commit().await?;
            return Ok(Some(existing));
        }

        let mut active: InventoryActiveModel = existing.into();
        if let Some(quantity) = changes.quantity {
            active.quantity = Set(quantity);
        }
        if let Some(employee_id) = changes.employee_id {
            active.employee_id = Set(Some(employee_id));
        }

        let updated = active.update(&txn).await?;
        txn.commit().await?;

        info!(inventory_id = id, "Inventory record updated");
        Ok(Some(updated))
    }

    /// Delete every inventory, employee and store row, in that order, atomically
    #[instrument(skip(self))]
    pub async fn clear_all(&self) -> Result<ClearSummary, ServiceError> {
        let txn = self.base.get_db().begin().await?;

        let inventory = Inventory::delete_many().exec(&txn).await?.rows_affected;
        let employees = employee::Entity::delete_many().exec(&txn).await?.rows_affected;
        let stores = store::Entity::delete_many().exec(&txn).await?.rows_affected;

        txn.commit().await?;

        let summary = ClearSummary {
            inventory,
            employees,
            stores,
        };
        info!(?summary, "All inventory data cleared");
        Ok(summary)
    }

    pub async fn store_exists(&self, id: i32) -> Result<bool, ServiceError> {
        let found = self
            .base
            .access()
            .execute("store.find_by_id", |db| store::Entity::find_by_id(id).one(db))
            .await?;
        Ok(found.is_some())
    }

    pub async fn employee_exists(&self, id: i32) -> Result<bool, ServiceError> {
        let found = self
            .base
            .access()
            .execute("employee.find_by_id", |db| employee::Entity::find_by_id(id).one(db))
            .await?;
        Ok(found.is_some())
    }

    /// Insert rows in chunks on a caller-owned connection or transaction
    pub async fn insert_batch<C>(conn: &C, rows: Vec<NewInventory>) -> Result<u64, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut inserted = 0;
        let mut rows = rows.into_iter().peekable();
        while rows.peek().is_some() {
            let chunk: Vec<InventoryActiveModel> = rows
                .by_ref()
                .take(INSERT_CHUNK_SIZE)
                .map(NewInventory::into_active_model)
                .collect();
            inserted += Inventory::insert_many(chunk)
                .exec_without_returning(conn)
                .await?;
        }
        Ok(inserted)
    }
}

#[async_trait]
impl InventoryGateway for InventoryRepository {
    async fn list_page(&self, pagination: Pagination) -> Result<Vec<inventory::Model>, ServiceError> {
        InventoryRepository::list_page(self, pagination).await
    }

    async fn filter_one_within(
        &self,
        predicate: &Predicate,
        ids: &[i32],
    ) -> Result<Vec<inventory::Model>, ServiceError> {
        InventoryRepository::filter_one_within(self, predicate, ids).await
    }

    async fn filter_page(
        &self,
        predicates: &[Predicate],
        pagination: Pagination,
    ) -> Result<Vec<inventory::Model>, ServiceError> {
        InventoryRepository::filter_page(self, predicates, pagination).await
    }
}
