use chrono::NaiveDate;
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One flavor count taken at a store on a given day.
///
/// Equality covers every column, so two models compare equal only when the whole
/// record matches.
#[derive(Clone, Debug, PartialEq, Eq, Hash, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "inventory")]
#[schema(as = InventoryRecord)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub store_id: Option<i32>,
    pub employee_id: Option<i32>,
    #[schema(value_type = String, format = Date, example = "2023-06-01")]
    pub date: NaiveDate,
    pub flavor: String,
    pub is_season_flavor: bool,
    pub quantity: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::store::Entity",
        from = "Column::StoreId",
        to = "super::store::Column::Id"
    )]
    Store,
    #[sea_orm(
        belongs_to = "super::employee::Entity",
        from = "Column::EmployeeId",
        to = "super::employee::Column::Id"
    )]
    Employee,
}

impl Related<super::store::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Store.def()
    }
}

impl Related<super::employee::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Employee.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Field values for an inventory row that has not been persisted yet
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewInventory {
    pub store_id: Option<i32>,
    pub employee_id: Option<i32>,
    pub date: NaiveDate,
    pub flavor: String,
    pub is_season_flavor: bool,
    pub quantity: i32,
}

impl NewInventory {
    pub fn into_active_model(self) -> ActiveModel {
        ActiveModel {
            store_id: Set(self.store_id),
            employee_id: Set(self.employee_id),
            date: Set(self.date),
            flavor: Set(self.flavor),
            is_season_flavor: Set(self.is_season_flavor),
            quantity: Set(self.quantity),
            ..Default::default()
        }
    }
}
