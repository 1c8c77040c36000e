pub mod employee;
pub mod inventory;
pub mod store;

use sea_orm::EntityTrait;

/// Entities that are nothing more than a generated id and a display name.
///
/// Stores and employees share listing, name filtering and bulk creation code through this.
pub trait NamedEntity: EntityTrait {
    fn id_column() -> Self::Column;
    fn name_column() -> Self::Column;
    fn active_from_name(name: String) -> Self::ActiveModel;
    fn model_id(model: &Self::Model) -> i32;
}

impl NamedEntity for store::Entity {
    fn id_column() -> store::Column {
        store::Column::Id
    }

    fn name_column() -> store::Column {
        store::Column::Name
    }

    fn active_from_name(name: String) -> store::ActiveModel {
        store::ActiveModel {
            name: sea_orm::Set(Some(name)),
            ..Default::default()
        }
    }

    fn model_id(model: &store::Model) -> i32 {
        model.id
    }
}

impl NamedEntity for employee::Entity {
    fn id_column() -> employee::Column {
        employee::Column::Id
    }

    fn name_column() -> employee::Column {
        employee::Column::Name
    }

    fn active_from_name(name: String) -> employee::ActiveModel {
        employee::ActiveModel {
            name: sea_orm::Set(Some(name)),
            ..Default::default()
        }
    }

    fn model_id(model: &employee::Model) -> i32 {
        model.id
    }
}
