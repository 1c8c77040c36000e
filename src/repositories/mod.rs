use crate::db::DatabaseAccess;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

pub mod directory_repository;
pub mod inventory_repository;

pub use directory_repository::{DirectoryRepository, NameFilter};
pub use inventory_repository::{ClearSummary, InventoryChanges, InventoryRepository};

/// Repository trait for common database operations
pub trait Repository {
    fn get_db(&self) -> &DatabaseConnection;
}

#[derive(Debug, Clone)]
pub struct BaseRepository {
    access: DatabaseAccess,
}

impl BaseRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            access: DatabaseAccess::new(db),
        }
    }

    pub fn access(&self) -> &DatabaseAccess {
        &self.access
    }
}

impl Repository for BaseRepository {
    fn get_db(&self) -> &DatabaseConnection {
        self.access.get_pool()
    }
}
