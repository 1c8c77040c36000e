pub mod common;
pub mod directory;
pub mod health;
pub mod inventory;

pub use directory::DirectoryHandlerState;
pub use inventory::InventoryHandlerState;
