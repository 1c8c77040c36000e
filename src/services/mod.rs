// Inventory querying and maintenance
pub mod inventory;
pub mod inventory_filter;

// Store and employee listings
pub mod directory;

// Bulk CSV loading
pub mod import;
