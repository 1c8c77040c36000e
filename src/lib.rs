//! Frozono API Library
//!
//! Inventory tracking over stores, employees and flavor counts, with a filterable
//! listing endpoint and bulk CSV import.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod cache;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod logging;
pub mod middleware_helpers;
pub mod migrator;
pub mod openapi;
pub mod repositories;
pub mod services;
pub mod tracing;

use axum::Router;
use sea_orm::DatabaseConnection;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;

use crate::cache::CacheBackend;
use crate::handlers::common::PageDefaults;
use crate::handlers::{DirectoryHandlerState, InventoryHandlerState};
use crate::services::{
    directory::DirectoryService, import::ImportService, inventory::InventoryService,
};

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub inventory_service: InventoryService,
    pub directory_service: DirectoryService,
    pub import_service: ImportService,
}

impl AppState {
    /// Wire every service over one pool and one cache backend
    pub fn new(
        db: Arc<DatabaseConnection>,
        config: config::AppConfig,
        cache: Arc<dyn CacheBackend>,
    ) -> Self {
        let directory_service = DirectoryService::new(db.clone(), cache, config.cache.ttl());
        let inventory_service =
            InventoryService::new(db.clone(), directory_service.clone(), config.filter_strategy);
        let import_service = ImportService::new(db.clone(), directory_service.clone());

        Self {
            db,
            config,
            inventory_service,
            directory_service,
            import_service,
        }
    }
}

impl InventoryHandlerState for AppState {
    fn inventory_service(&self) -> &InventoryService {
        &self.inventory_service
    }

    fn import_service(&self) -> &ImportService {
        &self.import_service
    }

    fn inventory_page_defaults(&self) -> PageDefaults {
        PageDefaults {
            per_page: self.config.inventory_default_per_page,
            max_per_page: self.config.api_max_page_size,
        }
    }

    fn import_csv_path(&self) -> PathBuf {
        PathBuf::from(&self.config.import_csv_path)
    }
}

impl DirectoryHandlerState for AppState {
    fn directory_service(&self) -> &DirectoryService {
        &self.directory_service
    }

    fn directory_page_defaults(&self) -> PageDefaults {
        PageDefaults {
            per_page: self.config.directory_default_per_page,
            max_per_page: self.config.api_max_page_size,
        }
    }
}

/// All routes with request id, tracing, access log and compression layers.
///
/// CORS is left to the caller since it depends on deployment configuration.
pub fn build_router(state: AppState, access_logger: slog::Logger) -> Router {
    let logging_state = Arc::new(logging::LoggingState::new(access_logger));

    Router::new()
        .merge(handlers::inventory::inventory_router::<AppState>())
        .merge(handlers::directory::directory_router::<AppState>())
        .merge(handlers::health::health_routes())
        .merge(openapi::openapi_routes::<AppState>())
        .layer(axum::middleware::from_fn_with_state(
            logging_state,
            logging::logging_middleware,
        ))
        // HTTP tracing layer for consistent request/response telemetry
        .layer(crate::tracing::configure_http_tracing())
        .layer(CompressionLayer::new())
        // Ensure every request carries a request id for traceability
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id_middleware,
        ))
        .with_state(state)
}
