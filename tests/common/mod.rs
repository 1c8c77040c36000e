#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Method, Request},
    response::Response,
    Router,
};
use chrono::NaiveDate;
use frozono_api::{
    build_router,
    cache::InMemoryCache,
    config::AppConfig,
    db,
    entities::{employee, inventory, store},
    logging::discard_logger,
    AppState,
};
use sea_orm::{ActiveModelTrait, Set};
use serde_json::Value;
use tower::ServiceExt;

/// Helper harness for spinning up an application state backed by an in-memory SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub cache: Arc<InMemoryCache>,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Same as `new`, with a hook to adjust configuration first.
    pub async fn with_config(adjust: impl FnOnce(&mut AppConfig)) -> Self {
        // One connection keeps every query on the same in-memory database.
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;
        adjust(&mut cfg);

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations");

        let cache = Arc::new(InMemoryCache::new(cfg.cache.capacity));
        let state = AppState::new(Arc::new(pool), cfg, cache.clone());
        let router = build_router(state.clone(), discard_logger());

        Self {
            router,
            state,
            cache,
        }
    }

    /// Send a request against the router.
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    pub async fn get(&self, uri: &str) -> Response {
        self.request(Method::GET, uri, None).await
    }

    pub async fn seed_store(&self, name: &str) -> i32 {
        store::ActiveModel {
            name: Set(Some(name.to_string())),
            ..Default::default()
        }
        .insert(self.state.db.as_ref())
        .await
        .expect("create store")
        .id
    }

    pub async fn seed_employee(&self, name: &str) -> i32 {
        employee::ActiveModel {
            name: Set(Some(name.to_string())),
            ..Default::default()
        }
        .insert(self.state.db.as_ref())
        .await
        .expect("create employee")
        .id
    }

    pub async fn seed_inventory(
        &self,
        store_id: Option<i32>,
        employee_id: Option<i32>,
        date: &str,
        flavor: &str,
        is_season_flavor: bool,
        quantity: i32,
    ) -> inventory::Model {
        inventory::ActiveModel {
            store_id: Set(store_id),
            employee_id: Set(employee_id),
            date: Set(NaiveDate::parse_from_str(date, "%Y-%m-%d").expect("date")),
            flavor: Set(flavor.to_string()),
            is_season_flavor: Set(is_season_flavor),
            quantity: Set(quantity),
            ..Default::default()
        }
        .insert(self.state.db.as_ref())
        .await
        .expect("create inventory")
    }
}

pub async fn response_json(response: Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}

/// Ids of a JSON array of records, in order
pub fn ids(body: &Value) -> Vec<i64> {
    body.as_array()
        .expect("array body")
        .iter()
        .map(|record| record["id"].as_i64().expect("id"))
        .collect()
}
