use crate::entities::inventory::{Model as InventoryRecord, NewInventory};
use crate::errors::ServiceError;
use crate::handlers::common::{created_response, success_response, validate_input, PageDefaults};
use crate::repositories::InventoryChanges;
use crate::services::import::{ImportService, ImportSummary};
use crate::services::inventory::InventoryService;
use axum::{
    extract::{rejection::JsonRejection, Json, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::PathBuf;
use tracing::error;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

// Trait for inventory handler state that provides access to inventory services
pub trait InventoryHandlerState: Clone + Send + Sync + 'static {
    fn inventory_service(&self) -> &InventoryService;
    fn import_service(&self) -> &ImportService;
    fn inventory_page_defaults(&self) -> PageDefaults;
    fn import_csv_path(&self) -> PathBuf;
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateInventoryRequest {
    pub store_id: Option<i32>,
    pub employee_id: Option<i32>,
    #[schema(value_type = String, format = Date, example = "2023-06-01")]
    pub date: NaiveDate,
    #[validate(length(min = 1, max = 50))]
    pub flavor: String,
    #[serde(default)]
    pub is_season_flavor: bool,
    pub quantity: i32,
}

/// `[store_id, date, flavor, season, quantity, employee_id]`; season is true only for `"Yes"`
pub type PositionalInventoryRow = (Option<i32>, NaiveDate, String, String, i32, Option<i32>);

/// Create payload: named fields, or the older positional array
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CreateInventoryPayload {
    Named(CreateInventoryRequest),
    Positional(PositionalInventoryRow),
}

impl From<CreateInventoryPayload> for CreateInventoryRequest {
    fn from(payload: CreateInventoryPayload) -> Self {
        match payload {
            CreateInventoryPayload::Named(request) => request,
            CreateInventoryPayload::Positional((store_id, date, flavor, season, quantity, employee_id)) => {
                CreateInventoryRequest {
                    store_id,
                    employee_id,
                    date,
                    flavor,
                    is_season_flavor: season == "Yes",
                    quantity,
                }
            }
        }
    }
}

impl From<CreateInventoryRequest> for NewInventory {
    fn from(request: CreateInventoryRequest) -> Self {
        NewInventory {
            store_id: request.store_id,
            employee_id: request.employee_id,
            date: request.date,
            flavor: request.flavor,
            is_season_flavor: request.is_season_flavor,
            quantity: request.quantity,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateInventoryRequest {
    #[serde(rename = "Quantity", alias = "quantity", default)]
    pub quantity: Option<i32>,
    /// Employee id recorded as having listed the entry
    #[serde(rename = "Listed By", alias = "employee_id", default)]
    pub employee_id: Option<i32>,
}

impl From<UpdateInventoryRequest> for InventoryChanges {
    fn from(request: UpdateInventoryRequest) -> Self {
        InventoryChanges {
            quantity: request.quantity,
            employee_id: request.employee_id,
        }
    }
}

/// Documented query keys for the inventory listing
#[derive(Debug, IntoParams)]
#[into_params(parameter_in = Query)]
#[allow(dead_code)]
pub struct InventoryQueryDoc {
    /// Page number, 1-indexed
    page: Option<u64>,
    per_page: Option<u64>,
    /// One value is a case-insensitive pattern, several comma-separated values a membership test
    flavor: Option<String>,
    /// One id, or a comma-separated list
    employee_id: Option<String>,
    /// One id, or a comma-separated list
    store_id: Option<String>,
    #[param(rename = "quantity[eq]")]
    quantity_eq: Option<i32>,
    #[param(rename = "quantity[gt]")]
    quantity_gt: Option<i32>,
    #[param(rename = "quantity[gte]")]
    quantity_gte: Option<i32>,
    #[param(rename = "quantity[lt]")]
    quantity_lt: Option<i32>,
    #[param(rename = "quantity[lte]")]
    quantity_lte: Option<i32>,
    /// YYYY-MM-DD
    date: Option<String>,
    #[param(rename = "date[gt]")]
    date_gt: Option<String>,
    #[param(rename = "date[gte]")]
    date_gte: Option<String>,
    #[param(rename = "date[lt]")]
    date_lt: Option<String>,
    #[param(rename = "date[lte]")]
    date_lte: Option<String>,
    /// true/false, 1/0 or yes/no
    is_season_flavor: Option<String>,
}

/// Create the inventory router
pub fn inventory_router<S>() -> Router<S>
where
    S: InventoryHandlerState,
{
    Router::new()
        .route(
            "/inventory",
            get(list_inventory::<S>).post(create_inventory::<S>),
        )
        .route("/inventory/clear", delete(clear_inventory::<S>))
        .route("/inventory/upload", post(upload_inventory::<S>))
        .route(
            "/inventory/:id",
            get(get_inventory::<S>).put(update_inventory::<S>),
        )
}

/// List inventory records, narrowed by any supplied filters
#[utoipa::path(
    get,
    path = "/inventory",
    params(InventoryQueryDoc),
    responses(
        (status = 200, description = "Matching inventory records", body = [InventoryRecord],
            headers(("X-Request-Id" = String, description = "Unique request id for tracing"))
        ),
        (status = 400, description = "Malformed filter value", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn list_inventory<S>(
    State(state): State<S>,
    Query(query): Query<Vec<(String, String)>>,
) -> Result<impl IntoResponse, ServiceError>
where
    S: InventoryHandlerState,
{
    let pagination = state.inventory_page_defaults().from_pairs(&query)?;
    let records = state.inventory_service().list(&query, pagination).await?;
    Ok(success_response(records))
}

/// Create a single inventory record
#[utoipa::path(
    post,
    path = "/inventory",
    request_body = CreateInventoryRequest,
    responses(
        (status = 201, description = "Inventory record created", body = InventoryRecord),
        (status = 400, description = "Invalid payload or unknown store/employee", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn create_inventory<S>(
    State(state): State<S>,
    payload: Result<Json<CreateInventoryPayload>, JsonRejection>,
) -> Result<impl IntoResponse, ServiceError>
where
    S: InventoryHandlerState,
{
    let Json(payload) = payload.map_err(|rejection| {
        ServiceError::ValidationError(format!("Invalid inventory payload: {}", rejection.body_text()))
    })?;
    let request = CreateInventoryRequest::from(payload);
    validate_input(&request)?;

    let record = state.inventory_service().create(request.into()).await?;
    Ok(created_response(record))
}

/// Fetch one inventory record
#[utoipa::path(
    get,
    path = "/inventory/{id}",
    params(("id" = i32, Path, description = "Inventory record id")),
    responses(
        (status = 200, description = "Inventory record returned", body = InventoryRecord),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn get_inventory<S>(
    State(state): State<S>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError>
where
    S: InventoryHandlerState,
{
    let record = state.inventory_service().get(id).await?;
    Ok(success_response(record))
}

/// Change the quantity and/or listing employee of a record
#[utoipa::path(
    put,
    path = "/inventory/{id}",
    params(("id" = i32, Path, description = "Inventory record id")),
    request_body = UpdateInventoryRequest,
    responses(
        (status = 200, description = "Inventory record updated", body = InventoryRecord),
        (status = 400, description = "Invalid payload or unknown employee", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn update_inventory<S>(
    State(state): State<S>,
    Path(id): Path<i32>,
    payload: Result<Json<UpdateInventoryRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ServiceError>
where
    S: InventoryHandlerState,
{
    let Json(request) = payload.map_err(|rejection| {
        ServiceError::ValidationError(format!("Invalid update payload: {}", rejection.body_text()))
    })?;

    let record = state.inventory_service().update(id, request.into()).await?;
    Ok(success_response(record))
}

/// Delete every inventory, employee and store row
#[utoipa::path(
    delete,
    path = "/inventory/clear",
    responses(
        (status = 200, description = "All data cleared: `{\"success\": \"All data cleared successfully\"}`"),
        (status = 500, description = "Clear failed: `{\"error\": \"<message>\"}`")
    ),
    tag = "inventory"
)]
pub async fn clear_inventory<S>(State(state): State<S>) -> Response
where
    S: InventoryHandlerState,
{
    match state.inventory_service().clear().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({"success": "All data cleared successfully"})),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Clear request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": e.to_string()})),
            )
                .into_response()
        }
    }
}

/// Load the configured CSV file
#[utoipa::path(
    post,
    path = "/inventory/upload",
    responses(
        (status = 200, description = "Import finished", body = ImportSummary),
        (status = 400, description = "Undecodable CSV row", body = crate::errors::ErrorResponse),
        (status = 422, description = "Import file unavailable", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn upload_inventory<S>(State(state): State<S>) -> Result<impl IntoResponse, ServiceError>
where
    S: InventoryHandlerState,
{
    let path = state.import_csv_path();
    let summary = state.import_service().import_path(&path).await?;
    Ok(success_response(summary))
}
