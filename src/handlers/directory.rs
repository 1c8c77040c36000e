use crate::entities::{employee, store};
use crate::errors::ServiceError;
use crate::handlers::common::{success_response, PageDefaults};
use crate::services::directory::DirectoryService;
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::Deserialize;
use utoipa::IntoParams;

pub trait DirectoryHandlerState: Clone + Send + Sync + 'static {
    fn directory_service(&self) -> &DirectoryService;
    fn directory_page_defaults(&self) -> PageDefaults;
}

/// Paging and optional name filter for store and employee listings
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DirectoryQuery {
    /// Page number, 1-indexed
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    /// Several comma-separated names match exactly; a single value is a case-insensitive pattern
    pub name: Option<String>,
}

fn invalid_query(rejection: QueryRejection) -> ServiceError {
    ServiceError::ValidationError(format!("Invalid listing query: {}", rejection.body_text()))
}

pub fn directory_router<S>() -> Router<S>
where
    S: DirectoryHandlerState,
{
    Router::new()
        .route("/store", get(list_stores::<S>))
        .route("/employee", get(list_employees::<S>))
}

#[utoipa::path(
    get,
    path = "/store",
    params(DirectoryQuery),
    responses(
        (status = 200, description = "Stores", body = [store::Model]),
        (status = 400, description = "Malformed paging value", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "directory"
)]
pub async fn list_stores<S>(
    State(state): State<S>,
    query: Result<Query<DirectoryQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ServiceError>
where
    S: DirectoryHandlerState,
{
    let Query(query) = query.map_err(invalid_query)?;
    let pagination = state
        .directory_page_defaults()
        .resolve(query.page, query.per_page);
    let stores = state
        .directory_service()
        .list_stores(pagination, query.name.as_deref())
        .await?;
    Ok(success_response(stores))
}

#[utoipa::path(
    get,
    path = "/employee",
    params(DirectoryQuery),
    responses(
        (status = 200, description = "Employees", body = [employee::Model]),
        (status = 400, description = "Malformed paging value", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "directory"
)]
pub async fn list_employees<S>(
    State(state): State<S>,
    query: Result<Query<DirectoryQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ServiceError>
where
    S: DirectoryHandlerState,
{
    let Query(query) = query.map_err(invalid_query)?;
    let pagination = state
        .directory_page_defaults()
        .resolve(query.page, query.per_page);
    let employees = state
        .directory_service()
        .list_employees(pagination, query.name.as_deref())
        .await?;
    Ok(success_response(employees))
}
