use axum::{response::Json, routing::get, Router};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Frozono API",
        version = "1.0.0",
        description = r#"
Inventory tracking for frozen dessert stores.

`GET /inventory` accepts `flavor`, `employee_id`, `store_id`, `quantity[eq|gt|gte|lt|lte]`,
`date`, `date[gt|gte|lt|lte]` and `is_season_flavor`; all supplied filters must hold.
Malformed values are rejected with 400.
        "#
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "inventory", description = "Inventory records, bulk import and reset"),
        (name = "directory", description = "Store and employee listings"),
        (name = "health", description = "Health check endpoints")
    ),
    paths(
        crate::handlers::inventory::list_inventory,
        crate::handlers::inventory::create_inventory,
        crate::handlers::inventory::get_inventory,
        crate::handlers::inventory::update_inventory,
        crate::handlers::inventory::clear_inventory,
        crate::handlers::inventory::upload_inventory,
        crate::handlers::directory::list_stores,
        crate::handlers::directory::list_employees,
        crate::handlers::health::health_check,
    ),
    components(
        schemas(
            crate::entities::inventory::Model,
            crate::entities::store::Model,
            crate::entities::employee::Model,
            crate::handlers::inventory::CreateInventoryRequest,
            crate::handlers::inventory::UpdateInventoryRequest,
            crate::services::import::ImportSummary,
            crate::handlers::health::HealthResponse,
            crate::handlers::health::ComponentStatus,
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

/// Serves the generated document at `/api-docs/openapi.json`
pub fn openapi_routes<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route(
        "/api-docs/openapi.json",
        get(|| async { Json(ApiDocV1::openapi()) }),
    )
}
