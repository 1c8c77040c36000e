mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{ids, response_json, TestApp};

#[tokio::test]
async fn inventory_record_lifecycle() {
    let app = TestApp::new().await;
    let store_id = app.seed_store("Downtown").await;
    let employee_id = app.seed_employee("Ann").await;
    let other_employee = app.seed_employee("Bob").await;

    let response = app
        .request(
            Method::POST,
            "/inventory",
            Some(json!({
                "store_id": store_id,
                "employee_id": employee_id,
                "date": "2023-06-01",
                "flavor": "Vanilla",
                "is_season_flavor": true,
                "quantity": 12
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = response_json(response).await;
    let id = created["id"].as_i64().expect("id");

    // Round trip through GET returns identical fields
    let response = app.get(&format!("/inventory/{}", id)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let fetched = response_json(response).await;
    assert_eq!(fetched, created);
    assert_eq!(fetched["date"], "2023-06-01");
    assert_eq!(fetched["store_id"], store_id);

    // Update quantity and listing employee with the legacy field names
    let response = app
        .request(
            Method::PUT,
            &format!("/inventory/{}", id),
            Some(json!({"Quantity": 3, "Listed By": other_employee})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = response_json(response).await;
    assert_eq!(updated["quantity"], 3);
    assert_eq!(updated["employee_id"], other_employee);
    assert_eq!(updated["flavor"], "Vanilla");

    // Partial update leaves the employee alone
    let response = app
        .request(
            Method::PUT,
            &format!("/inventory/{}", id),
            Some(json!({"quantity": 4})),
        )
        .await;
    let updated = response_json(response).await;
    assert_eq!(updated["quantity"], 4);
    assert_eq!(updated["employee_id"], other_employee);
}

#[tokio::test]
async fn positional_create_payload_is_accepted() {
    let app = TestApp::new().await;
    let store_id = app.seed_store("Uptown").await;
    let employee_id = app.seed_employee("Cy").await;

    let response = app
        .request(
            Method::POST,
            "/inventory",
            Some(json!([store_id, "2023-07-04", "Mint", "Yes", 8, employee_id])),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_json(response).await;
    assert_eq!(body["flavor"], "Mint");
    assert_eq!(body["is_season_flavor"], true);
    assert_eq!(body["quantity"], 8);
    assert_eq!(body["employee_id"], employee_id);
}

#[tokio::test]
async fn create_rejects_unknown_references_and_bad_payloads() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/inventory",
            Some(json!({"store_id": 99, "date": "2023-06-01", "flavor": "Mint", "quantity": 1})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .request(
            Method::POST,
            "/inventory",
            Some(json!({"date": "June", "flavor": "Mint", "quantity": 1})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert!(body["message"].as_str().unwrap().contains("Invalid inventory payload"));

    let response = app
        .request(
            Method::POST,
            "/inventory",
            Some(json!({"date": "2023-06-01", "flavor": "", "quantity": 1})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_records_are_not_found() {
    let app = TestApp::new().await;

    let response = app.get("/inventory/404").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = response_json(response).await;
    assert_eq!(body["error"], "Not Found");

    let response = app
        .request(Method::PUT, "/inventory/404", Some(json!({"Quantity": 1})))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_rejects_unknown_employee() {
    let app = TestApp::new().await;
    let record = app
        .seed_inventory(None, None, "2023-06-01", "Mint", false, 2)
        .await;

    let response = app
        .request(
            Method::PUT,
            &format!("/inventory/{}", record.id),
            Some(json!({"Listed By": 77})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let unchanged = response_json(app.get(&format!("/inventory/{}", record.id)).await).await;
    assert_eq!(unchanged["employee_id"], serde_json::Value::Null);
}

#[tokio::test]
async fn clear_removes_everything() {
    let app = TestApp::new().await;
    let store_id = app.seed_store("Downtown").await;
    let employee_id = app.seed_employee("Ann").await;
    app.seed_inventory(Some(store_id), Some(employee_id), "2023-06-01", "Vanilla", false, 5)
        .await;

    // Prime the directory cache so a stale listing would show up
    let stores = response_json(app.get("/store").await).await;
    assert_eq!(stores.as_array().unwrap().len(), 1);

    let response = app.request(Method::DELETE, "/inventory/clear", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response_json(response).await,
        json!({"success": "All data cleared successfully"})
    );

    for uri in ["/inventory", "/store", "/employee"] {
        let body = response_json(app.get(uri).await).await;
        assert!(body.as_array().unwrap().is_empty(), "{} not empty", uri);
    }
}

#[tokio::test]
async fn responses_carry_request_id() {
    let app = TestApp::new().await;
    let response = app.get("/inventory").await;
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn health_and_openapi_are_served() {
    let app = TestApp::new().await;

    let response = app.get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["database"], "up");

    let response = app.get("/api-docs/openapi.json").await;
    assert_eq!(response.status(), StatusCode::OK);
    let doc = response_json(response).await;
    assert!(doc["paths"]["/inventory"].is_object());
}

#[tokio::test]
async fn listing_without_filters_is_the_page() {
    let app = TestApp::new().await;
    for quantity in 0..5 {
        app.seed_inventory(None, None, "2023-06-01", "Mint", false, quantity)
            .await;
    }

    let all = response_json(app.get("/inventory").await).await;
    assert_eq!(ids(&all), vec![1, 2, 3, 4, 5]);

    let second = response_json(app.get("/inventory?page=2&per_page=2").await).await;
    assert_eq!(ids(&second), vec![3, 4]);
}
