use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use db::DBService;
use http_body_util::BodyExt;
use local_deployment::LocalDeployment;
use serde_json::{Value, json};
use server::routes;
use services::services::config::Config;
use tower::ServiceExt;

async fn make_app() -> Router {
    let db = DBService::new_in_memory().await.unwrap();
    routes::router(LocalDeployment::from_parts(Config::default(), db))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let res = app.clone().oneshot(request).await.unwrap();
    let status = res.status();
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn property_crud() {
    let app = make_app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/properties",
        Some(json!({ "name": "Harbour View", "city": "Hamburg", "rooms": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["status"], json!("available"));
    assert_eq!(body["data"]["customFields"], json!({}));
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/api/properties/{id}"),
        Some(json!({ "status": "occupied", "monthlyRent": 1250.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], json!("occupied"));
    assert_eq!(body["data"]["city"], json!("Hamburg"));
    assert_eq!(body["data"]["rooms"], json!(3));

    let (_, body) = send(&app, "GET", "/api/properties", None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, _) = send(&app, "DELETE", &format!("/api/properties/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = send(&app, "GET", &format!("/api/properties/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn patch_merges_and_deletes_custom_values() {
    let app = make_app().await;
    let (_, body) = send(&app, "POST", "/api/properties", Some(json!({ "name": "Old Mill" }))).await;
    let id = body["data"]["id"].as_str().unwrap().to_string();
    let uri = format!("/api/properties/{id}");

    send(
        &app,
        "PATCH",
        &uri,
        Some(json!({ "customFields": { "floor": 2, "pets": true }, "garage": "north" })),
    )
    .await;

    let (status, body) = send(
        &app,
        "PATCH",
        &uri,
        Some(json!({ "customFields": { "floor": null }, "garage": "south" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"]["customFields"],
        json!({ "pets": true, "garage": "south" })
    );
}

#[tokio::test]
async fn patch_with_fetched_entity_keeps_bag_clean() {
    let app = make_app().await;
    let (_, body) = send(&app, "POST", "/api/properties", Some(json!({ "name": "A" }))).await;
    let id = body["data"]["id"].as_str().unwrap().to_string();
    let uri = format!("/api/properties/{id}");

    let (_, body) = send(&app, "GET", &uri, None).await;
    let mut edited = body["data"].clone();
    edited["name"] = json!("B");
    edited["garage"] = json!("north");

    let (status, body) = send(&app, "PATCH", &uri, Some(edited)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], json!("B"));
    assert_eq!(body["data"]["id"], json!(id));
    assert_eq!(body["data"]["customFields"], json!({ "garage": "north" }));

    let (_, body) = send(
        &app,
        "POST",
        "/api/tenants",
        Some(json!({ "firstName": "Ada", "lastName": "Lovelace" })),
    )
    .await;
    let tenant_uri = format!("/api/tenants/{}", body["data"]["id"].as_str().unwrap());
    let mut edited = body["data"].clone();
    edited["email"] = json!("ada@example.com");

    let (status, body) = send(&app, "PATCH", &tenant_uri, Some(edited)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], json!("ada@example.com"));
    assert_eq!(body["data"]["customFields"], json!({}));
}

#[tokio::test]
async fn patch_rejects_snake_case_fixed_fields() {
    let app = make_app().await;
    let (_, body) = send(&app, "POST", "/api/properties", Some(json!({ "name": "Old Mill" }))).await;
    let id = body["data"]["id"].as_str().unwrap().to_string();
    let uri = format!("/api/properties/{id}");

    let (status, body) = send(&app, "PATCH", &uri, Some(json!({ "monthly_rent": 900 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("monthlyRent"));

    let (_, body) = send(&app, "GET", &uri, None).await;
    assert_eq!(body["data"]["customFields"], json!({}));
    assert_eq!(body["data"]["monthlyRent"], Value::Null);
}

#[tokio::test]
async fn patch_rejects_structured_custom_values() {
    let app = make_app().await;
    let (_, body) = send(&app, "POST", "/api/properties", Some(json!({ "name": "Old Mill" }))).await;
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/api/properties/{id}"),
        Some(json!({ "amenities": ["pool", "gym"] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = send(&app, "GET", &format!("/api/properties/{id}"), None).await;
    assert_eq!(body["data"]["customFields"], json!({}));
}

#[tokio::test]
async fn property_requires_name() {
    let app = make_app().await;

    let (status, _) = send(&app, "POST", "/api/properties", Some(json!({ "name": "  " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "POST", "/api/properties", Some(json!({ "city": "Kiel" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn tenants_filter_by_property_and_see_tenant_fields() {
    let app = make_app().await;
    let (_, body) = send(&app, "POST", "/api/properties", Some(json!({ "name": "Old Mill" }))).await;
    let property_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        "POST",
        "/api/tenants",
        Some(json!({
            "firstName": "Ada",
            "lastName": "Lovelace",
            "propertyId": property_id,
            "leaseStart": "2026-01-01",
            "leaseEnd": "2026-12-31"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["status"], json!("pending"));
    let tenant_id = body["data"]["id"].as_str().unwrap().to_string();

    send(
        &app,
        "POST",
        "/api/tenants",
        Some(json!({ "firstName": "Grace", "lastName": "Hopper" })),
    )
    .await;

    let (_, body) = send(&app, "GET", "/api/tenants", None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    let (_, body) = send(&app, "GET", &format!("/api/tenants?propertyId={property_id}"), None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["firstName"], json!("Ada"));

    let (status, body) = send(
        &app,
        "POST",
        "/api/custom-fields",
        Some(json!({
            "fieldId": "deposit",
            "header": "Deposit",
            "type": "number",
            "entityType": "TENANT"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["seeding"]["updated"].as_array().unwrap().len(), 2);

    let (_, body) = send(
        &app,
        "GET",
        &format!("/api/tenants/{tenant_id}/custom-fields"),
        None,
    )
    .await;
    assert_eq!(body["data"][0]["fieldId"], json!("deposit"));
    assert_eq!(body["data"][0]["value"], json!(0));
    assert_eq!(body["data"][0]["display"], json!("0"));

    let (_, body) = send(
        &app,
        "GET",
        &format!("/api/properties/{property_id}/custom-fields"),
        None,
    )
    .await;
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn tenant_validation_errors() {
    let app = make_app().await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/tenants",
        Some(json!({
            "firstName": "Ada",
            "lastName": "Lovelace",
            "leaseStart": "2026-12-31",
            "leaseEnd": "2026-01-01"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/api/tenants",
        Some(json!({
            "firstName": "Ada",
            "lastName": "Lovelace",
            "propertyId": uuid::Uuid::new_v4()
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "GET", "/api/tenants/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let missing = uuid::Uuid::new_v4();
    let (status, _) = send(&app, "DELETE", &format!("/api/tenants/{missing}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
