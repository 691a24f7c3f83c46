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
use services::services::{config::Config, custom_field_display::DisplayLocale};
use tower::ServiceExt;

async fn make_app(locale: DisplayLocale) -> (Router, DBService) {
    let db = DBService::new_in_memory().await.unwrap();
    let config = Config {
        display_locale: locale,
        ..Config::default()
    };
    let app = routes::router(LocalDeployment::from_parts(config, db.clone()));
    (app, db)
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

async fn create_property(app: &Router, name: &str) -> String {
    let (status, body) = send(app, "POST", "/api/properties", Some(json!({ "name": name }))).await;
    assert_eq!(status, StatusCode::CREATED);
    body["data"]["id"].as_str().unwrap().to_string()
}

fn warranty_field() -> Value {
    json!({
        "fieldId": "warranty",
        "header": "Warranty",
        "type": "date",
        "entityType": "PROPERTY"
    })
}

#[tokio::test]
async fn health_check_responds_ok() {
    let (app, _db) = make_app(DisplayLocale::En).await;

    let (status, body) = send(&app, "GET", "/api/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"], json!("ok"));
}

#[tokio::test]
async fn warranty_field_lifecycle() {
    let (app, _db) = make_app(DisplayLocale::En).await;
    let first = create_property(&app, "Harbour View").await;
    let second = create_property(&app, "Old Mill").await;

    let (status, body) = send(&app, "POST", "/api/custom-fields", Some(warranty_field())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["fieldId"], json!("warranty"));
    assert_eq!(body["data"]["type"], json!("date"));
    assert_eq!(body["data"]["order"], json!(0));
    assert_eq!(body["data"]["seeding"]["updated"].as_array().unwrap().len(), 2);
    let definition_id = body["data"]["id"].as_str().unwrap().to_string();

    let (_, body) = send(&app, "GET", &format!("/api/properties/{second}"), None).await;
    assert!(body["data"]["customFields"]["warranty"].is_string());

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/api/properties/{first}"),
        Some(json!({ "warranty": "2030-01-31" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["customFields"]["warranty"], json!("2030-01-31"));
    assert_eq!(body["data"]["name"], json!("Harbour View"));

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/properties/{first}/custom-fields"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["header"], json!("Warranty"));
    assert_eq!(body["data"][0]["display"], json!("01/31/2030"));

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/api/custom-fields/{definition_id}?cleanupData=true"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["updated"].as_array().unwrap().len(), 2);

    for id in [&first, &second] {
        let (_, body) = send(&app, "GET", &format!("/api/properties/{id}"), None).await;
        assert_eq!(body["data"]["customFields"], json!({}));
    }

    let (_, body) = send(&app, "GET", "/api/custom-fields?entityType=PROPERTY", None).await;
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn duplicate_field_id_is_conflict_even_across_entity_types() {
    let (app, _db) = make_app(DisplayLocale::En).await;

    let (status, _) = send(&app, "POST", "/api/custom-fields", Some(warranty_field())).await;
    assert_eq!(status, StatusCode::CREATED);

    let mut tenant_field = warranty_field();
    tenant_field["entityType"] = json!("TENANT");
    let (status, body) = send(&app, "POST", "/api/custom-fields", Some(tenant_field)).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], json!(false));
    assert!(body["message"].as_str().unwrap().contains("warranty"));
}

#[tokio::test]
async fn invalid_definitions_are_bad_requests() {
    let (app, _db) = make_app(DisplayLocale::En).await;

    let mut unknown_type = warranty_field();
    unknown_type["type"] = json!("currency");
    let mut blank_header = warranty_field();
    blank_header["header"] = json!("   ");
    let mut long_id = warranty_field();
    long_id["fieldId"] = json!("x".repeat(51));
    let mut bad_entity = warranty_field();
    bad_entity["entityType"] = json!("BUILDING");

    for body in [unknown_type, blank_header, long_id, bad_entity] {
        let (status, response) = send(&app, "POST", "/api/custom-fields", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{response}");
    }

    let (status, _) = send(&app, "GET", "/api/custom-fields?entityType=BUILDING", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = send(&app, "GET", "/api/custom-fields", None).await;
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn unknown_definition_is_not_found() {
    let (app, _db) = make_app(DisplayLocale::En).await;
    let missing = uuid::Uuid::new_v4();

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/custom-fields/{missing}"),
        Some(json!({ "header": "Renamed" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "DELETE", &format!("/api/custom-fields/{missing}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_changes_header_and_type() {
    let (app, _db) = make_app(DisplayLocale::En).await;
    let (_, body) = send(&app, "POST", "/api/custom-fields", Some(warranty_field())).await;
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/custom-fields/{id}"),
        Some(json!({ "header": "Warranty until", "type": "text", "order": 4 })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["header"], json!("Warranty until"));
    assert_eq!(body["data"]["type"], json!("text"));
    assert_eq!(body["data"]["order"], json!(4));
    assert_eq!(body["data"]["fieldId"], json!("warranty"));
}

#[tokio::test]
async fn delete_without_cleanup_leaves_values_in_place() {
    let (app, _db) = make_app(DisplayLocale::De).await;
    let property = create_property(&app, "Harbour View").await;

    let (_, body) = send(
        &app,
        "POST",
        "/api/custom-fields",
        Some(json!({
            "fieldId": "parking",
            "header": "Parking",
            "type": "boolean",
            "entityType": "PROPERTY"
        })),
    )
    .await;
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (_, body) = send(
        &app,
        "GET",
        &format!("/api/properties/{property}/custom-fields"),
        None,
    )
    .await;
    assert_eq!(body["data"][0]["display"], json!("Nein"));

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/api/custom-fields/{id}?cleanupData=false"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], Value::Null);

    let (_, body) = send(&app, "GET", &format!("/api/properties/{property}"), None).await;
    assert_eq!(body["data"]["customFields"]["parking"], json!(false));

    let (_, body) = send(
        &app,
        "GET",
        &format!("/api/properties/{property}/custom-fields"),
        None,
    )
    .await;
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn incomplete_cleanup_is_server_error_with_report() {
    let (app, db) = make_app(DisplayLocale::En).await;
    create_property(&app, "Harbour View").await;
    let locked = create_property(&app, "Locked").await;

    let (_, body) = send(&app, "POST", "/api/custom-fields", Some(warranty_field())).await;
    let id = body["data"]["id"].as_str().unwrap().to_string();

    sqlx::query(
        r#"CREATE TRIGGER reject_locked BEFORE UPDATE OF custom_fields ON properties
        WHEN OLD.name = 'Locked'
        BEGIN SELECT RAISE(ABORT, 'property is locked'); END"#,
    )
    .execute(&db.pool)
    .await
    .unwrap();

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/api/custom-fields/{id}?cleanupData=true"),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error_data"]["failed"][0]["entityId"], json!(locked));
    assert_eq!(body["error_data"]["updated"].as_array().unwrap().len(), 1);

    let (_, body) = send(&app, "GET", "/api/custom-fields", None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let (app, _db) = make_app(DisplayLocale::En).await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/custom-fields")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let res = app.oneshot(request).await.unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}
