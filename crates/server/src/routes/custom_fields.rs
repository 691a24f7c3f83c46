use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::Json as ResponseJson,
    routing::{get, put},
};
use db::models::custom_field::{CreateCustomField, CustomFieldDefinition, UpdateCustomField};
use deployment::Deployment;
use serde::Deserialize;
use services::services::{
    custom_field::{CreatedCustomField, CustomFieldService, parse_entity_type},
    custom_field_sync::SyncReport,
};
use uuid::Uuid;
use utils::response::ApiResponse;

use crate::{DeploymentImpl, error::ApiError};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub entity_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteQuery {
    #[serde(default)]
    pub cleanup_data: bool,
}

/// GET /api/custom-fields?entityType=PROPERTY|TENANT
pub async fn list_custom_fields(
    State(deployment): State<DeploymentImpl>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<ResponseJson<ApiResponse<Vec<CustomFieldDefinition>>>, ApiError> {
    let Query(query) = query?;
    let entity_type = query
        .entity_type
        .as_deref()
        .map(parse_entity_type)
        .transpose()?;

    let definitions = CustomFieldService::list(&deployment.db().pool, entity_type).await?;
    Ok(ResponseJson(ApiResponse::success(definitions)))
}

/// POST /api/custom-fields
/// Registers the field and seeds its default into existing entities
pub async fn create_custom_field(
    State(deployment): State<DeploymentImpl>,
    payload: Result<Json<CreateCustomField>, JsonRejection>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<CreatedCustomField>>), ApiError> {
    let Json(payload) = payload?;
    let created = CustomFieldService::create(&deployment.db().pool, payload).await?;

    if !created.seeding.is_complete() {
        tracing::warn!(
            field_id = %created.definition.field_id,
            failed = created.seeding.failed.len(),
            "Custom field created with incomplete seeding"
        );
    }

    Ok((StatusCode::CREATED, ResponseJson(ApiResponse::success(created))))
}

/// PUT /api/custom-fields/{id}
pub async fn update_custom_field(
    State(deployment): State<DeploymentImpl>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdateCustomField>, JsonRejection>,
) -> Result<ResponseJson<ApiResponse<CustomFieldDefinition>>, ApiError> {
    let Path(id) = id?;
    let Json(payload) = payload?;
    let definition = CustomFieldService::update(&deployment.db().pool, id, payload).await?;
    Ok(ResponseJson(ApiResponse::success(definition)))
}

/// DELETE /api/custom-fields/{id}?cleanupData=true|false
/// Data carries the cleanup report, or null when values were left in place
pub async fn delete_custom_field(
    State(deployment): State<DeploymentImpl>,
    id: Result<Path<Uuid>, PathRejection>,
    query: Result<Query<DeleteQuery>, QueryRejection>,
) -> Result<ResponseJson<ApiResponse<Option<SyncReport>>>, ApiError> {
    let Path(id) = id?;
    let Query(query) = query?;
    let cleanup =
        CustomFieldService::delete(&deployment.db().pool, id, query.cleanup_data).await?;
    Ok(ResponseJson(ApiResponse::success(cleanup)))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new()
        .route(
            "/custom-fields",
            get(list_custom_fields).post(create_custom_field),
        )
        .route(
            "/custom-fields/{id}",
            put(update_custom_field).delete(delete_custom_field),
        )
}
