use axum::{
    Json, Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::Json as ResponseJson,
    routing::get,
};
use db::models::{
    custom_field::{CustomFieldDefinition, EntityType},
    property::{CreateProperty, Property, UpdateProperty},
};
use deployment::Deployment;
use services::services::{
    custom_field_display::{CustomFieldDisplay, display_rows},
    entity::EntityService,
};
use uuid::Uuid;
use utils::response::ApiResponse;

use crate::{DeploymentImpl, error::ApiError};

pub async fn list_properties(
    State(deployment): State<DeploymentImpl>,
) -> Result<ResponseJson<ApiResponse<Vec<Property>>>, ApiError> {
    let properties = EntityService::list_properties(&deployment.db().pool).await?;
    Ok(ResponseJson(ApiResponse::success(properties)))
}

pub async fn get_property(
    State(deployment): State<DeploymentImpl>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<ResponseJson<ApiResponse<Property>>, ApiError> {
    let Path(id) = id?;
    let property = EntityService::get_property(&deployment.db().pool, id).await?;
    Ok(ResponseJson(ApiResponse::success(property)))
}

pub async fn create_property(
    State(deployment): State<DeploymentImpl>,
    payload: Result<Json<CreateProperty>, JsonRejection>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<Property>>), ApiError> {
    let Json(payload) = payload?;
    let property = EntityService::create_property(&deployment.db().pool, payload).await?;
    Ok((StatusCode::CREATED, ResponseJson(ApiResponse::success(property))))
}

/// PATCH /api/properties/{id}
/// Unknown top-level keys are merged into the custom field bag; null removes a key
pub async fn update_property(
    State(deployment): State<DeploymentImpl>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdateProperty>, JsonRejection>,
) -> Result<ResponseJson<ApiResponse<Property>>, ApiError> {
    let Path(id) = id?;
    let Json(payload) = payload?;
    let property = EntityService::update_property(&deployment.db().pool, id, payload).await?;
    Ok(ResponseJson(ApiResponse::success(property)))
}

pub async fn delete_property(
    State(deployment): State<DeploymentImpl>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let Path(id) = id?;
    EntityService::delete_property(&deployment.db().pool, id).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

/// GET /api/properties/{id}/custom-fields
pub async fn get_property_custom_fields(
    State(deployment): State<DeploymentImpl>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<ResponseJson<ApiResponse<Vec<CustomFieldDisplay>>>, ApiError> {
    let Path(id) = id?;
    let pool = &deployment.db().pool;
    let property = EntityService::get_property(pool, id).await?;
    let definitions = CustomFieldDefinition::find_all(pool, Some(EntityType::Property)).await?;

    let rows = display_rows(
        &definitions,
        &property.custom_fields,
        deployment.config().display_locale,
    );
    Ok(ResponseJson(ApiResponse::success(rows)))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new()
        .route("/properties", get(list_properties).post(create_property))
        .route(
            "/properties/{id}",
            get(get_property)
                .patch(update_property)
                .delete(delete_property),
        )
        .route(
            "/properties/{id}/custom-fields",
            get(get_property_custom_fields),
        )
}
