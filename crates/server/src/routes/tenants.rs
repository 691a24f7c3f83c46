use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::Json as ResponseJson,
    routing::get,
};
use db::models::{
    custom_field::{CustomFieldDefinition, EntityType},
    tenant::{CreateTenant, Tenant, UpdateTenant},
};
use deployment::Deployment;
use serde::Deserialize;
use services::services::{
    custom_field_display::{CustomFieldDisplay, display_rows},
    entity::EntityService,
};
use uuid::Uuid;
use utils::response::ApiResponse;

use crate::{DeploymentImpl, error::ApiError};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantQuery {
    pub property_id: Option<Uuid>,
}

/// GET /api/tenants?propertyId=...
pub async fn list_tenants(
    State(deployment): State<DeploymentImpl>,
    query: Result<Query<TenantQuery>, QueryRejection>,
) -> Result<ResponseJson<ApiResponse<Vec<Tenant>>>, ApiError> {
    let Query(query) = query?;
    let tenants = EntityService::list_tenants(&deployment.db().pool, query.property_id).await?;
    Ok(ResponseJson(ApiResponse::success(tenants)))
}

pub async fn get_tenant(
    State(deployment): State<DeploymentImpl>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<ResponseJson<ApiResponse<Tenant>>, ApiError> {
    let Path(id) = id?;
    let tenant = EntityService::get_tenant(&deployment.db().pool, id).await?;
    Ok(ResponseJson(ApiResponse::success(tenant)))
}

pub async fn create_tenant(
    State(deployment): State<DeploymentImpl>,
    payload: Result<Json<CreateTenant>, JsonRejection>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<Tenant>>), ApiError> {
    let Json(payload) = payload?;
    let tenant = EntityService::create_tenant(&deployment.db().pool, payload).await?;
    Ok((StatusCode::CREATED, ResponseJson(ApiResponse::success(tenant))))
}

pub async fn update_tenant(
    State(deployment): State<DeploymentImpl>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdateTenant>, JsonRejection>,
) -> Result<ResponseJson<ApiResponse<Tenant>>, ApiError> {
    let Path(id) = id?;
    let Json(payload) = payload?;
    let tenant = EntityService::update_tenant(&deployment.db().pool, id, payload).await?;
    Ok(ResponseJson(ApiResponse::success(tenant)))
}

pub async fn delete_tenant(
    State(deployment): State<DeploymentImpl>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let Path(id) = id?;
    EntityService::delete_tenant(&deployment.db().pool, id).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub async fn get_tenant_custom_fields(
    State(deployment): State<DeploymentImpl>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<ResponseJson<ApiResponse<Vec<CustomFieldDisplay>>>, ApiError> {
    let Path(id) = id?;
    let pool = &deployment.db().pool;
    let tenant = EntityService::get_tenant(pool, id).await?;
    let definitions = CustomFieldDefinition::find_all(pool, Some(EntityType::Tenant)).await?;

    let rows = display_rows(
        &definitions,
        &tenant.custom_fields,
        deployment.config().display_locale,
    );
    Ok(ResponseJson(ApiResponse::success(rows)))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new()
        .route("/tenants", get(list_tenants).post(create_tenant))
        .route(
            "/tenants/{id}",
            get(get_tenant).patch(update_tenant).delete(delete_tenant),
        )
        .route("/tenants/{id}/custom-fields", get(get_tenant_custom_fields))
}
