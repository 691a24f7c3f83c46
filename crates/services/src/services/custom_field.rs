//! Registry of user-defined custom fields.

use std::str::FromStr;

use db::models::custom_field::{
    CreateCustomField, CustomFieldDefinition, EntityType, FieldType, UpdateCustomField,
    is_unique_violation,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{info, warn};
use ts_rs::TS;
use uuid::Uuid;

use super::custom_field_sync::{CustomFieldSync, SyncReport};

pub const MAX_FIELD_ID_LEN: usize = 50;
pub const MAX_HEADER_LEN: usize = 100;

#[derive(Debug, Error)]
pub enum CustomFieldError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("custom field '{0}' already exists")]
    DuplicateField(String),
    #[error("custom field not found")]
    NotFound,
    #[error("cleanup failed for {} entities; definition was not deleted", .0.failed.len())]
    PartialCleanup(SyncReport),
}

/// A created definition together with the outcome of seeding it into existing entities
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreatedCustomField {
    #[serde(flatten)]
    #[ts(flatten)]
    pub definition: CustomFieldDefinition,
    pub seeding: SyncReport,
}

pub struct CustomFieldService;

impl CustomFieldService {
    pub async fn list(
        pool: &SqlitePool,
        entity_type: Option<EntityType>,
    ) -> Result<Vec<CustomFieldDefinition>, CustomFieldError> {
        Ok(CustomFieldDefinition::find_all(pool, entity_type).await?)
    }

    /// Validate and persist a new definition, then seed its default into every
    /// existing entity of the matching type.
    ///
    /// A partially applied seeding pass does not fail creation; callers see it in
    /// the returned report.
    pub async fn create(
        pool: &SqlitePool,
        data: CreateCustomField,
    ) -> Result<CreatedCustomField, CustomFieldError> {
        let field_id = validate_field_id(&data.field_id)?;
        let header = validate_header(&data.header)?;
        let field_type = parse_field_type(&data.field_type)?;
        let entity_type = parse_entity_type(&data.entity_type)?;

        if CustomFieldDefinition::find_by_field_id(pool, field_id)
            .await?
            .is_some()
        {
            return Err(CustomFieldError::DuplicateField(field_id.to_string()));
        }

        let display_order = match data.order {
            Some(order) => order,
            None => CustomFieldDefinition::count_by_entity_type(pool, entity_type).await?,
        };

        // The unique index still decides races between concurrent creates
        let definition = CustomFieldDefinition::create(
            pool,
            Uuid::new_v4(),
            field_id,
            header,
            field_type,
            entity_type,
            display_order,
        )
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                CustomFieldError::DuplicateField(field_id.to_string())
            } else {
                CustomFieldError::Database(e)
            }
        })?;

        info!(
            custom_field_id = %definition.id,
            field_id = %definition.field_id,
            entity_type = %definition.entity_type,
            field_type = %definition.field_type,
            "Created custom field"
        );

        // Nothing was seeded if the entities could not be listed; undo the insert
        let seeding = match CustomFieldSync::seed(pool, &definition).await {
            Ok(seeding) => seeding,
            Err(e) => {
                warn!(
                    custom_field_id = %definition.id,
                    field_id = %definition.field_id,
                    error = %e,
                    "Seeding could not start, removing custom field"
                );
                CustomFieldDefinition::delete(pool, definition.id).await?;
                return Err(CustomFieldError::Database(e));
            }
        };

        Ok(CreatedCustomField {
            definition,
            seeding,
        })
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: UpdateCustomField,
    ) -> Result<CustomFieldDefinition, CustomFieldError> {
        let header = data.header.as_deref().map(validate_header).transpose()?;
        let field_type = data
            .field_type
            .as_deref()
            .map(parse_field_type)
            .transpose()?;

        let definition =
            CustomFieldDefinition::update(pool, id, header, field_type, data.order)
                .await?
                .ok_or(CustomFieldError::NotFound)?;

        info!(custom_field_id = %id, field_id = %definition.field_id, "Updated custom field");
        Ok(definition)
    }

    /// Delete a definition, first stripping its values from every matching entity
    /// when `cleanup_data` is set.
    ///
    /// If any entity could not be cleaned the definition is kept and
    /// [`CustomFieldError::PartialCleanup`] carries the report, so the delete can
    /// simply be retried.
    pub async fn delete(
        pool: &SqlitePool,
        id: Uuid,
        cleanup_data: bool,
    ) -> Result<Option<SyncReport>, CustomFieldError> {
        let definition = CustomFieldDefinition::find_by_id(pool, id)
            .await?
            .ok_or(CustomFieldError::NotFound)?;

        let cleanup = if cleanup_data {
            let report =
                CustomFieldSync::cleanup(pool, &definition.field_id, definition.entity_type)
                    .await?;
            if !report.is_complete() {
                warn!(
                    custom_field_id = %id,
                    field_id = %definition.field_id,
                    failed = report.failed.len(),
                    "Keeping custom field definition after incomplete cleanup"
                );
                return Err(CustomFieldError::PartialCleanup(report));
            }
            Some(report)
        } else {
            None
        };

        if CustomFieldDefinition::delete(pool, id).await? == 0 {
            return Err(CustomFieldError::NotFound);
        }

        info!(
            custom_field_id = %id,
            field_id = %definition.field_id,
            cleanup_data,
            "Deleted custom field"
        );
        Ok(cleanup)
    }
}

fn validate_field_id(field_id: &str) -> Result<&str, CustomFieldError> {
    let field_id = field_id.trim();
    if field_id.is_empty() {
        return Err(CustomFieldError::Validation("fieldId is required".to_string()));
    }
    if field_id.chars().count() > MAX_FIELD_ID_LEN {
        return Err(CustomFieldError::Validation(format!(
            "fieldId must be at most {MAX_FIELD_ID_LEN} characters"
        )));
    }
    Ok(field_id)
}

fn validate_header(header: &str) -> Result<&str, CustomFieldError> {
    let header = header.trim();
    if header.is_empty() {
        return Err(CustomFieldError::Validation("header is required".to_string()));
    }
    if header.chars().count() > MAX_HEADER_LEN {
        return Err(CustomFieldError::Validation(format!(
            "header must be at most {MAX_HEADER_LEN} characters"
        )));
    }
    Ok(header)
}

fn parse_field_type(value: &str) -> Result<FieldType, CustomFieldError> {
    FieldType::from_str(value).map_err(|_: strum::ParseError| {
        CustomFieldError::Validation(format!(
            "type must be one of text, number, date, select, boolean (got '{value}')"
        ))
    })
}

pub fn parse_entity_type(value: &str) -> Result<EntityType, CustomFieldError> {
    EntityType::from_str(value).map_err(|_: strum::ParseError| {
        CustomFieldError::Validation(format!(
            "entityType must be PROPERTY or TENANT (got '{value}')"
        ))
    })
}
