use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

/// Kind of value a custom field holds; decides the seeded default and how it is rendered
#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, Hash, TS, EnumString, Display,
)]
#[sqlx(type_name = "field_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FieldType {
    Text,
    Number,
    Date,
    Select,
    Boolean,
}

/// Entity collection a custom field is attached to
#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, Hash, TS, EnumString, Display,
)]
#[sqlx(type_name = "entity_type", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum EntityType {
    Property,
    Tenant,
}

impl EntityType {
    /// Table holding the entities of this type. Only ever interpolated from this fixed set.
    pub fn table_name(&self) -> &'static str {
        match self {
            EntityType::Property => "properties",
            EntityType::Tenant => "tenants",
        }
    }
}

/// A user-defined attribute applied to every entity of one type
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct CustomFieldDefinition {
    pub id: Uuid,
    pub field_id: String,
    pub header: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub entity_type: EntityType,
    #[serde(rename = "order")]
    #[ts(type = "number")]
    pub display_order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for creating a custom field.
///
/// Kinds arrive as plain strings so unknown values surface as validation errors
/// rather than body rejections.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateCustomField {
    pub field_id: String,
    pub header: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub entity_type: String,
    #[ts(type = "number | null")]
    pub order: Option<i64>,
}

/// Request body for updating a custom field. `fieldId` and `entityType` are fixed at creation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCustomField {
    pub header: Option<String>,
    #[serde(rename = "type")]
    pub field_type: Option<String>,
    #[ts(type = "number | null")]
    pub order: Option<i64>,
}

const SELECT_COLUMNS: &str = r#"
    id,
    field_id,
    header,
    field_type,
    entity_type,
    display_order,
    created_at,
    updated_at
"#;

impl CustomFieldDefinition {
    pub async fn find_all(
        pool: &SqlitePool,
        entity_type: Option<EntityType>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        match entity_type {
            Some(entity_type) => {
                sqlx::query_as::<_, CustomFieldDefinition>(&format!(
                    r#"SELECT {SELECT_COLUMNS}
                    FROM custom_field_definitions
                    WHERE entity_type = $1
                    ORDER BY entity_type ASC, display_order ASC, created_at ASC"#
                ))
                .bind(entity_type)
                .fetch_all(pool)
                .await
            }
            None => {
                sqlx::query_as::<_, CustomFieldDefinition>(&format!(
                    r#"SELECT {SELECT_COLUMNS}
                    FROM custom_field_definitions
                    ORDER BY entity_type ASC, display_order ASC, created_at ASC"#
                ))
                .fetch_all(pool)
                .await
            }
        }
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, CustomFieldDefinition>(&format!(
            r#"SELECT {SELECT_COLUMNS}
            FROM custom_field_definitions
            WHERE id = $1"#
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_field_id(
        pool: &SqlitePool,
        field_id: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, CustomFieldDefinition>(&format!(
            r#"SELECT {SELECT_COLUMNS}
            FROM custom_field_definitions
            WHERE field_id = $1"#
        ))
        .bind(field_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn count_by_entity_type(
        pool: &SqlitePool,
        entity_type: EntityType,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM custom_field_definitions WHERE entity_type = $1",
        )
        .bind(entity_type)
        .fetch_one(pool)
        .await
    }

    /// Insert a definition. A `field_id` collision fails with a unique-constraint
    /// database error (see [`is_unique_violation`]).
    pub async fn create(
        pool: &SqlitePool,
        id: Uuid,
        field_id: &str,
        header: &str,
        field_type: FieldType,
        entity_type: EntityType,
        display_order: i64,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, CustomFieldDefinition>(&format!(
            r#"INSERT INTO custom_field_definitions
                (id, field_id, header, field_type, entity_type, display_order)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {SELECT_COLUMNS}"#
        ))
        .bind(id)
        .bind(field_id)
        .bind(header)
        .bind(field_type)
        .bind(entity_type)
        .bind(display_order)
        .fetch_one(pool)
        .await
    }

    /// Partial update; `None` keeps the stored value. Returns `None` when `id` is unknown.
    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        header: Option<&str>,
        field_type: Option<FieldType>,
        display_order: Option<i64>,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, CustomFieldDefinition>(&format!(
            r#"UPDATE custom_field_definitions
            SET header = COALESCE($2, header),
                field_type = COALESCE($3, field_type),
                display_order = COALESCE($4, display_order),
                updated_at = datetime('now', 'subsec')
            WHERE id = $1
            RETURNING {SELECT_COLUMNS}"#
        ))
        .bind(id)
        .bind(header)
        .bind(field_type)
        .bind(display_order)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM custom_field_definitions WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}

/// True when `err` is the storage layer rejecting a duplicate `field_id`.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}
