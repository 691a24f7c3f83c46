use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, Type, types::Json};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

use super::custom_field_values::CustomFields;

#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "tenant_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TenantStatus {
    Active,
    #[default]
    Pending,
    Former,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub property_id: Option<Uuid>, // Foreign key to Property, cleared when the property is deleted
    pub lease_start: Option<NaiveDate>,
    pub lease_end: Option<NaiveDate>,
    pub status: TenantStatus,
    #[sqlx(json)]
    #[ts(type = "Record<string, string | number | boolean>")]
    pub custom_fields: CustomFields,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct CreateTenant {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub property_id: Option<Uuid>,
    pub lease_start: Option<NaiveDate>,
    pub lease_end: Option<NaiveDate>,
    pub status: Option<TenantStatus>,
}

/// PATCH body for a tenant; unknown keys are custom field values, as for properties.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTenant {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub property_id: Option<Uuid>,
    pub lease_start: Option<NaiveDate>,
    pub lease_end: Option<NaiveDate>,
    pub status: Option<TenantStatus>,
    #[ts(type = "Record<string, unknown> | null")]
    pub custom_fields: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(flatten)]
    #[ts(skip)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Tenant {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

const SELECT_COLUMNS: &str = r#"
    id,
    first_name,
    last_name,
    email,
    phone,
    property_id,
    lease_start,
    lease_end,
    status,
    custom_fields,
    created_at,
    updated_at
"#;

impl Tenant {
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Tenant>(&format!(
            r#"SELECT {SELECT_COLUMNS}
            FROM tenants
            ORDER BY created_at DESC, rowid DESC"#
        ))
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_property_id(
        pool: &SqlitePool,
        property_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Tenant>(&format!(
            r#"SELECT {SELECT_COLUMNS}
            FROM tenants
            WHERE property_id = $1
            ORDER BY created_at DESC, rowid DESC"#
        ))
        .bind(property_id)
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Tenant>(&format!(
            r#"SELECT {SELECT_COLUMNS}
            FROM tenants
            WHERE id = $1"#
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn create(
        pool: &SqlitePool,
        data: &CreateTenant,
        id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        let status = data.status.unwrap_or_default();
        sqlx::query_as::<_, Tenant>(&format!(
            r#"INSERT INTO tenants
                (id, first_name, last_name, email, phone, property_id, lease_start, lease_end, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {SELECT_COLUMNS}"#
        ))
        .bind(id)
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(&data.email)
        .bind(&data.phone)
        .bind(data.property_id)
        .bind(data.lease_start)
        .bind(data.lease_end)
        .bind(status)
        .fetch_one(pool)
        .await
    }

    /// Write every mutable column of `self`, bag included, as a single-row update.
    pub async fn update(&self, pool: &SqlitePool) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Tenant>(&format!(
            r#"UPDATE tenants
            SET first_name = $2,
                last_name = $3,
                email = $4,
                phone = $5,
                property_id = $6,
                lease_start = $7,
                lease_end = $8,
                status = $9,
                custom_fields = $10,
                updated_at = datetime('now', 'subsec')
            WHERE id = $1
            RETURNING {SELECT_COLUMNS}"#
        ))
        .bind(self.id)
        .bind(&self.first_name)
        .bind(&self.last_name)
        .bind(&self.email)
        .bind(&self.phone)
        .bind(self.property_id)
        .bind(self.lease_start)
        .bind(self.lease_end)
        .bind(self.status)
        .bind(Json(&self.custom_fields))
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tenants WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
