use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, Type, types::Json};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

use super::custom_field_values::CustomFields;

#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "property_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PropertyStatus {
    #[default]
    Available,
    Occupied,
    Maintenance,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    #[ts(type = "number")]
    pub rooms: i64,
    pub size_sqm: Option<f64>,
    pub monthly_rent: Option<f64>,
    pub status: PropertyStatus,
    #[sqlx(json)]
    #[ts(type = "Record<string, string | number | boolean>")]
    pub custom_fields: CustomFields,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct CreateProperty {
    pub name: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    #[ts(type = "number | null")]
    pub rooms: Option<i64>,
    pub size_sqm: Option<f64>,
    pub monthly_rent: Option<f64>,
    pub status: Option<PropertyStatus>,
}

/// PATCH body for a property.
///
/// Any top-level key that is not a fixed column lands in `extra` and is merged into
/// the attribute bag, as is everything under `customFields`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProperty {
    pub name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    #[ts(type = "number | null")]
    pub rooms: Option<i64>,
    pub size_sqm: Option<f64>,
    pub monthly_rent: Option<f64>,
    pub status: Option<PropertyStatus>,
    #[ts(type = "Record<string, unknown> | null")]
    pub custom_fields: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(flatten)]
    #[ts(skip)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

const SELECT_COLUMNS: &str = r#"
    id,
    name,
    address,
    city,
    postal_code,
    rooms,
    size_sqm,
    monthly_rent,
    status,
    custom_fields,
    created_at,
    updated_at
"#;

impl Property {
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Property>(&format!(
            r#"SELECT {SELECT_COLUMNS}
            FROM properties
            ORDER BY created_at DESC, rowid DESC"#
        ))
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Property>(&format!(
            r#"SELECT {SELECT_COLUMNS}
            FROM properties
            WHERE id = $1"#
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn create(
        pool: &SqlitePool,
        data: &CreateProperty,
        id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        let rooms = data.rooms.unwrap_or(0);
        let status = data.status.unwrap_or_default();
        sqlx::query_as::<_, Property>(&format!(
            r#"INSERT INTO properties
                (id, name, address, city, postal_code, rooms, size_sqm, monthly_rent, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {SELECT_COLUMNS}"#
        ))
        .bind(id)
        .bind(&data.name)
        .bind(&data.address)
        .bind(&data.city)
        .bind(&data.postal_code)
        .bind(rooms)
        .bind(data.size_sqm)
        .bind(data.monthly_rent)
        .bind(status)
        .fetch_one(pool)
        .await
    }

    /// Write every mutable column of `self`, bag included, as a single-row update.
    pub async fn update(&self, pool: &SqlitePool) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Property>(&format!(
            r#"UPDATE properties
            SET name = $2,
                address = $3,
                city = $4,
                postal_code = $5,
                rooms = $6,
                size_sqm = $7,
                monthly_rent = $8,
                status = $9,
                custom_fields = $10,
                updated_at = datetime('now', 'subsec')
            WHERE id = $1
            RETURNING {SELECT_COLUMNS}"#
        ))
        .bind(self.id)
        .bind(&self.name)
        .bind(&self.address)
        .bind(&self.city)
        .bind(&self.postal_code)
        .bind(self.rooms)
        .bind(self.size_sqm)
        .bind(self.monthly_rent)
        .bind(self.status)
        .bind(Json(&self.custom_fields))
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM properties WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
