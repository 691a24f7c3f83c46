//! Property and tenant CRUD, including merging dynamic keys into the attribute bag.

use db::models::{
    custom_field_values::{CustomFieldValue, CustomFields},
    property::{CreateProperty, Property, UpdateProperty},
    tenant::{CreateTenant, Tenant, UpdateTenant},
};
use serde_json::{Map, Value};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum EntityError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("{0} not found")]
    NotFound(&'static str),
}

/// Pending changes to an attribute bag: `None` removes the key.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CustomFieldPatch {
    changes: Vec<(String, Option<CustomFieldValue>)>,
}

/// Response keys the server owns; a PATCH echoing them back leaves them alone.
const READ_ONLY_KEYS: [&str; 3] = ["id", "createdAt", "updatedAt"];

const PROPERTY_COLUMNS: &[&str] = &[
    "id",
    "name",
    "address",
    "city",
    "postal_code",
    "rooms",
    "size_sqm",
    "monthly_rent",
    "status",
    "custom_fields",
    "created_at",
    "updated_at",
];

const TENANT_COLUMNS: &[&str] = &[
    "id",
    "first_name",
    "last_name",
    "email",
    "phone",
    "property_id",
    "lease_start",
    "lease_end",
    "status",
    "custom_fields",
    "created_at",
    "updated_at",
];

impl CustomFieldPatch {
    /// Combine an explicit `customFields` object with the stray top-level keys of a
    /// PATCH body. Both are merged key by key; top-level keys win on conflict.
    ///
    /// Stray keys that are read-only response keys are dropped. Stray keys spelling
    /// one of `fixed_columns` in snake_case are rejected rather than stored.
    pub fn from_body(
        custom_fields: Option<Map<String, Value>>,
        extra: Map<String, Value>,
        fixed_columns: &[&str],
    ) -> Result<Self, EntityError> {
        let mut stray = Map::new();
        for (key, value) in extra {
            if READ_ONLY_KEYS.contains(&key.as_str()) {
                continue;
            }
            if fixed_columns.contains(&key.as_str()) {
                return Err(EntityError::Validation(format!(
                    "'{key}' is a fixed field; send it as '{}'",
                    camel_case(&key)
                )));
            }
            stray.insert(key, value);
        }

        let mut changes = Vec::new();
        for (key, value) in custom_fields.into_iter().flatten().chain(stray) {
            let change = match value {
                Value::Null => None,
                other => Some(CustomFieldValue::from_json(other).ok_or_else(|| {
                    EntityError::Validation(format!(
                        "custom field '{key}' must be a string, number or boolean"
                    ))
                })?),
            };
            changes.push((key, change));
        }
        Ok(CustomFieldPatch { changes })
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn apply(self, bag: &mut CustomFields) {
        for (key, change) in self.changes {
            match change {
                Some(value) => {
                    bag.insert(key, value);
                }
                None => {
                    bag.remove(&key);
                }
            }
        }
    }
}

fn camel_case(snake: &str) -> String {
    let mut parts = snake.split('_');
    let mut out = parts.next().unwrap_or_default().to_string();
    for part in parts {
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}

fn require_non_empty(field: &str, value: &str) -> Result<(), EntityError> {
    if value.trim().is_empty() {
        return Err(EntityError::Validation(format!("{field} is required")));
    }
    Ok(())
}

pub struct EntityService;

impl EntityService {
    pub async fn list_properties(pool: &SqlitePool) -> Result<Vec<Property>, EntityError> {
        Ok(Property::find_all(pool).await?)
    }

    pub async fn get_property(pool: &SqlitePool, id: Uuid) -> Result<Property, EntityError> {
        Property::find_by_id(pool, id)
            .await?
            .ok_or(EntityError::NotFound("property"))
    }

    pub async fn create_property(
        pool: &SqlitePool,
        data: CreateProperty,
    ) -> Result<Property, EntityError> {
        require_non_empty("name", &data.name)?;
        let property = Property::create(pool, &data, Uuid::new_v4()).await?;
        info!(property_id = %property.id, "Created property");
        Ok(property)
    }

    pub async fn update_property(
        pool: &SqlitePool,
        id: Uuid,
        data: UpdateProperty,
    ) -> Result<Property, EntityError> {
        let patch =
            CustomFieldPatch::from_body(data.custom_fields, data.extra, PROPERTY_COLUMNS)?;
        let mut property = Self::get_property(pool, id).await?;

        if let Some(name) = data.name {
            require_non_empty("name", &name)?;
            property.name = name;
        }
        property.address = data.address.or(property.address);
        property.city = data.city.or(property.city);
        property.postal_code = data.postal_code.or(property.postal_code);
        property.rooms = data.rooms.unwrap_or(property.rooms);
        property.size_sqm = data.size_sqm.or(property.size_sqm);
        property.monthly_rent = data.monthly_rent.or(property.monthly_rent);
        property.status = data.status.unwrap_or(property.status);
        patch.apply(&mut property.custom_fields);

        property
            .update(pool)
            .await?
            .ok_or(EntityError::NotFound("property"))
    }

    pub async fn delete_property(pool: &SqlitePool, id: Uuid) -> Result<(), EntityError> {
        if Property::delete(pool, id).await? == 0 {
            return Err(EntityError::NotFound("property"));
        }
        info!(property_id = %id, "Deleted property");
        Ok(())
    }

    pub async fn list_tenants(
        pool: &SqlitePool,
        property_id: Option<Uuid>,
    ) -> Result<Vec<Tenant>, EntityError> {
        let tenants = match property_id {
            Some(property_id) => Tenant::find_by_property_id(pool, property_id).await?,
            None => Tenant::find_all(pool).await?,
        };
        Ok(tenants)
    }

    pub async fn get_tenant(pool: &SqlitePool, id: Uuid) -> Result<Tenant, EntityError> {
        Tenant::find_by_id(pool, id)
            .await?
            .ok_or(EntityError::NotFound("tenant"))
    }

    pub async fn create_tenant(
        pool: &SqlitePool,
        data: CreateTenant,
    ) -> Result<Tenant, EntityError> {
        require_non_empty("firstName", &data.first_name)?;
        require_non_empty("lastName", &data.last_name)?;
        Self::validate_tenancy(pool, data.property_id, data.lease_start, data.lease_end).await?;

        let tenant = Tenant::create(pool, &data, Uuid::new_v4()).await?;
        info!(
            tenant_id = %tenant.id,
            tenant_name = %tenant.full_name(),
            property_id = ?tenant.property_id,
            "Created tenant"
        );
        Ok(tenant)
    }

    pub async fn update_tenant(
        pool: &SqlitePool,
        id: Uuid,
        data: UpdateTenant,
    ) -> Result<Tenant, EntityError> {
        let patch = CustomFieldPatch::from_body(data.custom_fields, data.extra, TENANT_COLUMNS)?;
        let mut tenant = Self::get_tenant(pool, id).await?;

        if let Some(first_name) = data.first_name {
            require_non_empty("firstName", &first_name)?;
            tenant.first_name = first_name;
        }
        if let Some(last_name) = data.last_name {
            require_non_empty("lastName", &last_name)?;
            tenant.last_name = last_name;
        }
        tenant.email = data.email.or(tenant.email);
        tenant.phone = data.phone.or(tenant.phone);
        tenant.property_id = data.property_id.or(tenant.property_id);
        tenant.lease_start = data.lease_start.or(tenant.lease_start);
        tenant.lease_end = data.lease_end.or(tenant.lease_end);
        tenant.status = data.status.unwrap_or(tenant.status);
        Self::validate_tenancy(pool, data.property_id, tenant.lease_start, tenant.lease_end)
            .await?;
        patch.apply(&mut tenant.custom_fields);

        tenant
            .update(pool)
            .await?
            .ok_or(EntityError::NotFound("tenant"))
    }

    pub async fn delete_tenant(pool: &SqlitePool, id: Uuid) -> Result<(), EntityError> {
        if Tenant::delete(pool, id).await? == 0 {
            return Err(EntityError::NotFound("tenant"));
        }
        info!(tenant_id = %id, "Deleted tenant");
        Ok(())
    }

    async fn validate_tenancy(
        pool: &SqlitePool,
        property_id: Option<Uuid>,
        lease_start: Option<chrono::NaiveDate>,
        lease_end: Option<chrono::NaiveDate>,
    ) -> Result<(), EntityError> {
        if let (Some(start), Some(end)) = (lease_start, lease_end) {
            if end < start {
                return Err(EntityError::Validation(
                    "leaseEnd must not be before leaseStart".to_string(),
                ));
            }
        }
        if let Some(property_id) = property_id {
            if Property::find_by_id(pool, property_id).await?.is_none() {
                return Err(EntityError::Validation(format!(
                    "property {property_id} does not exist"
                )));
            }
        }
        Ok(())
    }
}
