//! Back-fills and removes custom field values across every entity of a type.
//!
//! Both passes issue one independent write per entity. A failing entity is
//! logged and recorded in the [`SyncReport`]; the pass carries on with the rest.
//! Re-running either pass is safe: seeding never overwrites an existing key and
//! cleanup skips entities that no longer hold it.

use chrono::{SecondsFormat, Utc};
use db::models::{
    custom_field::{CustomFieldDefinition, EntityType, FieldType},
    custom_field_values::{CustomFieldValue, EntityCustomFields},
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{debug, info, warn};
use ts_rs::TS;
use uuid::Uuid;

/// Select value seeded into entities for a new `select` field.
pub const DEFAULT_SELECT_OPTION: &str = "option1";

/// Per-entity outcome of a seeding or cleanup pass
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    /// Entities whose bag was written
    pub updated: Vec<Uuid>,
    /// Entities that needed no write
    pub unchanged: Vec<Uuid>,
    pub failed: Vec<EntitySyncFailure>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct EntitySyncFailure {
    pub entity_id: Uuid,
    pub error: String,
}

impl SyncReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn total(&self) -> usize {
        self.updated.len() + self.unchanged.len() + self.failed.len()
    }
}

/// Value a freshly created field starts with, determined by its type alone.
pub fn default_value(field_type: FieldType) -> CustomFieldValue {
    match field_type {
        FieldType::Text => CustomFieldValue::Text(String::new()),
        FieldType::Number => CustomFieldValue::from(0),
        FieldType::Date => {
            CustomFieldValue::Text(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true))
        }
        FieldType::Select => CustomFieldValue::from(DEFAULT_SELECT_OPTION),
        FieldType::Boolean => CustomFieldValue::Boolean(false),
    }
}

pub struct CustomFieldSync;

impl CustomFieldSync {
    /// Give every entity of the definition's type the field's default value, unless
    /// the entity already has a value for it.
    ///
    /// Only failing to list the entities is an error; per-entity write failures are
    /// collected in the report.
    pub async fn seed(
        pool: &SqlitePool,
        definition: &CustomFieldDefinition,
    ) -> Result<SyncReport, sqlx::Error> {
        let entities = EntityCustomFields::find_all(pool, definition.entity_type).await?;
        // One timestamp for the whole pass so every entity gets the same date
        let default = default_value(definition.field_type);
        let mut report = SyncReport::default();

        for mut entity in entities {
            if entity.custom_fields.contains_key(&definition.field_id) {
                report.unchanged.push(entity.id);
                continue;
            }

            entity
                .custom_fields
                .insert(definition.field_id.clone(), default.clone());

            Self::save(
                pool,
                definition.entity_type,
                &definition.field_id,
                entity,
                &mut report,
            )
            .await;
        }

        Self::log_finished("seed", &definition.field_id, definition.entity_type, &report);
        Ok(report)
    }

    /// Remove `field_id` from every entity of `entity_type` that holds it.
    pub async fn cleanup(
        pool: &SqlitePool,
        field_id: &str,
        entity_type: EntityType,
    ) -> Result<SyncReport, sqlx::Error> {
        let entities = EntityCustomFields::find_all(pool, entity_type).await?;
        let mut report = SyncReport::default();

        for mut entity in entities {
            if entity.custom_fields.remove(field_id).is_none() {
                report.unchanged.push(entity.id);
                continue;
            }

            Self::save(pool, entity_type, field_id, entity, &mut report).await;
        }

        Self::log_finished("cleanup", field_id, entity_type, &report);
        Ok(report)
    }

    async fn save(
        pool: &SqlitePool,
        entity_type: EntityType,
        field_id: &str,
        entity: EntityCustomFields,
        report: &mut SyncReport,
    ) {
        match EntityCustomFields::save(pool, entity_type, entity.id, &entity.custom_fields).await {
            Ok(true) => report.updated.push(entity.id),
            Ok(false) => {
                debug!(
                    entity_id = %entity.id,
                    entity_type = %entity_type,
                    field_id,
                    "Entity disappeared during custom field sync"
                );
                report.unchanged.push(entity.id);
            }
            Err(e) => {
                warn!(
                    entity_id = %entity.id,
                    entity_type = %entity_type,
                    field_id,
                    error = %e,
                    "Failed to sync custom field onto entity"
                );
                report.failed.push(EntitySyncFailure {
                    entity_id: entity.id,
                    error: e.to_string(),
                });
            }
        }
    }

    fn log_finished(pass: &str, field_id: &str, entity_type: EntityType, report: &SyncReport) {
        if report.is_complete() {
            info!(
                pass,
                field_id,
                entity_type = %entity_type,
                updated = report.updated.len(),
                unchanged = report.unchanged.len(),
                "Custom field sync finished"
            );
        } else {
            warn!(
                pass,
                field_id,
                entity_type = %entity_type,
                updated = report.updated.len(),
                unchanged = report.unchanged.len(),
                failed = report.failed.len(),
                "Custom field sync only partially applied"
            );
        }
    }
}
