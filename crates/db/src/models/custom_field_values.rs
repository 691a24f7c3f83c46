use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, types::Json};
use uuid::Uuid;

use super::custom_field::EntityType;

/// A single stored custom field value. Dates and select choices are strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CustomFieldValue {
    Boolean(bool),
    Number(serde_json::Number),
    Text(String),
}

impl CustomFieldValue {
    /// Scalar JSON values convert; `null`, arrays and objects do not.
    pub fn from_json(value: serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Bool(b) => Some(CustomFieldValue::Boolean(b)),
            serde_json::Value::Number(n) => Some(CustomFieldValue::Number(n)),
            serde_json::Value::String(s) => Some(CustomFieldValue::Text(s)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CustomFieldValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl std::fmt::Display for CustomFieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CustomFieldValue::Boolean(b) => write!(f, "{b}"),
            CustomFieldValue::Number(n) => write!(f, "{n}"),
            CustomFieldValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for CustomFieldValue {
    fn from(value: bool) -> Self {
        CustomFieldValue::Boolean(value)
    }
}

impl From<i64> for CustomFieldValue {
    fn from(value: i64) -> Self {
        CustomFieldValue::Number(value.into())
    }
}

impl From<&str> for CustomFieldValue {
    fn from(value: &str) -> Self {
        CustomFieldValue::Text(value.to_string())
    }
}

impl From<String> for CustomFieldValue {
    fn from(value: String) -> Self {
        CustomFieldValue::Text(value)
    }
}

/// The attribute bag stored in an entity's `custom_fields` column, keyed by `fieldId`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomFields(BTreeMap<String, CustomFieldValue>);

impl CustomFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field_id: &str) -> Option<&CustomFieldValue> {
        self.0.get(field_id)
    }

    pub fn contains_key(&self, field_id: &str) -> bool {
        self.0.contains_key(field_id)
    }

    pub fn insert(
        &mut self,
        field_id: impl Into<String>,
        value: CustomFieldValue,
    ) -> Option<CustomFieldValue> {
        self.0.insert(field_id.into(), value)
    }

    pub fn remove(&mut self, field_id: &str) -> Option<CustomFieldValue> {
        self.0.remove(field_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &CustomFieldValue)> {
        self.0.iter()
    }
}

impl FromIterator<(String, CustomFieldValue)> for CustomFields {
    fn from_iter<I: IntoIterator<Item = (String, CustomFieldValue)>>(iter: I) -> Self {
        CustomFields(iter.into_iter().collect())
    }
}

/// Just the attribute bag of one entity row, independent of its fixed columns
#[derive(Debug, Clone, FromRow)]
pub struct EntityCustomFields {
    pub id: Uuid,
    #[sqlx(json)]
    pub custom_fields: CustomFields,
}

impl EntityCustomFields {
    /// Every entity of `entity_type` with its current bag, oldest first.
    pub async fn find_all(
        pool: &SqlitePool,
        entity_type: EntityType,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, EntityCustomFields>(&format!(
            "SELECT id, custom_fields FROM {} ORDER BY created_at ASC, rowid ASC",
            entity_type.table_name()
        ))
        .fetch_all(pool)
        .await
    }

    /// Persist one entity's bag. Returns `false` if the entity no longer exists.
    pub async fn save(
        pool: &SqlitePool,
        entity_type: EntityType,
        id: Uuid,
        custom_fields: &CustomFields,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(&format!(
            r#"UPDATE {}
            SET custom_fields = $2,
                updated_at = datetime('now', 'subsec')
            WHERE id = $1"#,
            entity_type.table_name()
        ))
        .bind(id)
        .bind(Json(custom_fields))
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_values_deserialize_untagged() {
        let fields: CustomFields = serde_json::from_value(json!({
            "parking": true,
            "floor": 3,
            "warranty": "2030-01-01",
        }))
        .unwrap();

        assert_eq!(fields.get("parking"), Some(&CustomFieldValue::Boolean(true)));
        assert_eq!(fields.get("floor"), Some(&CustomFieldValue::from(3)));
        assert_eq!(
            fields.get("warranty").and_then(CustomFieldValue::as_str),
            Some("2030-01-01")
        );
    }

    #[test]
    fn test_zero_round_trips_as_integer() {
        let mut fields = CustomFields::new();
        fields.insert("floor", CustomFieldValue::from(0));
        assert_eq!(serde_json::to_value(&fields).unwrap(), json!({ "floor": 0 }));
    }

    #[test]
    fn test_from_json_rejects_non_scalars() {
        assert!(CustomFieldValue::from_json(json!(null)).is_none());
        assert!(CustomFieldValue::from_json(json!([1, 2])).is_none());
        assert!(CustomFieldValue::from_json(json!({ "a": 1 })).is_none());
        assert_eq!(
            CustomFieldValue::from_json(json!(1.5)).map(|v| v.to_string()),
            Some("1.5".to_string())
        );
    }
}
