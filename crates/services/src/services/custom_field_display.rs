//! Read-only rendering of stored custom field values.

use chrono::{DateTime, NaiveDate};
use db::models::{
    custom_field::{CustomFieldDefinition, FieldType},
    custom_field_values::{CustomFieldValue, CustomFields},
};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use ts_rs::TS;

/// Shown for values that are missing or cannot be rendered.
pub const PLACEHOLDER: &str = "—";

const SELECT_OPTIONS: [(&str, &str); 3] = [
    ("option1", "Option 1"),
    ("option2", "Option 2"),
    ("option3", "Option 3"),
];

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display, Default,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DisplayLocale {
    #[default]
    En,
    De,
}

impl DisplayLocale {
    fn date_format(&self) -> &'static str {
        match self {
            DisplayLocale::En => "%m/%d/%Y",
            DisplayLocale::De => "%d.%m.%Y",
        }
    }

    fn yes_no(&self, value: bool) -> &'static str {
        match (self, value) {
            (DisplayLocale::En, true) => "Yes",
            (DisplayLocale::En, false) => "No",
            (DisplayLocale::De, true) => "Ja",
            (DisplayLocale::De, false) => "Nein",
        }
    }
}

/// One custom field of an entity, ready to show
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct CustomFieldDisplay {
    pub field_id: String,
    pub header: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[ts(type = "string | number | boolean | null")]
    pub value: Option<CustomFieldValue>,
    pub display: String,
}

/// Render `value` according to `field_type`. Never fails: anything unrenderable
/// becomes [`PLACEHOLDER`] or its raw string form.
pub fn render(
    value: Option<&CustomFieldValue>,
    field_type: FieldType,
    locale: DisplayLocale,
) -> String {
    let Some(value) = value else {
        return PLACEHOLDER.to_string();
    };

    match field_type {
        FieldType::Text | FieldType::Number => value.to_string(),
        FieldType::Date => value
            .as_str()
            .and_then(parse_date)
            .map(|date| date.format(locale.date_format()).to_string())
            .unwrap_or_else(|| PLACEHOLDER.to_string()),
        FieldType::Select => {
            let raw = value.to_string();
            SELECT_OPTIONS
                .iter()
                .find(|(option, _)| *option == raw)
                .map(|(_, label)| label.to_string())
                .unwrap_or(raw)
        }
        FieldType::Boolean => match value {
            CustomFieldValue::Boolean(b) => locale.yes_no(*b).to_string(),
            CustomFieldValue::Text(s) if s == "true" => locale.yes_no(true).to_string(),
            CustomFieldValue::Text(s) if s == "false" => locale.yes_no(false).to_string(),
            other => other.to_string(),
        },
    }
}

/// Accepts full RFC 3339 timestamps (as seeded) and plain `YYYY-MM-DD` dates.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.date_naive())
        .ok()
        .or_else(|| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok())
}

/// Display rows for every definition, in the given (registry) order. Keys in the
/// bag without a definition are ignored.
pub fn display_rows(
    definitions: &[CustomFieldDefinition],
    custom_fields: &CustomFields,
    locale: DisplayLocale,
) -> Vec<CustomFieldDisplay> {
    definitions
        .iter()
        .map(|definition| {
            let value = custom_fields.get(&definition.field_id);
            CustomFieldDisplay {
                field_id: definition.field_id.clone(),
                header: definition.header.clone(),
                field_type: definition.field_type,
                value: value.cloned(),
                display: render(value, definition.field_type, locale),
            }
        })
        .collect()
}
