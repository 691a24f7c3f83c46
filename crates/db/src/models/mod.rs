pub mod custom_field;
pub mod custom_field_values;
pub mod property;
pub mod tenant;
