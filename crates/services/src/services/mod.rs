pub mod config;
pub mod custom_field;
pub mod custom_field_display;
pub mod custom_field_sync;
pub mod database_validator;
pub mod entity;
