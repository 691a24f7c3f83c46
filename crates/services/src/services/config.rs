use std::str::FromStr;

use thiserror::Error;

use super::custom_field_display::DisplayLocale;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3001;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },
}

/// Runtime configuration, read from the environment
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// SQLite URL; `None` uses `db.sqlite` in the asset directory
    pub database_url: Option<String>,
    /// Locale used when rendering custom field values
    pub display_locale: DisplayLocale,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            database_url: None,
            display_locale: DisplayLocale::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Config::default();

        let port = match get("PORT") {
            Some(value) => value
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidValue { key: "PORT", value })?,
            None => defaults.port,
        };

        let display_locale = match get("DISPLAY_LOCALE") {
            Some(value) => DisplayLocale::from_str(value.trim()).map_err(|_| {
                ConfigError::InvalidValue {
                    key: "DISPLAY_LOCALE",
                    value,
                }
            })?,
            None => defaults.display_locale,
        };

        Ok(Config {
            host: get("HOST").unwrap_or(defaults.host),
            port,
            database_url: get("DATABASE_URL"),
            display_locale,
        })
    }
}
