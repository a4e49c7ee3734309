use std::path::Path;

use config::{Config, ConfigBuilder, Environment, File};
use serde::Deserialize;

use crate::error::MigrationError;

pub const DEFAULT_MONGODB_URI: &str = "mongodb://localhost:27017/panya";
pub const DEFAULT_DATABASE: &str = "panya";
pub const DEFAULT_APP_NAME: &str = "panya-migrate";
pub const DEFAULT_CHANNELS_COLLECTION: &str = "channels";
pub const DEFAULT_ITEMS_COLLECTION: &str = "items";
pub const DEFAULT_EXCLUDED_SOURCE_TYPE: &str = "rss_feed";

/// Prefix of the environment variables read by [`Settings::load`],
/// e.g. `PANYA_MIGRATE_MONGODB_URI`.
pub const ENV_PREFIX: &str = "PANYA_MIGRATE";

/// Connection and collection settings shared by every migration.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Settings {
    /// MongoDB connection string.
    pub mongodb_uri: String,
    /// Database holding the channel and item collections. When unset, the
    /// database named in `mongodb_uri` is used, then [`DEFAULT_DATABASE`].
    #[serde(default)]
    pub database: Option<String>,
    /// Application name reported to the server on connect.
    pub app_name: String,
    pub channels_collection: String,
    pub items_collection: String,
    /// Channels of this `source_type` keep their items' `create_date` as is.
    pub excluded_source_type: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mongodb_uri: DEFAULT_MONGODB_URI.to_string(),
            database: None,
            app_name: DEFAULT_APP_NAME.to_string(),
            channels_collection: DEFAULT_CHANNELS_COLLECTION.to_string(),
            items_collection: DEFAULT_ITEMS_COLLECTION.to_string(),
            excluded_source_type: DEFAULT_EXCLUDED_SOURCE_TYPE.to_string(),
        }
    }
}

/// Values given on the command line. They win over every other source.
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub mongodb_uri: Option<String>,
    pub database: Option<String>,
}

impl Settings {
    /// Load settings from, in increasing priority: built-in defaults, the
    /// optional config file, `PANYA_MIGRATE_*` environment variables and
    /// the command line overrides.
    pub fn load(
        config_file: Option<&Path>,
        overrides: &SettingsOverrides,
    ) -> Result<Self, MigrationError> {
        let mut builder = Self::defaults()?;

        if let Some(path) = config_file {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .set_override_option("mongodb_uri", overrides.mongodb_uri.clone())?
            .set_override_option("database", overrides.database.clone())?;

        Self::build(builder)
    }

    fn defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, MigrationError> {
        let defaults = Settings::default();
        Ok(Config::builder()
            .set_default("mongodb_uri", defaults.mongodb_uri)?
            .set_default("app_name", defaults.app_name)?
            .set_default("channels_collection", defaults.channels_collection)?
            .set_default("items_collection", defaults.items_collection)?
            .set_default("excluded_source_type", defaults.excluded_source_type)?)
    }

    fn build(builder: ConfigBuilder<config::builder::DefaultState>) -> Result<Self, MigrationError> {
        let settings: Settings = builder.build()?.try_deserialize()?;
        if matches!(&settings.database, Some(name) if name.trim().is_empty()) {
            return Err(MigrationError::Config("database name must not be empty".into()));
        }
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn from_toml(toml: &str, overrides: &SettingsOverrides) -> Result<Settings, MigrationError> {
        let builder = Settings::defaults()?
            .add_source(File::from_str(toml, FileFormat::Toml))
            .set_override_option("mongodb_uri", overrides.mongodb_uri.clone())?
            .set_override_option("database", overrides.database.clone())?;
        Settings::build(builder)
    }

    #[test]
    fn test_defaults_point_at_local_panya() {
        let settings = from_toml("", &SettingsOverrides::default()).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.mongodb_uri, "mongodb://localhost:27017/panya");
        assert_eq!(settings.database, None);
        assert_eq!(settings.excluded_source_type, "rss_feed");
    }

    #[test]
    fn test_file_values_replace_defaults() {
        let toml = r#"
            mongodb_uri = "mongodb://db.internal:27018"
            items_collection = "items_v2"
        "#;
        let settings = from_toml(toml, &SettingsOverrides::default()).unwrap();
        assert_eq!(settings.mongodb_uri, "mongodb://db.internal:27018");
        assert_eq!(settings.items_collection, "items_v2");
        assert_eq!(settings.channels_collection, "channels");
    }

    #[test]
    fn test_overrides_win_over_file() {
        let toml = r#"
            mongodb_uri = "mongodb://db.internal:27018"
            database = "from_file"
        "#;
        let overrides = SettingsOverrides {
            mongodb_uri: Some("mongodb://127.0.0.1:27017".to_string()),
            database: None,
        };
        let settings = from_toml(toml, &overrides).unwrap();
        assert_eq!(settings.mongodb_uri, "mongodb://127.0.0.1:27017");
        assert_eq!(settings.database.as_deref(), Some("from_file"));
    }

    #[test]
    fn test_empty_database_is_rejected() {
        let err = from_toml("database = \"  \"", &SettingsOverrides::default()).unwrap_err();
        assert!(matches!(err, MigrationError::Config(_)));
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let err = Settings::load(
            Some(Path::new("/nonexistent/panya-migrate.toml")),
            &SettingsOverrides::default(),
        )
        .unwrap_err();
        assert!(matches!(err, MigrationError::Config(_)));
    }
}
