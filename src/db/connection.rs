use mongodb::options::ClientOptions;
use mongodb::{Client, Database};

use crate::config::{Settings, DEFAULT_DATABASE};
use crate::error::MigrationError;

/// Open the database named in `settings`, falling back to the one named in
/// the connection string.
///
/// The driver connects lazily, so a ping is issued to fail fast on an
/// unreachable server before any migration starts.
pub async fn connect(settings: &Settings) -> Result<Database, MigrationError> {
    use mongodb::bson::doc;

    let mut options = ClientOptions::parse(&settings.mongodb_uri)
        .await
        .map_err(|e| MigrationError::Config(format!("invalid MongoDB URI: {e}")))?;
    options.app_name = Some(settings.app_name.clone());
    let database = database_name(
        settings.database.as_deref(),
        options.default_database.as_deref(),
    );

    let client = Client::with_options(options)
        .map_err(|e| MigrationError::Database(e.to_string()))?;
    let db = client.database(&database);

    db.run_command(doc! { "ping": 1 })
        .await
        .map_err(|e| MigrationError::Database(e.to_string()))?;

    tracing::info!(
        "Connected to MongoDB at {} (database `{}`)",
        redact_uri(&settings.mongodb_uri),
        database
    );

    Ok(db)
}

/// Pick the database to migrate: an explicit setting wins over the one in
/// the connection string, which wins over [`DEFAULT_DATABASE`].
pub fn database_name(explicit: Option<&str>, uri_default: Option<&str>) -> String {
    explicit
        .or(uri_default)
        .unwrap_or(DEFAULT_DATABASE)
        .to_string()
}

/// Strip the password from a connection string before it is logged.
///
/// Strings that do not parse as URLs are replaced entirely.
pub fn redact_uri(uri: &str) -> String {
    match url::Url::parse(uri) {
        Ok(mut parsed) => {
            if parsed.password().is_some() {
                let _ = parsed.set_password(Some("***"));
            }
            parsed.to_string()
        }
        Err(_) => "<unparseable uri>".to_string(),
    }
}
