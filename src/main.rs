use std::path::PathBuf;

use clap::{Parser, Subcommand};

use panya_migrations::config::{Settings, SettingsOverrides};
use panya_migrations::db::connection::connect;
use panya_migrations::db::repository::{MongoChannelRepository, MongoItemRepository};
use panya_migrations::migrations::{self, MigrationId};

/// One-shot data migrations for the panya store.
#[derive(Parser)]
#[command(name = "panya-migrate", version, about)]
struct Cli {
    /// TOML file with connection settings.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// MongoDB connection string (overrides config and environment).
    #[arg(long, global = true)]
    mongodb_uri: Option<String>,

    /// Database name (overrides config and environment).
    #[arg(long, global = true)]
    database: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Derive each channel's `url` from its `name`.
    AddUrl,
    /// Strip scheme, trailing slashes and `www` labels from channel names.
    NormalizeNames,
    /// Convert second-scale item `create_date` values to milliseconds.
    UpgradeCreateDates,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "panya_migrations=info,panya_migrate=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let overrides = SettingsOverrides {
        mongodb_uri: cli.mongodb_uri,
        database: cli.database,
    };
    let settings = Settings::load(cli.config.as_deref(), &overrides)?;
    let db = connect(&settings).await?;
    let channels = MongoChannelRepository::new(&db, &settings.channels_collection);

    match cli.command {
        Command::AddUrl => {
            migrations::add_url::run(&channels).await?;
            completed(MigrationId::ChannelsAddUrl);
        }
        Command::NormalizeNames => {
            migrations::normalize_name::run(&channels).await?;
        }
        Command::UpgradeCreateDates => {
            let items = MongoItemRepository::new(&db, &settings.items_collection);
            let now_millis = chrono::Utc::now().timestamp_millis();
            let report = migrations::create_date::run(
                &channels,
                &items,
                &settings.excluded_source_type,
                now_millis,
            )
            .await?;

            println!("{}", report.modified_line());
            completed(MigrationId::ItemsEditCreateDate);
        }
    }

    Ok(())
}

fn completed(migration: MigrationId) {
    println!("{}", migrations::completion_line(migration));
}
