use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use frozono_api::{
    cache::NoopCache,
    config,
    db,
    services::{directory::DirectoryService, import::ImportService},
};
use tracing::info;

#[derive(Parser)]
#[command(
    name = "frozono-import",
    about = "Load a Store/Listed By/Date/Flavor/Season?/Quantity CSV into the inventory database",
    version
)]
struct Cli {
    /// CSV file to import; defaults to the configured import_csv_path
    #[arg(long, short)]
    file: Option<PathBuf>,

    /// Overrides the configured database_url
    #[arg(long)]
    database_url: Option<String>,

    #[arg(long, action = ArgAction::SetTrue, help = "Skip running migrations before importing")]
    skip_migrations: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut cfg = config::load_config().context("failed to load configuration")?;
    config::init_tracing(cfg.log_level(), cfg.log_json);
    if let Some(url) = cli.database_url {
        cfg.database_url = url;
    }

    let pool = db::establish_connection_from_app_config(&cfg)
        .await
        .context("failed to connect to database")?;
    if !cli.skip_migrations {
        db::run_migrations(&pool)
            .await
            .context("failed to run migrations")?;
    }

    let db = Arc::new(pool);
    let directory = DirectoryService::new(db.clone(), Arc::new(NoopCache), cfg.cache.ttl());
    let importer = ImportService::new(db, directory);

    let path = cli
        .file
        .unwrap_or_else(|| PathBuf::from(&cfg.import_csv_path));
    info!(path = %path.display(), "Starting import");

    let summary = importer
        .import_path(&path)
        .await
        .with_context(|| format!("import of {} failed", path.display()))?;

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
