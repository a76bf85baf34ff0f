use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use migrations::{Migrator, MigratorTrait};
use shopfloor::{config, db};
use tracing::info;

#[derive(Parser)]
#[command(name = "migration", about = "Apply or inspect shopfloor schema migrations")]
struct Cli {
    #[command(subcommand)]
    command: Option<MigrationCommand>,
}

#[derive(Subcommand)]
enum MigrationCommand {
    /// Apply all pending migrations (default)
    Up,
    /// Roll back the most recent migration
    Down,
    /// List applied and pending migrations
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::load_config().context("failed to load application config")?;
    config::init_tracing(config.log_level(), config.log_json);

    info!("Starting database migration");
    let pool = db::establish_connection_from_app_config(&config)
        .await
        .context("failed to connect to database")?;

    match cli.command.unwrap_or(MigrationCommand::Up) {
        MigrationCommand::Up => {
            db::run_migrations(&pool).await?;
        }
        MigrationCommand::Down => {
            Migrator::down(&pool, Some(1))
                .await
                .context("failed to roll back migration")?;
            info!("Rolled back the most recent migration");
        }
        MigrationCommand::Status => {
            Migrator::status(&pool)
                .await
                .context("failed to read migration status")?;
        }
    }

    db::close_pool(pool).await?;
    info!("Migration completed successfully");
    Ok(())
}
