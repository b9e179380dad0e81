use clap::{Parser, Subcommand};
use postkiosk_db::PoolConfig;
use tracing_subscriber::EnvFilter;

mod fetch;
mod kiosk;
mod runs;
mod show;
mod terminal;

#[cfg(test)]
mod tests;

#[derive(Debug, Parser)]
#[command(name = "postkiosk")]
#[command(about = "Post ingestion and kiosk display")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch new posts for the tracked handles and store them.
    Fetch {
        /// Fetch a single handle instead of the configured set.
        #[arg(long)]
        handle: Option<String>,
        /// Override the per-handle post cap for this run.
        #[arg(long)]
        max_posts: Option<usize>,
        /// Print what would be fetched without touching the store.
        #[arg(long)]
        dry_run: bool,
    },
    /// Print stored posts for one handle, newest first.
    Show { handle: String },
    /// Run the interactive kiosk in the terminal.
    Kiosk,
    /// List recent ingest runs.
    Runs {
        #[arg(long, default_value_t = 20)]
        limit: i64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = postkiosk_core::load_app_config()?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    let pool = postkiosk_db::connect_pool(
        &config.database_url,
        PoolConfig {
            max_connections: config.db_max_connections,
            min_connections: config.db_min_connections,
            acquire_timeout_secs: config.db_acquire_timeout_secs,
        },
    )
    .await?;
    postkiosk_db::ping(&pool).await?;
    let applied = postkiosk_db::run_migrations(&pool).await?;
    if applied > 0 {
        tracing::info!(applied, "applied pending migrations");
    }

    match cli.command {
        Commands::Fetch {
            handle,
            max_posts,
            dry_run,
        } => fetch::run_fetch(&pool, &config, handle.as_deref(), max_posts, dry_run).await,
        Commands::Show { handle } => show::run_show(&pool, &handle).await,
        Commands::Kiosk => kiosk::run_kiosk(pool, &config).await,
        Commands::Runs { limit } => runs::run_runs(&pool, limit).await,
    }
}
