use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use libris_app::{App, SeedSource};
use libris_kernel::settings::Settings;

#[derive(Debug, Parser)]
#[command(name = "libris", version, about = "Book and author catalog service")]
struct Cli {
    /// Override the configured SQLite path
    #[arg(long, global = true)]
    database: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server
    Serve,
    /// Apply pending migrations and exit
    Migrate,
    /// Replace the catalog with seed data
    Reset {
        /// Seed JSON file; defaults to the configured seed
        #[arg(long)]
        seed: Option<PathBuf>,
    },
    /// Print the effective settings
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load().with_context(|| "failed to load settings")?;
    if let Some(database) = cli.database {
        settings.database.path = database;
    }
    libris_telemetry::init(&settings.telemetry).ok();

    match cli.command {
        Command::Serve => {
            let app = App::new(settings)?;
            app.prepare().await?;
            app.serve().await
        }
        Command::Migrate => {
            let app = App::new(settings)?;
            app.prepare().await?;
            tracing::info!("migrations applied");
            Ok(())
        }
        Command::Reset { seed } => {
            let source = SeedSource::from_path(seed.or_else(|| settings.seed.path.clone()));
            let catalog = source.load()?;

            let app = App::new(settings)?;
            app.prepare().await?;
            let summary = app
                .catalog()
                .reset_all(&catalog.books, &catalog.authors)
                .context("catalog reset failed")?;

            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(())
        }
        Command::Config => {
            println!("environment: {}", settings.environment.as_str());
            println!(
                "server: {}:{} (timeout {} ms)",
                settings.server.host, settings.server.port, settings.server.request_timeout_ms
            );
            println!("database: {}", settings.database.path);
            println!(
                "telemetry: {:?} at '{}'",
                settings.telemetry.log_format, settings.telemetry.log_level
            );
            match &settings.seed.path {
                Some(path) => println!("seed: {}", path.display()),
                None => println!("seed: built-in"),
            }
            Ok(())
        }
    }
}
