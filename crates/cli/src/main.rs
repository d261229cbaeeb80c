use std::path::{Path, PathBuf};

use anyhow::Context;
use bookshelf_app::modules::books::validation::validate_for_create;
use bookshelf_kernel::settings::Settings;
use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Debug, Parser)]
#[command(name = "bookshelf-cli", version, about = "Operate the bookshelf service")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server until Ctrl-C or SIGTERM
    Serve,
    /// Print the resolved settings as JSON
    Settings,
    /// Insert the books listed in a JSON array file
    Seed {
        /// File holding an array of book payloads
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load().context("failed to load bookshelf settings")?;

    match cli.command {
        Command::Serve => {
            bookshelf_telemetry::init(&settings.telemetry)?;
            bookshelf_app::run(settings).await
        }
        Command::Settings => {
            let rendered = serde_json::to_string_pretty(&settings)
                .context("failed to render settings")?;
            println!("{rendered}");
            Ok(())
        }
        Command::Seed { file } => {
            bookshelf_telemetry::init(&settings.telemetry)?;
            seed(&settings, &file).await
        }
    }
}

async fn seed(settings: &Settings, file: &Path) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read seed file {}", file.display()))?;
    let entries: Vec<Value> = serde_json::from_str(&raw)
        .with_context(|| format!("seed file {} is not a JSON array", file.display()))?;

    let store = bookshelf_db::connect(&settings.database).await?;

    let mut inserted = 0usize;
    let mut rejected = 0usize;
    for (index, entry) in entries.iter().enumerate() {
        let Some(payload) = entry.as_object() else {
            rejected += 1;
            eprintln!("entry {index}: not a JSON object");
            continue;
        };
        match validate_for_create(payload) {
            Ok(book) => {
                let id = store
                    .insert(book)
                    .await
                    .with_context(|| format!("failed to insert entry {index}"))?;
                tracing::info!(entry = index, book_id = %id, "seeded book");
                inserted += 1;
            }
            Err(failure) => {
                rejected += 1;
                let fields: Vec<String> = failure
                    .errors
                    .iter()
                    .map(|error| format!("{} {}", error.field, error.reason))
                    .collect();
                eprintln!("entry {index}: {} ({})", failure.message, fields.join("; "));
            }
        }
    }

    println!("inserted {inserted} book(s), rejected {rejected}");
    Ok(())
}
