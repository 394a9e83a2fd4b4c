use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod config;
mod db;
mod error;
mod export;
mod feed;
mod images;
mod ingest;
mod models;
mod services;

use config::Config;
use db::Repository;
use error::Result;
use export::write_export;
use ingest::{IngestReport, Pipeline};
use models::Article;

#[derive(Debug, Parser)]
#[command(name = "tech-digest", version, about = "Ingest tech news feeds into a deduplicated store")]
struct Cli {
    /// Config file (defaults to the per-user config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the database path from the config
    #[arg(long, global = true)]
    db: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fetch all sources and store new articles
    Ingest {
        /// Also write the JSON export here
        #[arg(long)]
        json: Option<PathBuf>,
    },
    /// Write the JSON export without touching the store
    Export {
        #[arg(long)]
        output: Option<PathBuf>,

        /// Export the newest stored articles instead of fetching
        #[arg(long)]
        from_db: bool,
    },
    /// Enforce unique links on an existing store, keeping the earliest rows
    Migrate,
    /// Remove duplicate links, keeping the latest rows
    Dedup,
    /// Print the articles table schema
    Schema,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(db) = cli.db {
        config.db_path = db;
    }

    match cli.command.unwrap_or(Command::Ingest { json: None }) {
        Command::Ingest { json } => {
            let repository = Repository::open(&config.db_path).await?;
            repository.migrate().await?;

            let pipeline = Pipeline::from_config(&config)?;
            let report = pipeline.run().await;
            print_source_counts(&report);

            let saved = repository.save_articles(&report.articles).await;
            let total = repository.count().await?;
            println!("Saved {} new articles ({} stored)", saved, total);

            if let Some(path) = json {
                write_export(&path, &report.articles)?;
            }
        }
        Command::Export { output, from_db } => {
            let path = output.unwrap_or_else(|| PathBuf::from(&config.export_path));
            let articles = if from_db {
                stored_articles(&config).await?
            } else {
                let report = Pipeline::from_config(&config)?.run().await;
                print_source_counts(&report);
                report.articles
            };
            write_export(&path, &articles)?;
        }
        Command::Migrate => {
            let repository = Repository::open(&config.db_path).await?;
            let removed = repository.migrate().await?;
            println!("Removed {} duplicate articles", removed);
        }
        Command::Dedup => {
            let repository = Repository::open(&config.db_path).await?;
            let removed = repository.dedup_sweep().await?;
            println!("Removed {} duplicate articles", removed);
        }
        Command::Schema => {
            let repository = Repository::open(&config.db_path).await?;
            match repository.table_schema().await? {
                Some(sql) => println!("Articles table schema:\n{}", sql),
                None => println!("Articles table not found"),
            }
        }
    }

    Ok(())
}

/// Newest stored articles, ordered the same way as a fresh run.
async fn stored_articles(config: &Config) -> Result<Vec<Article>> {
    let repository = Repository::open(&config.db_path).await?;
    let mut stored = repository.recent_articles(config.max_articles).await?;
    stored.sort_by(|a, b| {
        b.article
            .pub_date
            .cmp(&a.article.pub_date)
            .then(b.id.cmp(&a.id))
    });
    Ok(stored.into_iter().map(|s| s.article).collect())
}

fn print_source_counts(report: &IngestReport) {
    for (name, count) in &report.per_source {
        println!("  {}: {} articles", name, count);
    }
}
