mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use commands::Context;

#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    #[clap(short, long, global = true)]
    log_level: Option<String>,
    /// Working directory holding the database, template and cm3d.toml
    #[clap(short = 'C', long, global = true, default_value = ".")]
    dir: PathBuf,
    /// Database file, overriding cm3d.toml
    #[clap(long, global = true)]
    database: Option<PathBuf>,
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Set up an empty working directory
    Init,
    /// Create the database schema
    CreateDb {
        /// Drop all existing tables first
        #[clap(long)]
        drop: bool,
    },
    /// Ingest a study workbook
    AddStudy {
        file: PathBuf,
        #[clap(short, long)]
        username: Option<String>,
        /// Fail on duplicate Group or Biological replica ids
        #[clap(long)]
        strict_ids: bool,
    },
    /// Export every study as one denormalised CSV
    ExportDb {
        #[clap(short, long)]
        output: Option<PathBuf>,
    },
    /// Export the rows matching a filter predicate as CSV
    QueryDb {
        /// e.g. "study.title = 'My study'"
        #[clap(required_unless_present = "saved", conflicts_with = "saved")]
        predicate: Option<String>,
        /// Run a filter saved in cm3d.toml
        #[clap(short, long)]
        saved: Option<String>,
        /// Expand measurement data into measurement.data_<key> columns
        #[clap(short, long)]
        flatten: bool,
        #[clap(short, long)]
        output: Option<PathBuf>,
    },
    /// List stored studies
    ListStudies,
    /// Write a study's original workbook back out
    DownloadStudy {
        id: i32,
        #[clap(short, long)]
        output: Option<PathBuf>,
    },
    /// Change a study's title or authors
    UpdateStudy {
        id: i32,
        #[clap(long)]
        title: Option<String>,
        #[clap(long)]
        authors: Option<String>,
    },
    /// Delete a study and everything below it
    DeleteStudy { id: i32 },
    /// Write a random, valid study workbook
    MockStudy {
        #[clap(short, long)]
        output: Option<PathBuf>,
    },
    /// Verify the working directory
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    setup_logging(&args.log_level);

    let ctx = Context::open(args.dir, args.database)?;

    match args.command {
        Commands::Init => commands::init(&ctx).await?,
        Commands::CreateDb { drop } => commands::create_db(&ctx, drop).await?,
        Commands::AddStudy {
            file,
            username,
            strict_ids,
        } => commands::add_study(&ctx, &file, username, strict_ids).await?,
        Commands::ExportDb { output } => commands::export_db(&ctx, output).await?,
        Commands::QueryDb {
            predicate,
            saved,
            flatten,
            output,
        } => commands::query_db(&ctx, predicate, saved, flatten, output).await?,
        Commands::ListStudies => commands::list_studies(&ctx).await?,
        Commands::DownloadStudy { id, output } => {
            commands::download_study(&ctx, id, output).await?
        }
        Commands::UpdateStudy { id, title, authors } => {
            commands::update_study(&ctx, id, title, authors).await?
        }
        Commands::DeleteStudy { id } => commands::delete_study(&ctx, id).await?,
        Commands::MockStudy { output } => commands::mock_study(&ctx, output)?,
        Commands::Check => commands::check(&ctx)?,
    }

    Ok(())
}

fn setup_logging(log_level: &Option<String>) {
    let log_level = match log_level
        .as_ref()
        .unwrap_or(&"info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(format!(
            "sqlx=warn,sea_orm=warn,{}",
            log_level
        )))
        .without_time()
        .init();
}
