//! Moodlog CLI
//!
//! Command-line interface working directly on the database file:
//! - Check and move the schema version
//! - Log entries
//! - Print graph data

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use moodlog::config::{generate_default_config, Config};
use moodlog::migrations::{MigrationManager, MigrationOutcome};
use moodlog::query::{GraphData, QueryService};
use moodlog::storage::{codec, Database, DatabaseConfig, Entry, EntryStore, NewEntry};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "moodlog-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Track happiness, social and energy levels over time")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Database file (default: from config)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show schema health and applied migrations
    Status,

    /// Create the bookkeeping table and apply the first migration
    Init,

    /// Apply every pending migration
    Migrate,

    /// Undo the current migration (drops its tables and their rows)
    Rollback,

    /// Undo every migration
    Reset,

    /// Log an entry stamped with the current time
    Log {
        /// Happiness, 0-100
        happy: i64,
        /// Social, 0-100
        social: i64,
        /// Energy, 0-100
        energy: i64,
        /// Free-text notes
        #[arg(short, long)]
        notes: Option<String>,
    },

    /// Print entries in a time window
    Graph {
        /// Lower bound (ISO 8601)
        #[arg(long)]
        from: Option<String>,
        /// Upper bound (ISO 8601)
        #[arg(long)]
        to: Option<String>,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Status => show_status(&MigrationManager::new(open_database(cli.db)?)),
        Commands::Init => report(
            MigrationManager::new(open_database(cli.db)?)
                .init()
                .context("init failed")?,
        ),
        Commands::Migrate => report(
            MigrationManager::new(open_database(cli.db)?)
                .migrate()
                .context("migrate failed")?,
        ),
        Commands::Rollback => report(
            MigrationManager::new(open_database(cli.db)?)
                .rollback()
                .context("rollback failed")?,
        ),
        Commands::Reset => report(
            MigrationManager::new(open_database(cli.db)?)
                .reset()
                .context("reset failed")?,
        ),
        Commands::Log {
            happy,
            social,
            energy,
            notes,
        } => {
            let mut entry = NewEntry::new(happy, social, energy);
            entry.notes = notes;
            log_entry(&EntryStore::new(open_database(cli.db)?), &entry)
        }
        Commands::Graph { from, to, format } => {
            let service = QueryService::new(EntryStore::new(open_database(cli.db)?));
            let data = service.graph_data(from.as_deref(), to.as_deref())?;

            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&data)?),
                OutputFormat::Table => print!("{}", render_table(&data)),
            }
            Ok(())
        }
        Commands::Config { output } => write_config(output.as_ref()),
    }
}

fn show_status(migrations: &MigrationManager) -> anyhow::Result<()> {
    let status = migrations.status();
    println!("Moodlog v{}", env!("CARGO_PKG_VERSION"));
    println!();
    if status.ok {
        println!("Database OK (version {})", status.version.unwrap_or(0));
    } else {
        println!(
            "Database NOT OK [{}]: {}",
            status.code.map(|c| c.as_str()).unwrap_or("-"),
            status.message.as_deref().unwrap_or("-")
        );
    }

    let applied = migrations.applied()?;
    if !applied.is_empty() {
        println!();
        println!("{:<8} {:<20} {}", "Version", "Name", "Applied");
        println!("{}", "-".repeat(50));
        for record in applied {
            println!(
                "{:<8} {:<20} {}",
                record.version,
                record.name,
                codec::to_wire(record.applied_at)
            );
        }
    }

    if !status.ok {
        std::process::exit(1);
    }
    Ok(())
}

fn log_entry(store: &EntryStore, entry: &NewEntry) -> anyhow::Result<()> {
    let created = store.create(entry)?;
    println!(
        "Logged entry {} at {}",
        created.id,
        codec::to_wire(created.created_at)
    );
    Ok(())
}

fn open_database(path: Option<PathBuf>) -> anyhow::Result<Database> {
    let config = match path {
        Some(path) => DatabaseConfig::new(path),
        None => Config::load_default().storage.database_config(),
    };
    Database::open(&config).with_context(|| format!("opening database {:?}", config.path))
}

fn write_config(output: Option<&PathBuf>) -> anyhow::Result<()> {
    let config = generate_default_config();

    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, &config)?;
            println!("Config written to {:?}", path);
        }
        None => print!("{}", config),
    }
    Ok(())
}

fn report(outcome: MigrationOutcome) -> anyhow::Result<()> {
    println!("{}", outcome.summary());
    Ok(())
}

fn render_table(data: &GraphData) -> String {
    let mut out = String::new();

    if let (Some(first), Some(last)) = (&data.first_entry, &data.last_entry) {
        out.push_str(&format!(
            "History: {} .. {}\n\n",
            codec::to_wire(first.created_at),
            codec::to_wire(last.created_at)
        ));
    }

    if data.entries.is_empty() {
        out.push_str("No entries for the selected time range\n");
        return out;
    }

    out.push_str(&format!(
        "{:<6} {:<21} {:>5} {:>6} {:>6}  {}\n",
        "ID", "Created", "Happy", "Social", "Energy", "Notes"
    ));
    out.push_str(&"-".repeat(60));
    out.push('\n');
    for entry in &data.entries {
        out.push_str(&render_row(entry));
    }
    out
}

fn render_row(entry: &Entry) -> String {
    format!(
        "{:<6} {:<21} {:>5} {:>6} {:>6}  {}\n",
        entry.id,
        codec::to_wire(entry.created_at),
        entry.happy,
        entry.social,
        entry.energy,
        entry.notes.as_deref().unwrap_or("")
    )
}
