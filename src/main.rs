//! Petitions CLI - manage petitions and their signatures in a local database

use clap::{Parser, Subcommand};
use petitions::config::{self, PetitionsConfig};
use petitions::ui::{self, Icons};
use petitions::{Petition, PetitionId, Signature, SignatureId, SqliteStore};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "petitions")]
#[command(version)]
#[command(about = "Create petitions and collect signatures in a local SQLite database")]
#[command(long_about = r#"
Petitions stores petitions and their signatures in SQLite.

Example usage:
  petitions init
  petitions create --title "Save the library" --description "Keep it open on Sundays"
  petitions sign --petition 1 --name "Ada" --email ada@example.com
  petitions show --id 1
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON instead of human-readable output
    #[arg(long, global = true)]
    json: bool,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the database file (overrides the config file)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a config file and create the database
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Create a new petition
    Create {
        #[arg(short, long)]
        title: String,

        #[arg(long)]
        description: String,
    },

    /// Add a signature to a petition
    Sign {
        /// Petition id
        #[arg(short, long)]
        petition: PetitionId,

        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        email: String,
    },

    /// Show a petition and its signatures
    Show {
        #[arg(long)]
        id: PetitionId,
    },

    /// List all petitions
    List,

    /// Remove a signature from its petition
    Unsign {
        /// Signature id
        #[arg(long)]
        id: SignatureId,
    },

    /// Delete a petition and all of its signatures
    Delete {
        #[arg(long)]
        id: PetitionId,
    },

    /// Show database statistics
    Stats,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();

    let loaded = config::load_config(cli.config.as_deref())?;
    let cwd = std::env::current_dir()?;
    let database = config::resolve_database_path(cli.database.as_deref(), loaded.as_ref(), &cwd);
    tracing::debug!("Using database {}", database.display());

    match cli.command {
        Commands::Init { force } => {
            let config_path = cli.config.clone().unwrap_or_else(config::default_config_path);
            let settings = PetitionsConfig {
                database: Some(database.to_string_lossy().to_string()),
            };
            config::write_config(&config_path, &settings, force)?;
            open_store(&database)?;

            if cli.json {
                print_json(&serde_json::json!({
                    "config": config_path,
                    "database": database,
                }))?;
            } else {
                ui::success(&format!("Wrote {}", config_path.display()));
                ui::info("Database", &database.display().to_string());
            }
        }

        Commands::Create { title, description } => {
            let mut store = open_store(&database)?;
            let mut petition = Petition::new(title, description);
            let id = store.save_petition(&mut petition)?;

            if cli.json {
                print_json(&petition)?;
            } else {
                ui::success(&format!("Created petition {}: {}", id, petition.title()));
            }
        }

        Commands::Sign { petition, name, email } => {
            let mut store = open_store(&database)?;
            let mut aggregate = store
                .get_petition(petition)?
                .ok_or(petitions::Error::PetitionNotFound(petition))?;

            aggregate.add_signature(Signature::new(name, email));
            store.save_petition(&mut aggregate)?;

            let signature = &aggregate.signatures()[aggregate.signature_count() - 1];
            if cli.json {
                print_json(signature)?;
            } else {
                ui::success(&format!(
                    "{} {} signed \"{}\" ({} signatures)",
                    Icons::PEN,
                    signature.name(),
                    aggregate.title(),
                    aggregate.signature_count()
                ));
            }
        }

        Commands::Show { id } => {
            let store = open_store(&database)?;
            let petition = store
                .get_petition(id)?
                .ok_or(petitions::Error::PetitionNotFound(id))?;

            if cli.json {
                print_json(&petition)?;
            } else {
                ui::header(Icons::SCROLL, petition.title());
                println!("{}", petition.description());
                ui::section(&format!("Signatures ({})", petition.signature_count()));
                if petition.signatures().is_empty() {
                    println!("{} No signatures yet.", Icons::EMPTY);
                } else {
                    println!("{}", ui::signature_table(petition.signatures()));
                }
            }
        }

        Commands::List => {
            let store = open_store(&database)?;
            let summaries = store.list_petitions()?;

            if cli.json {
                print_json(&summaries)?;
            } else if summaries.is_empty() {
                println!("{} No petitions found.", Icons::EMPTY);
            } else {
                println!("{}", ui::petition_table(&summaries));
            }
        }

        Commands::Unsign { id } => {
            let mut store = open_store(&database)?;
            let signature = store
                .get_signature(id)?
                .ok_or(petitions::Error::SignatureNotFound(id))?;
            let Some(owner) = signature.petition() else {
                anyhow::bail!("signature {} has no petition", id);
            };
            let mut petition = store
                .get_petition(owner)?
                .ok_or(petitions::Error::PetitionNotFound(owner))?;

            let removed = petition
                .remove_signature(id)
                .ok_or(petitions::Error::SignatureNotFound(id))?;
            store.save_petition(&mut petition)?;

            if cli.json {
                print_json(&serde_json::json!({ "removed": id, "petition": owner }))?;
            } else {
                ui::success(&format!(
                    "{} Removed {} from \"{}\"",
                    Icons::DEL,
                    removed.name(),
                    petition.title()
                ));
            }
        }

        Commands::Delete { id } => {
            let mut store = open_store(&database)?;
            let deleted = store.delete_petition(id)?;

            if cli.json {
                print_json(&serde_json::json!({ "deleted": deleted, "petition": id }))?;
            } else if deleted {
                ui::success(&format!("{} Deleted petition {}", Icons::DEL, id));
            } else {
                ui::warn(&format!("No petition with id {}", id));
            }
        }

        Commands::Stats => {
            let store = open_store(&database)?;
            let stats = store.stats()?;

            if cli.json {
                print_json(&stats)?;
            } else {
                ui::header(Icons::STATS, &format!("Petitions ({})", database.display()));
                let petitions = stats.petitions.to_string();
                let signatures = stats.signatures.to_string();
                println!(
                    "{}",
                    ui::stats_table(&[("Petitions", &petitions), ("Signatures", &signatures)])
                );
            }
        }
    }

    Ok(())
}

fn open_store(database: &Path) -> anyhow::Result<SqliteStore> {
    config::ensure_db_dir(database)?;
    Ok(SqliteStore::open(database)?)
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
