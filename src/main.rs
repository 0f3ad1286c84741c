//! Healthlog CLI - command-line interface for the personal health store

mod commands;

use clap::{Parser, Subcommand};
use chrono::NaiveDate;
use commands::{OutputFormat, SeedArgs};
use healthlog::config;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "healthlog")]
#[command(version)]
#[command(about = "Personal health tracking store with integrity enforced by the database")]
#[command(long_about = r#"
Healthlog keeps users, device health metrics, sleep, food, workouts and goals
in one SQLite file. Every rule (ranges, required fields, unique names,
references, workout source exclusivity, goal date order) is a database
constraint, so bad rows are rejected no matter how they are written.

Example usage:
  healthlog init
  healthlog seed --users 20 --days 60
  healthlog report --user 1
  healthlog remove-user --id 3 --purge
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the database file (overrides the config)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database schema and a config file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Fill the database with synthetic users and activity
    Seed {
        /// Number of users to create
        #[arg(short, long)]
        users: Option<usize>,

        /// Days of activity per user
        #[arg(long)]
        days: Option<u32>,

        /// RNG seed
        #[arg(long)]
        seed: Option<u64>,

        /// Last day of generated activity (defaults to today)
        #[arg(long)]
        anchor: Option<NaiveDate>,
    },

    /// Print the overview and, optionally, one user's report
    Report {
        /// User id
        #[arg(short, long)]
        user: Option<i64>,

        /// Report as of this date (defaults to today)
        #[arg(long)]
        today: Option<NaiveDate>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show row counts per table
    Stats {
        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Delete a user
    RemoveUser {
        /// User id
        #[arg(long)]
        id: i64,

        /// Also delete the user's metrics, logs and goals
        #[arg(long)]
        purge: bool,
    },
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config_path = cli.config.clone().unwrap_or_else(config::default_config_path);
    let config = config::load_config(Some(config_path.as_path()))?.unwrap_or_default();
    let database = config.database_path(cli.database.as_deref());

    match cli.command {
        Commands::Init { force } => {
            commands::run_init(&config_path, &database, &config, force)?;
        }

        Commands::Seed { users, days, seed, anchor } => {
            let args = SeedArgs {
                users,
                days,
                seed,
                anchor: anchor.unwrap_or_else(today),
            };
            commands::run_seed(&database, &config, args)?;
        }

        Commands::Report { user, today: as_of, format } => {
            commands::run_report(&database, &config, user, as_of.unwrap_or_else(today), format)?;
        }

        Commands::Stats { format } => {
            commands::run_stats(&database, &config, format)?;
        }

        Commands::RemoveUser { id, purge } => {
            commands::run_remove_user(&database, &config, id, purge)?;
        }
    }

    Ok(())
}
