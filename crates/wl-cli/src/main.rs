use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use wl_cli::commands::{activity, booking, export, import, report, user, util};
use wl_cli::{ActivityAction, Cli, Commands, Config, UserAction};

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(wl_db::Database, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = wl_db::Database::open(&config.database_path)
        .with_context(|| format!("failed to open {}", config.database_path.display()))?;
    Ok((db, config))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        // No subcommand, show help
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let (db, config) = open_database(cli.config.as_deref())?;
    let mut out = io::stdout().lock();
    let acting_user = || util::resolve_user(&db, cli.user.as_deref(), &config);

    match command {
        Commands::User(UserAction::Add { name }) => {
            user::add(&mut out, &db, name)?;
        }
        Commands::User(UserAction::List) => user::list(&mut out, &db)?,
        Commands::Activity(action) => {
            let current = acting_user()?;
            match action {
                ActivityAction::Add(args) => {
                    activity::add(&mut out, &db, &current, args)?;
                }
                ActivityAction::List(args) => activity::list(&mut out, &db, &current, args)?,
                ActivityAction::Hide { id } => {
                    activity::set_hidden(&mut out, &db, &current, *id, true)?;
                }
                ActivityAction::Unhide { id } => {
                    activity::set_hidden(&mut out, &db, &current, *id, false)?;
                }
            }
        }
        Commands::Book(args) => {
            booking::book(&mut out, &db, &acting_user()?, args, util::today())?;
        }
        Commands::Change(args) => {
            booking::change(&mut out, &db, &acting_user()?, args)?;
        }
        Commands::Break(args) => {
            booking::add_break(&mut out, &db, &acting_user()?, args, config.break_minutes)?;
        }
        Commands::Bookings(args) => {
            booking::list(&mut out, &db, &acting_user()?, args, util::today())?;
        }
        Commands::Delete { id } => {
            booking::delete(&mut out, &db, &acting_user()?, *id)?;
        }
        Commands::Report(args) => {
            report::run(&mut out, &db, &acting_user()?, args, util::today())?;
        }
        Commands::Export => export::run(&mut out, &db)?,
        Commands::Import => {
            let summary = import::run(io::stdin().lock(), &db)?;
            writeln!(
                out,
                "Imported {} users, {} activities, {} bookings",
                summary.users, summary.activities, summary.bookings
            )?;
        }
    }

    Ok(())
}
