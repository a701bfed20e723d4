//! Schedule crawler CLI
//!
//! Queries group and teacher schedules and prints them as JSON.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use schedule_crawler::{
    error::Result,
    models::{CacheBackend, Config},
    pipeline::{ScheduleService, SubjectKind},
};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

/// College schedule crawler
#[derive(Parser, Debug)]
#[command(
    name = "schedule-crawler",
    version,
    about = "Group and teacher timetables scraped from the college site"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Skip the cache and always fetch from the site
    #[arg(long, global = true)]
    no_cache: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List groups from the index page
    Groups,

    /// List every teacher found in group schedules
    Teachers,

    /// Show one group's schedule
    Group {
        /// Group page reference (URL, path or slug)
        name: String,
        /// Date filter (accepted, not applied)
        #[arg(long, default_value = "")]
        date: String,
    },

    /// Show one teacher's schedule across all groups
    Teacher {
        /// Teacher name as printed on the site, e.g. "Худякова Н. В."
        name: String,
        /// Date filter (accepted, not applied)
        #[arg(long, default_value = "")]
        date: String,
    },

    /// Print when the timetable was last published
    Updated,

    /// Remove every cached entry
    ClearCache,

    /// Validate the configuration file
    Validate,
}

/// Initialize logging based on verbosity flag and configured level.
fn init_logging(verbose: bool, level: &str) {
    let level = if verbose { "debug" } else { level };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load_or_default(&cli.config);
    init_logging(cli.verbose, &config.logging.level);

    if cli.no_cache {
        config.cache.backend = CacheBackend::None;
    }

    if let Command::Validate = cli.command {
        log::info!("Validating configuration...");
        if let Err(e) = config.validate() {
            log::error!("Config validation failed: {}", e);
            return Err(e);
        }
        log::info!("✓ Config OK");
        return Ok(());
    }

    config.validate()?;
    let service = ScheduleService::from_config(&config)?;

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupted, cancelling...");
            ctrl_c.cancel();
        }
    });

    match cli.command {
        Command::Groups => print_json(&service.group_options(&cancel).await?)?,
        Command::Teachers => print_json(&service.teacher_options(&cancel).await?)?,
        Command::Group { name, date } => {
            let days = service
                .schedule(SubjectKind::Group, &name, &date, &cancel)
                .await?;
            print_json(&days)?;
        }
        Command::Teacher { name, date } => {
            let days = service
                .schedule(SubjectKind::Teacher, &name, &date, &cancel)
                .await?;
            print_json(&days)?;
        }
        Command::Updated => println!("{}", service.last_update(&cancel).await?),
        Command::ClearCache => service.clear_cache().await?,
        Command::Validate => {}
    }

    Ok(())
}
