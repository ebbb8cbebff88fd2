//! Chinook catalog CLI entry point.
//!
//! # Responsibility
//! - Parse startup options, start logging and connect the gateway.
//! - Run the interactive menu and always disconnect on the way out.

mod menu;
mod prompt;
mod render;

use anyhow::{Context, Result};
use chinook_core::config::{DEFAULT_MAX_RETRIES, DEFAULT_MAX_ROWS};
use chinook_core::{
    create_store, default_log_level, init_logging, GatewayConfig, ValidatedQueryGateway,
};
use clap::Parser;
use log::info;
use prompt::Prompter;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "chinook")]
#[command(version)]
#[command(about = "Browse and edit the albums of a Chinook catalog database", long_about = None)]
struct Args {
    /// Path to the SQLite catalog file
    #[arg(long, default_value = "chinook.db")]
    db: PathBuf,

    /// Create the catalog tables before connecting if they are missing
    #[arg(long)]
    init: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value_t = default_log_level().to_string())]
    log_level: String,

    /// Directory for rolling log files (default: <temp>/chinook_catalog)
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Maximum rows any single listing returns (at least 1)
    #[arg(
        long,
        default_value_t = DEFAULT_MAX_ROWS as u64,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    max_rows: u64,

    /// Attempts per statement while the database is busy or locked
    #[arg(long, default_value_t = DEFAULT_MAX_RETRIES)]
    max_retries: u32,
}

fn main() -> Result<()> {
    let args = Args::parse();
    start_logging(&args)?;

    if args.init {
        create_store(&args.db)
            .with_context(|| format!("failed to initialize catalog at {}", args.db.display()))?;
        println!("Catalog tables ready at {}", args.db.display());
    }

    let config = GatewayConfig::default()
        .with_max_rows(usize::try_from(args.max_rows).unwrap_or(usize::MAX))
        .with_max_retries(args.max_retries);
    let mut gateway = ValidatedQueryGateway::new(config);
    gateway
        .connect(&args.db)
        .with_context(|| format!("failed to connect to {}", args.db.display()))?;
    info!("event=session_start module=cli status=ok");

    let mut prompter = Prompter::new(io::stdin().lock(), io::stdout().lock());
    let outcome = menu::run(&mut gateway, &mut prompter);
    gateway.disconnect();
    outcome
}

fn start_logging(args: &Args) -> Result<()> {
    let log_dir = match &args.log_dir {
        Some(dir) => absolute(dir)?,
        None => std::env::temp_dir().join("chinook_catalog"),
    };
    let log_dir = log_dir
        .to_str()
        .context("log directory must be valid UTF-8")?;

    // Logging failures are reported, not fatal.
    if let Err(err) = init_logging(&args.log_level, log_dir) {
        eprintln!("warning: file logging disabled: {err}");
    }
    Ok(())
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().context("failed to resolve current directory")?;
    Ok(cwd.join(path))
}

#[cfg(test)]
mod tests {
    use super::Args;
    use chinook_core::config::DEFAULT_MAX_ROWS;
    use clap::Parser;

    #[test]
    fn max_rows_defaults_and_rejects_zero() {
        let args = Args::try_parse_from(["chinook"]).unwrap();
        assert_eq!(args.max_rows, DEFAULT_MAX_ROWS as u64);

        let args = Args::try_parse_from(["chinook", "--max-rows", "2"]).unwrap();
        assert_eq!(args.max_rows, 2);

        assert!(Args::try_parse_from(["chinook", "--max-rows", "0"]).is_err());
    }
}
