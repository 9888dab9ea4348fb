//! Extension Manager CLI
//!
//! Inspect installed extensions, preview and apply activation changes, and
//! check configuration values against the active set.

mod cli;
mod commands;
mod context;
mod error;
mod profile;

use clap::Parser;
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use cli::{Cli, Commands};
use context::CliContext;
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let ctx = CliContext::new(cli.extensions, cli.profile);
    match cli.command {
        Some(cmd) => execute_command(&ctx, cmd),
        None => {
            println!("{} Extension Manager CLI", "extm".green().bold());
            println!();
            println!("Run {} for available commands.", "extm --help".cyan());
            Ok(())
        }
    }
}

/// `--verbose` logs everything at DEBUG; otherwise `RUST_LOG` decides, and
/// nothing is logged when it is unset.
fn init_tracing(verbose: bool) {
    let installed = if verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
    } else if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
    } else {
        return;
    };

    if installed.is_err() {
        eprintln!("{}: failed to set tracing subscriber", "warning".yellow().bold());
    }
    tracing::debug!("Tracing initialised");
}

fn execute_command(ctx: &CliContext, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::List { json } => commands::run_list(ctx, json),
        Commands::Order { json } => commands::run_order(ctx, json),
        Commands::Activate { id, apply, json } => commands::run_activate(ctx, &id, apply, json),
        Commands::Deactivate { id, apply, json } => commands::run_deactivate(ctx, &id, apply, json),
        Commands::Upgrade { apply, json } => commands::run_upgrade(ctx, apply, json),
        Commands::Check { url, value, json } => commands::run_check(ctx, &url, &value, json),
        Commands::Set { url, value } => commands::run_set(ctx, &url, &value),
        Commands::Unset { url } => commands::run_unset(ctx, &url),
        Commands::Host { framework, frontend, json } => {
            commands::run_host(ctx, framework.as_deref(), &frontend, json)
        }
        Commands::Config { json } => commands::run_config(ctx, json),
    }
}
