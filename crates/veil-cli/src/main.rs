//! Veil CLI - transparent at-rest encryption for private notes
//!
//! This is the command-line interface for Veil. Each invocation unlocks the
//! vault, does its work, and locks it again before exiting.

mod app;
mod cli;
mod commands;
mod config;
mod constants;
mod errors;
mod ui;

use clap::{CommandFactory, Parser};
use clap_complete::generate;
use tracing_subscriber::EnvFilter;

use crate::app::AppContext;
use crate::cli::{Cli, Commands};
use crate::errors::{classify, exit_code_for};

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn run(ctx: &AppContext) -> anyhow::Result<()> {
    match &ctx.cli().command {
        Commands::Init(args) => commands::handle_init(ctx, args),
        Commands::Status(args) => commands::handle_status(ctx, args),
        Commands::Unlock => commands::handle_unlock(ctx),
        Commands::Lock => commands::handle_lock(ctx),
        Commands::ChangePassword => commands::handle_change_password(ctx),
        Commands::Recover => commands::handle_recover(ctx),
        Commands::Cat(args) => commands::handle_cat(ctx, args),
        Commands::Write(args) => commands::handle_write(ctx, args),
        Commands::Session => commands::handle_session(ctx),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(*shell, &mut cmd, "veil", &mut std::io::stdout());
            Ok(())
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let ctx = AppContext::new(&cli);
    if let Err(err) = run(&ctx) {
        let err = classify(err);
        let text = err.to_string();
        let (message, error_hint) = match text.split_once("\nHint:") {
            Some((message, rest)) => (message, Some(rest.trim())),
            None => (text.as_str(), None),
        };
        ui::print_error(&ctx.ui(false), message, error_hint);
        std::process::exit(exit_code_for(&err));
    }
}
