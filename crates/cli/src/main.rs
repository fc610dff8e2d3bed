//! OKR School CLI
//!
//! Usage:
//!   okr init                          - Create the database and first admin
//!   okr serve [--bind]                - Run the HTTP gateway
//!   okr user add|list|passwd|rename|remove
//!   okr class add|list
//!   okr period add|open|close|list
//!   okr import users|parents <file>   - Import a CSV/YAML roster
//!   okr progress --class --period     - Ranked class summary

use clap::{Parser, Subcommand};
use cli::commands::{
    ClassCommand, ImportCommand, InitCommand, PeriodCommand, ProgressCommand, ServeCommand,
    UserCommand,
};
use cli::Context;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "okr")]
#[command(about = "OKR School - objectives and key results for homeroom classes")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (default: ./okr.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database file, overrides the configuration
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database and the first admin account
    Init(InitCommand),
    /// Run the HTTP gateway
    Serve(ServeCommand),
    /// Manage accounts
    User(UserCommand),
    /// Manage classes
    Class(ClassCommand),
    /// Manage periods
    Period(PeriodCommand),
    /// Import a roster file
    Import(ImportCommand),
    /// Print a ranked class summary
    Progress(ProgressCommand),
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let ctx = Context::load(cli.config.as_deref(), cli.database)?;

    match cli.command {
        Commands::Init(cmd) => cmd.run(&ctx),
        Commands::Serve(cmd) => cmd.run(&ctx),
        Commands::User(cmd) => cmd.run(&ctx),
        Commands::Class(cmd) => cmd.run(&ctx),
        Commands::Period(cmd) => cmd.run(&ctx),
        Commands::Import(cmd) => cmd.run(&ctx),
        Commands::Progress(cmd) => cmd.run(&ctx),
    }
}
