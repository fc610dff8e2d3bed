//! okr import command

use clap::{Args, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use roster::{ImportReport, LoadedRoster, ParentRow, RosterLoader, UserRow};

use crate::Context;

#[derive(Debug, Args)]
pub struct ImportCommand {
    #[command(subcommand)]
    pub command: ImportSubcommand,
}

#[derive(Debug, Subcommand)]
pub enum ImportSubcommand {
    /// Import accounts (email, password, name, role, className)
    Users {
        /// CSV or YAML file, or a glob such as `rosters/*.csv`
        file: String,
    },
    /// Import student / parent links (studentEmail, parentEmail, parentName, password)
    Parents { file: String },
}

impl ImportCommand {
    pub fn run(&self, ctx: &Context) -> anyhow::Result<()> {
        let (mut core, token) = ctx.admin_session()?;

        let report = match &self.command {
            ImportSubcommand::Users { file } => {
                let mut loaded: LoadedRoster<UserRow> = RosterLoader::load_all(file)?;
                tracing::debug!(rows = loaded.rows.len(), file = %file, "user roster loaded");
                let rows = std::mem::take(&mut loaded.rows);
                let bar = progress_bar(rows.len());
                let report = core.import_users_with(&token, &rows, |n| bar.set_position(n as u64))?;
                bar.finish_and_clear();
                loaded.finish(report)
            }
            ImportSubcommand::Parents { file } => {
                let mut loaded: LoadedRoster<ParentRow> = RosterLoader::load_all(file)?;
                tracing::debug!(rows = loaded.rows.len(), file = %file, "parent roster loaded");
                let rows = std::mem::take(&mut loaded.rows);
                let bar = progress_bar(rows.len());
                let report =
                    core.import_relationships_with(&token, &rows, |n| bar.set_position(n as u64))?;
                bar.finish_and_clear();
                loaded.finish(report)
            }
        };

        print_report(&report);
        Ok(())
    }
}

fn progress_bar(len: usize) -> ProgressBar {
    let bar = ProgressBar::new(len as u64);
    if let Ok(bar_style) = ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} rows") {
        bar.set_style(bar_style);
    }
    bar
}

fn print_report(report: &ImportReport) {
    println!("{} {}", style("✓").green(), report.summary());
    for email in &report.accounts_created {
        println!("  {} account {}", style("+").green(), email);
    }
    for key in &report.skipped_duplicates {
        println!("  {} {}", style("skipped").yellow(), key);
    }
    for row in &report.invalid {
        println!(
            "  {} row {} ({}): {}",
            style("invalid").red(),
            row.row,
            row.key,
            row.reason
        );
    }
}
