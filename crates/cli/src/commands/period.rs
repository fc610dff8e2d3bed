//! okr period command

use clap::{Args, Subcommand};
use console::style;
use shared::PeriodStatus;

use crate::Context;

#[derive(Debug, Args)]
pub struct PeriodCommand {
    #[command(subcommand)]
    pub command: PeriodSubcommand,
}

#[derive(Debug, Subcommand)]
pub enum PeriodSubcommand {
    /// Create a period (open)
    Add {
        id: String,
        /// Display name, defaults to the id
        #[arg(short, long, default_value = "")]
        name: String,
    },
    /// Allow OKR changes in a period again
    Open { id: String },
    /// Freeze the OKRs of a period
    Close { id: String },
    /// List periods
    List,
}

impl PeriodCommand {
    pub fn run(&self, ctx: &Context) -> anyhow::Result<()> {
        let (mut core, token) = ctx.admin_session()?;

        match &self.command {
            PeriodSubcommand::Add { id, name } => {
                let period = core.create_period(&token, id, name)?;
                println!("✓ Created period {} ({})", period.id, period.name);
            }
            PeriodSubcommand::Open { id } => {
                core.open_period(&token, id)?;
                println!("✓ Period {} is open", id);
            }
            PeriodSubcommand::Close { id } => {
                core.close_period(&token, id)?;
                println!("✓ Period {} is closed", id);
            }
            PeriodSubcommand::List => {
                for period in core.list_periods(&token)? {
                    let status = match period.status {
                        PeriodStatus::Open => style(period.status.as_str()).green(),
                        PeriodStatus::Closed => style(period.status.as_str()).red(),
                    };
                    println!("{:<8} {:<8} {}", period.id, status, period.name);
                }
            }
        }
        Ok(())
    }
}
