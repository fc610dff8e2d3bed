//! okr init command

use anyhow::Context as _;
use clap::Args;
use dialoguer::{Input, Password};
use std::path::PathBuf;

use crate::Context;

#[derive(Debug, Args)]
pub struct InitCommand {
    /// Email of the first admin account
    #[arg(long)]
    pub admin_email: Option<String>,

    /// Display name of the first admin account
    #[arg(long, default_value = "Quản trị")]
    pub admin_name: String,

    /// Admin password (prompted when omitted)
    #[arg(long)]
    pub password: Option<String>,

    /// Also write the effective configuration to this file
    #[arg(long)]
    pub write_config: Option<PathBuf>,
}

impl InitCommand {
    pub fn run(&self, ctx: &Context) -> anyhow::Result<()> {
        println!("Initializing OKR School in {}", ctx.config.database.display());

        let email = match &self.admin_email {
            Some(email) => email.clone(),
            None => Input::<String>::new().with_prompt("Admin email").interact_text()?,
        };
        let password = match &self.password {
            Some(password) => password.clone(),
            None => Password::new()
                .with_prompt("Admin password")
                .with_confirmation("Repeat password", "Passwords do not match")
                .interact()?,
        };

        let mut core = ctx.open_core()?;
        let admin = core.bootstrap_admin(&email, &self.admin_name, &password)?;

        if let Some(path) = &self.write_config {
            ctx.config
                .write_to(path)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("✓ Configuration written to {}", path.display());
        }

        println!("✓ Admin account {} created", admin.email);
        Ok(())
    }
}
