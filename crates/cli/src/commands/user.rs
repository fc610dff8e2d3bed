//! okr user command

use clap::{Args, Subcommand};
use console::style;
use dialoguer::{Confirm, Password};
use okr_core::{NewUser, UserFilter};
use shared::Role;

use crate::Context;

#[derive(Debug, Args)]
pub struct UserCommand {
    #[command(subcommand)]
    pub command: UserSubcommand,
}

#[derive(Debug, Subcommand)]
pub enum UserSubcommand {
    /// Create an account
    Add {
        email: String,
        name: String,
        /// admin, teacher, student or parent (Vietnamese labels accepted)
        #[arg(short, long)]
        role: Role,
        /// Class of a student
        #[arg(short, long)]
        class: Option<String>,
        /// Password (prompted when omitted)
        #[arg(long)]
        password: Option<String>,
    },
    /// List accounts
    List {
        #[arg(short, long)]
        role: Option<Role>,
        #[arg(short, long)]
        class: Option<String>,
    },
    /// Reset the password of an account
    Passwd {
        email: String,
        #[arg(long)]
        password: Option<String>,
    },
    /// Change the email of an account everywhere it is referenced
    Rename { old: String, new: String },
    /// Delete an account with its OKRs, reviews and parent links
    Remove {
        email: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

impl UserCommand {
    pub fn run(&self, ctx: &Context) -> anyhow::Result<()> {
        let (mut core, token) = ctx.admin_session()?;

        match &self.command {
            UserSubcommand::Add {
                email,
                name,
                role,
                class,
                password,
            } => {
                let input = NewUser {
                    email: email.clone(),
                    name: name.clone(),
                    role: *role,
                    class_name: class.clone(),
                    password: password_or_prompt(password.as_deref())?,
                };
                let user = core.create_user(&token, input)?;
                println!("✓ Created {} ({})", user.email, user.role);
            }
            UserSubcommand::List { role, class } => {
                let filter = UserFilter {
                    role: *role,
                    class_name: class.clone(),
                };
                let users = core.list_users(&token, &filter)?;
                for user in &users {
                    println!(
                        "{:<32} {:<8} {:<6} {}",
                        user.email,
                        user.role,
                        user.class_name.as_deref().unwrap_or("-"),
                        user.name
                    );
                }
                println!("{}", style(format!("{} account(s)", users.len())).dim());
            }
            UserSubcommand::Passwd { email, password } => {
                let password = password_or_prompt(password.as_deref())?;
                core.reset_password(&token, email, &password)?;
                println!("✓ Password reset for {}", email);
            }
            UserSubcommand::Rename { old, new } => {
                let user = core.rename_email(&token, old, new)?;
                println!("✓ {} is now {}", old, user.email);
            }
            UserSubcommand::Remove { email, yes } => {
                let confirmed = *yes
                    || Confirm::new()
                        .with_prompt(format!("Delete {} and everything linked to it?", email))
                        .default(false)
                        .interact()?;
                if !confirmed {
                    println!("Aborted");
                    return Ok(());
                }
                let report = core.delete_user(&token, email)?;
                println!(
                    "✓ Deleted {} ({} OKRs, {} reviews, {} parent links, {} classes unassigned)",
                    email, report.okrs, report.reviews, report.relationships, report.classes_unassigned
                );
            }
        }
        Ok(())
    }
}

pub(crate) fn password_or_prompt(password: Option<&str>) -> anyhow::Result<String> {
    match password {
        Some(password) => Ok(password.to_string()),
        None => Ok(Password::new()
            .with_prompt("Password")
            .with_confirmation("Repeat password", "Passwords do not match")
            .interact()?),
    }
}
