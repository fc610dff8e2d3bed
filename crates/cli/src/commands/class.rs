//! okr class command

use clap::{Args, Subcommand};
use console::style;
use shared::Class;

use crate::Context;

#[derive(Debug, Args)]
pub struct ClassCommand {
    #[command(subcommand)]
    pub command: ClassSubcommand,
}

#[derive(Debug, Subcommand)]
pub enum ClassSubcommand {
    /// Create a class
    Add {
        name: String,
        /// Homeroom teacher email
        #[arg(short, long)]
        teacher: Option<String>,
        /// Number of students
        #[arg(short, long, default_value_t = 0)]
        size: u32,
    },
    /// List classes
    List,
}

impl ClassCommand {
    pub fn run(&self, ctx: &Context) -> anyhow::Result<()> {
        let (mut core, token) = ctx.admin_session()?;

        match &self.command {
            ClassSubcommand::Add {
                name,
                teacher,
                size,
            } => {
                let mut class = Class::new(name).with_size(*size);
                if let Some(teacher) = teacher {
                    class = class.with_teacher(teacher);
                }
                let class = core.create_class(&token, class)?;
                println!("✓ Created class {}", class.name);
            }
            ClassSubcommand::List => {
                for class in core.list_classes(&token)? {
                    println!(
                        "{:<8} {:<32} {}",
                        class.name,
                        class
                            .teacher_email
                            .as_deref()
                            .map(|t| t.to_string())
                            .unwrap_or_else(|| style("(no teacher)").dim().to_string()),
                        class.size
                    );
                }
            }
        }
        Ok(())
    }
}
