//! okr progress command

use clap::Args;
use console::style;
use shared::{ClassSummary, Rank};

use crate::Context;

#[derive(Debug, Args)]
pub struct ProgressCommand {
    #[arg(short, long)]
    pub class: String,

    #[arg(short, long)]
    pub period: String,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,
}

impl ProgressCommand {
    pub fn run(&self, ctx: &Context) -> anyhow::Result<()> {
        let (mut core, token) = ctx.admin_session()?;
        let summary = core.class_summary(&token, &self.class, &self.period)?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        } else {
            print_summary(&summary);
        }
        Ok(())
    }
}

fn print_summary(summary: &ClassSummary) {
    println!(
        "{}",
        style(format!("Class {} · period {}", summary.class_name, summary.period_id)).bold()
    );

    for (index, student) in summary.students.iter().enumerate() {
        let rank = match student.rank {
            Rank::Good => style(student.rank.label()).green(),
            Rank::Fair => style(student.rank.label()).cyan(),
            Rank::Pass => style(student.rank.label()).yellow(),
            Rank::NotPassed => style(student.rank.label()).red(),
        };
        println!(
            "{:>3}. {:<28} {:>7.1}%  {:<9} {} OKR",
            index + 1,
            student.student_name,
            student.percent,
            rank,
            student.okr_count
        );
    }

    let d = &summary.distribution;
    println!(
        "{}",
        style(format!(
            "{}: {}  {}: {}  {}: {}  {}: {}",
            Rank::Good,
            d.good,
            Rank::Fair,
            d.fair,
            Rank::Pass,
            d.pass,
            Rank::NotPassed,
            d.not_passed
        ))
        .dim()
    );
}
