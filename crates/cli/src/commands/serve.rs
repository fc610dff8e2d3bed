//! okr serve command

use clap::Args;

use crate::Context;

#[derive(Debug, Args)]
pub struct ServeCommand {
    /// Address to listen on, overrides the configuration
    #[arg(short, long)]
    pub bind: Option<String>,
}

impl ServeCommand {
    pub fn run(&self, ctx: &Context) -> anyhow::Result<()> {
        let bind = self.bind.clone().unwrap_or_else(|| ctx.config.bind.clone());
        let core = ctx.open_core()?;

        println!("Serving OKR School on http://{}", bind);
        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(gateway::serve(core, &bind))?;
        Ok(())
    }
}
