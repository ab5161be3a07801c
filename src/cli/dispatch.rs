use anyhow::Result;

use super::ask::cmd_ask;
use super::commands::Commands;
use super::context::CliContext;
use super::env::CliArgs;
use super::load_data::cmd_load_data;
use super::policy::cmd_policy;
use super::serve::cmd_serve;

pub async fn dispatch(cli: &CliArgs, ctx: &CliContext) -> Result<()> {
    match cli.command.clone() {
        Commands::Serve(args) => cmd_serve(args, ctx).await,
        Commands::Ask(args) => cmd_ask(args, ctx, cli.output).await,
        Commands::LoadData(args) => cmd_load_data(args, ctx.config()).await,
        Commands::Policy(args) => cmd_policy(args, ctx, cli.output).await,
    }
}
