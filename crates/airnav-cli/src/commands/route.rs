//! Route and via command handlers.

use anyhow::Result;

use airnav_lib::Level;

use super::CommandContext;

/// Arguments for the route command.
#[derive(Debug, Clone)]
pub struct RouteCommandArgs {
    pub from: String,
    pub to: String,
    pub level: Level,
}

/// Arguments for the via command.
#[derive(Debug, Clone)]
pub struct ViaCommandArgs {
    pub airway: String,
    pub from: String,
    pub to: String,
}

/// Handle the route subcommand.
pub fn handle_route(context: &CommandContext, args: &RouteCommandArgs) -> Result<()> {
    if args.level == Level::Both {
        anyhow::bail!("--level must be low or high when routing");
    }
    let nav = context.open()?;
    let summary = nav.route_between(&args.from, &args.to, args.level)?;
    context.format.render_route(&summary)
}

/// Handle the via subcommand.
pub fn handle_via(context: &CommandContext, args: &ViaCommandArgs) -> Result<()> {
    let nav = context.open()?;
    let summary = nav.via(&args.airway, &args.from, &args.to)?;
    context.format.render_route(&summary)
}
