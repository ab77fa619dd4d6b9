//! Airway listing command handler.

use anyhow::Result;

use airnav_lib::{AirwayListing, Level};

use super::CommandContext;

/// Handle the airway subcommand.
pub fn handle_airway(context: &CommandContext, ident: &str, level: Level) -> Result<()> {
    let nav = context.open()?;
    let airway = nav.airway(ident, level)?;
    let listing = AirwayListing::from_airway(&airway)?;
    context.format.render_airway(&listing)
}
