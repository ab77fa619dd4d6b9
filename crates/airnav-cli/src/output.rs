//! Output formatting for command results.

use std::io::{self, Write};

use anyhow::Result;
use clap::ValueEnum;

use airnav_lib::{AirwayListing, RouteSummary};

/// How results are written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned plain text.
    Text,
    /// Pretty-printed JSON.
    Json,
}

impl OutputFormat {
    pub fn render_route(self, summary: &RouteSummary) -> Result<()> {
        let body = match self {
            OutputFormat::Text => summary.render(),
            OutputFormat::Json => summary.to_json()?,
        };
        emit(&body)
    }

    pub fn render_airway(self, listing: &AirwayListing) -> Result<()> {
        let body = match self {
            OutputFormat::Text => listing.render(),
            OutputFormat::Json => listing.to_json()?,
        };
        emit(&body)
    }
}

fn emit(body: &str) -> Result<()> {
    let mut stdout = io::stdout().lock();
    stdout.write_all(body.as_bytes())?;
    if !body.ends_with('\n') {
        writeln!(stdout)?;
    }
    stdout.flush()?;
    Ok(())
}
