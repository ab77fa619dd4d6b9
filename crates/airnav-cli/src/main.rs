use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use airnav_lib::Level;

mod commands;
mod output;

use commands::{CommandContext, RouteCommandArgs, ViaCommandArgs};
use output::OutputFormat;

#[derive(Parser, Debug)]
#[command(author, version, about = "Airway routing over a navigation dataset")]
struct Cli {
    /// Override the dataset directory or file path.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// JSON file with router tunables.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute an airway route between two fixes.
    Route {
        /// Departure fix or navaid ident.
        #[arg(long = "from")]
        from: String,
        /// Destination fix or navaid ident.
        #[arg(long = "to")]
        to: String,
        /// Network to route on: low or high.
        #[arg(long, default_value = "high")]
        level: Level,
    },
    /// Follow a named airway between two of its fixes.
    Via {
        /// Airway ident, e.g. V1 or J80.
        #[arg(long)]
        airway: String,
        /// Entry fix ident.
        #[arg(long = "from")]
        from: String,
        /// Exit fix ident.
        #[arg(long = "to")]
        to: String,
    },
    /// List the elements of an airway.
    Airway {
        /// Airway ident.
        #[arg(long)]
        ident: String,
        /// Level to search: low, high or both.
        #[arg(long, default_value = "both")]
        level: Level,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let context = CommandContext {
        data_dir: cli.data_dir,
        config: cli.config,
        format: cli.format,
    };

    match cli.command {
        Command::Route { from, to, level } => {
            commands::handle_route(&context, &RouteCommandArgs { from, to, level })
        }
        Command::Via { airway, from, to } => {
            commands::handle_via(&context, &ViaCommandArgs { airway, from, to })
        }
        Command::Airway { ident, level } => commands::handle_airway(&context, &ident, level),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
