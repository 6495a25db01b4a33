//! Gistdash CLI - gist dashboard updaters
//!
//! Usage:
//!   gistdash agent [--update]      # Refresh the persona gist
//!   gistdash clouds [--update]     # Print cloud-cover GeoJSON
//!   gistdash money [--update]      # Refresh the money-flow dashboard
//!
//! Without --update every job is a dry run that prints the rendered
//! content to stdout. Credentials and gist IDs come from environment
//! variables: GH_TOKEN, AGENT_GIST_ID, AGENT_DATA_GIST_ID,
//! ANTHROPIC_REFRESH_TOKEN, ANTHROPIC_API_KEY, MONEY_GIST_ID,
//! CLOUD_GIST_ID, FRED_API_KEY.

use std::path::PathBuf;

use argh::FromArgs;
use gistdash::config::DashConfig;

/// Gistdash - scheduled gist dashboard updaters
#[derive(FromArgs)]
struct Args {
    /// show version information
    #[argh(switch, short = 'V')]
    version: bool,

    /// path to gistdash.toml (defaults are used when omitted)
    #[argh(option, short = 'c')]
    config: Option<PathBuf>,

    #[argh(subcommand)]
    command: Option<Command>,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum Command {
    Agent(AgentArgs),
    Clouds(CloudsArgs),
    Money(MoneyArgs),
}

/// Refresh the pinned persona gist
#[derive(FromArgs)]
#[argh(subcommand, name = "agent")]
struct AgentArgs {
    /// push to the gists (default: dry run)
    #[argh(switch)]
    update: bool,
}

/// Generate the cloud-cover GeoJSON map
#[derive(FromArgs)]
#[argh(subcommand, name = "clouds")]
struct CloudsArgs {
    /// also patch the gist named by CLOUD_GIST_ID
    #[argh(switch)]
    update: bool,
}

/// Refresh the money-flow dashboard gist
#[derive(FromArgs)]
#[argh(subcommand, name = "money")]
struct MoneyArgs {
    /// push to the gist (default: dry run)
    #[argh(switch)]
    update: bool,
}

#[tokio::main]
async fn main() {
    // Diagnostics go to stderr; stdout is reserved for job output.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let args: Args = argh::from_env();

    if args.version {
        println!("gistdash {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    let config = match DashConfig::load(args.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            log::error!("failed to load config: {e}");
            std::process::exit(1);
        }
    };

    let Some(command) = args.command else {
        eprintln!("Gistdash - scheduled gist dashboard updaters\n");
        eprintln!("Usage: gistdash <command>\n");
        eprintln!("Commands:");
        eprintln!("  agent     Refresh the pinned persona gist");
        eprintln!("              --update: push to the gists");
        eprintln!("  clouds    Print cloud-cover GeoJSON to stdout");
        eprintln!("              --update: also patch CLOUD_GIST_ID");
        eprintln!("  money     Refresh the money-flow dashboard");
        eprintln!("              --update: push to the gist");
        eprintln!("\nRun 'gistdash <command> --help' for more information.");
        return;
    };

    let result = match command {
        Command::Agent(cmd) => gistdash::agent::run(&config.agent, cmd.update).await,
        Command::Clouds(cmd) => gistdash::clouds::run(&config.clouds, cmd.update).await,
        Command::Money(cmd) => gistdash::money::run(&config.money, cmd.update).await,
    };

    if let Err(e) = result {
        log::error!("{e:#}");
        std::process::exit(1);
    }
}
