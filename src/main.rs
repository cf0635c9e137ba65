//! navmux command line.
//!
//! ```text
//! navmux encode /list?a=1          → %2Flist%3Fa%25M21
//! navmux read   --url <shared> --app sub1
//! navmux attach --url <shared> --app sub1 --path /detail
//! navmux detach --url <shared> --app sub1
//! navmux simulate scenario.toml    → JSON report
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use url::Url;

use navmux::codec;
use navmux::config::{load_config, MuxConfig};
use navmux::host::UrlParts;
use navmux::observability::logging::init_logging;
use navmux::query::QueryMultiplexer;
use navmux::scenario::{load_scenario, run_scenario};

#[derive(Parser)]
#[command(name = "navmux")]
#[command(about = "Multiplex micro-frontend routes into one shared URL", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode an app path into a query token
    Encode { path: String },
    /// Decode a query token back into an app path
    Decode { token: String },
    /// Print the path an app stores in a shared URL
    Read {
        #[arg(long)]
        url: String,
        #[arg(long)]
        app: String,
    },
    /// Write an app path into a shared URL
    Attach {
        #[arg(long)]
        url: String,
        #[arg(long)]
        app: String,
        #[arg(long)]
        path: String,
    },
    /// Remove an app's entry from a shared URL
    Detach {
        #[arg(long)]
        url: String,
        #[arg(long)]
        app: String,
    },
    /// Run a scenario file and print a JSON report
    Simulate { scenario: PathBuf },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match load_config(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => MuxConfig::default(),
    };
    init_logging(&config.observability);

    match run(cli.command, &config) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands, config: &MuxConfig) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let multiplexer = QueryMultiplexer::new(config.naming.query_prefix.clone());

    match command {
        Commands::Encode { path } => println!("{}", codec::encode(&path)),
        Commands::Decode { token } => println!("{}", codec::decode(&token)),
        Commands::Read { url, app } => {
            let shared = Url::parse(&url)?;
            match multiplexer.read_app_path(&UrlParts::from_url(&shared), &app) {
                Some(path) => println!("{path}"),
                None => {
                    eprintln!("No entry for app {app}");
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Commands::Attach { url, app, path } => {
            let shared = Url::parse(&url)?;
            let target = UrlParts::from_url(&shared.join(&path)?);
            let multiplexed =
                multiplexer.write_app_path(&UrlParts::from_url(&shared), &app, &target);
            println!("{}", shared.join(&multiplexed.full_path)?);
        }
        Commands::Detach { url, app } => {
            let shared = Url::parse(&url)?;
            let full_path = multiplexer.remove_app_path(&UrlParts::from_url(&shared), &app);
            println!("{}", shared.join(&full_path)?);
        }
        Commands::Simulate { scenario } => {
            let scenario = load_scenario(&scenario)?;
            let report = run_scenario(&scenario, config)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(ExitCode::SUCCESS)
}
