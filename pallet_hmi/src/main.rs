//! # Palletizing HMI console
//!
//! Operator panel for the two-sided palletizing cell, driven from stdin.
//!
//! # Usage
//!
//! ```bash
//! # Against the simulated PLC and robot
//! pallet_hmi --simulate
//!
//! # With a config file, verbose JSON logs
//! pallet_hmi --config /etc/pallet_hmi/config.toml -v --json
//! ```

use clap::Parser;
use pallet_common::config::{ConfigError, ConfigLoader};
use pallet_common::consts::DEFAULT_CONFIG_PATH;
use pallet_hmi::config::HmiConfig;
use pallet_hmi::console::{self, OperatorCommand, Reply};
use pallet_hmi::logging;
use pallet_hmi::panel::{Collaborators, Panel};
use pallet_hmi::sim::{SimulatedPlc, SimulatedProgramRunner};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

/// Palletizing HMI - operator panel for a two-sided palletizing cell
#[derive(Parser, Debug)]
#[command(name = "pallet_hmi")]
#[command(version)]
#[command(about = "Operator panel for a two-sided palletizing robot cell")]
#[command(long_about = None)]
struct Args {
    /// Path to the panel configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Use the simulated PLC and robot (defaults apply if the config file is missing)
    #[arg(short = 's', long)]
    simulate: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("pallet HMI startup failed: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            setup_tracing(&args, &HmiConfig::default());
            return Err(e.into());
        }
    };

    setup_tracing(&args, &config);
    info!(
        service = %config.shared.service_name,
        "Palletizing HMI v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let settings = config.panel_settings()?;
    let plc = args
        .simulate
        .then(|| Arc::new(SimulatedPlc::new(settings.register_map.clone())));
    let collaborators = if let Some(plc) = &plc {
        info!("Simulation mode enabled");
        Collaborators {
            fieldbus: Some(plc.clone()),
            programs: Some(Arc::new(SimulatedProgramRunner::new())),
        }
    } else {
        warn!("No fieldbus or program control attached; publish and run control are inert");
        Collaborators::default()
    };

    let mut panel = Panel::mount(settings, collaborators);
    println!("{}", console::render_status(&panel.snapshot()));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                info!("Received shutdown signal");
                break;
            }
        };
        let Some(line) = line else { break };
        if line.trim().is_empty() {
            continue;
        }

        let cmd = match line.parse::<OperatorCommand>() {
            Ok(cmd) => cmd,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };

        if let OperatorCommand::SimPresent(side, present) = cmd {
            match &plc {
                Some(plc) => plc.set_pallet_present(side, present),
                None => println!("simulation commands need --simulate"),
            }
            continue;
        }

        match console::execute(&mut panel, cmd).await {
            Ok(Reply::Done(msg)) => {
                println!("{msg}");
                println!("{}", console::render_status(&panel.snapshot()));
            }
            Ok(Reply::Text(text)) => println!("{text}"),
            Ok(Reply::Quit) => break,
            Err(e) => {
                println!("{e}");
                println!("{}", console::render_status(&panel.snapshot()));
            }
        }
    }

    panel.teardown();
    info!("Palletizing HMI shutdown complete");
    Ok(())
}

/// Load and validate the config file. With `--simulate` a missing file
/// falls back to defaults.
fn load_config(args: &Args) -> Result<HmiConfig, ConfigError> {
    let config = match HmiConfig::load(&args.config) {
        Ok(config) => config,
        Err(ConfigError::FileNotFound) if args.simulate => HmiConfig::default(),
        Err(ConfigError::FileNotFound) => {
            return Err(ConfigError::ParseError(format!(
                "{} not found",
                args.config.display()
            )));
        }
        Err(e) => return Err(e),
    };
    config.validate()?;
    Ok(config)
}

/// Setup tracing subscriber from CLI arguments and the config file.
/// Logs go to stderr in both formats.
fn setup_tracing(args: &Args, config: &HmiConfig) {
    let level = if args.verbose {
        "debug"
    } else {
        config.shared.log_level.as_directive()
    };

    if let Err(e) = logging::init(logging::env_filter(level), args.json) {
        eprintln!("failed to install log subscriber: {e}");
    }
}
