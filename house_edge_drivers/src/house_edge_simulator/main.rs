mod simulation;

use std::path::PathBuf;

use clap::Parser;
use house_edge_drivers::{parse_config_from_file, BatchSettings, Config, DriverError};

const DEFAULT_CONFIG_PATH: &str = "~/.house_edge.yml";

#[derive(Debug, Parser)]
#[command(author, about, long_about = None)]
struct CommandLineArgs {
    /// The path of the config file
    #[arg(short, long, default_value_t = String::from(DEFAULT_CONFIG_PATH))]
    config: String,

    /// Rebuild the analysis from existing result files without simulating
    #[arg(long)]
    analyze_only: bool,
}

/// Loads the config. A missing default config file means the built-in defaults.
fn load_config(config: &str) -> Result<Config, DriverError> {
    if config != DEFAULT_CONFIG_PATH {
        return parse_config_from_file(config);
    }

    let config_file_path = match home::home_dir() {
        Some(home_dir) => home_dir.join(".house_edge.yml"),
        None => {
            log::warn!("cannot find home directory, using the default config");
            return Ok(Config::default());
        }
    };
    if !config_file_path.exists() {
        log::warn!(
            "{} does not exist, using the default config",
            config_file_path.display()
        );
        return Ok(Config::default());
    }
    if config_file_path.is_dir() {
        return Err(DriverError::InvalidConfig(format!(
            "{} should be a file rather than a directory",
            config_file_path.display()
        )));
    }
    parse_config_from_file(&config_file_path.to_string_lossy())
}

fn run(args: CommandLineArgs) -> Result<(), DriverError> {
    let config = load_config(&args.config)?;
    log::debug!("{:#?}", config);

    let deck_counts = config.simulation.deck_counts.clone();
    let output_dir = PathBuf::from(&config.simulation.output_dir);
    let settings: BatchSettings = config.simulation.try_into()?;

    if args.analyze_only {
        simulation::analyze_only(&deck_counts, &output_dir)?;
    } else {
        simulation::simulate_all_deck_counts(&settings, &deck_counts, &output_dir)?;
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = CommandLineArgs::parse();
    if let Err(e) = run(args) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
