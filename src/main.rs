use std::sync::Arc;

use abrody_web::distance::{DistanceCalculator, FixedPosition};
use abrody_web::{config, server, GeoPoint, OsDetector, UaSignal};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "abrody-web", version, about = "Abrody store redirect service and utilities")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the store redirect server
    Serve,
    /// Classify User-Agent values (several values are joined like repeated headers)
    Detect {
        #[arg(required = true)]
        user_agent: Vec<String>,
        /// YAML rule table to use instead of the built-in one
        #[arg(long, env = "ABRODY_OS_RULES_PATH")]
        rules: Option<std::path::PathBuf>,
    },
    /// Format the distance between two points
    Distance {
        /// Origin as LAT,LON
        #[arg(long, allow_hyphen_values = true)]
        from: GeoPoint,
        /// Destination as LAT,LON
        #[arg(long, allow_hyphen_values = true)]
        to: GeoPoint,
        /// Locale deciding between metric and imperial units
        #[arg(long, env = "LANG", default_value = "en-US")]
        locale: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Loaded exactly once, before clap reads env fallbacks.
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Command::Serve => {
            let config = config::load_app_config()?;
            init_tracing(&config.log_level)?;
            tracing::debug!(?config, "loaded configuration");
            server::serve(&config).await?;
        }
        Command::Detect { user_agent, rules } => {
            init_tracing("warn")?;
            let detector = match rules {
                Some(path) => OsDetector::from_yaml_file(path)?,
                None => OsDetector::new()?,
            };
            println!("{}", detector.detect(UaSignal::from_parts(&user_agent)));
        }
        Command::Distance { from, to, locale } => {
            init_tracing("warn")?;
            // The CLI stands in for an authenticated device at `from`.
            let calculator = Arc::new(DistanceCalculator::new(FixedPosition(from), true, locale));
            let pending = calculator.spawn(to, |_: &str| "location unavailable".to_string());
            match pending.resolve().await {
                Some(formatted) => println!("{formatted}"),
                None => anyhow::bail!("distance calculation did not complete"),
            }
        }
    }

    Ok(())
}

/// `RUST_LOG` wins over the configured default level.
fn init_tracing(default_level: &str) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}
