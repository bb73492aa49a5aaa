use std::sync::Arc;

use anyhow::{Context, anyhow};
use aqi_core::{
    AirQualityReport, AirQualityService, Config, Coordinate, FetchOutcome, FixedLocation,
    Pollutant,
};
use clap::{Parser, Subcommand, ValueEnum};
use inquire::{Password, Text};
use tracing::warn;

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "aqi", version, about = "Air quality CLI")]
pub struct Cli {
    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure the API host and token.
    Configure {
        /// API host; prompts with the current value if omitted.
        #[arg(long)]
        host: Option<String>,
    },

    /// Show current air quality and the forecast window for a coordinate.
    Show {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        #[arg(long, allow_negative_numbers = true)]
        lng: f64,

        /// Which forecast to print.
        #[arg(long, value_enum, default_value_t = PollutantArg::All)]
        pollutant: PollutantArg,
    },

    /// Print the request URL for a coordinate, with the token redacted.
    Url {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        #[arg(long, allow_negative_numbers = true)]
        lng: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PollutantArg {
    O3,
    Pm10,
    Pm25,
    All,
}

impl PollutantArg {
    fn pollutants(self) -> &'static [Pollutant] {
        match self {
            PollutantArg::O3 => &[Pollutant::Ozone],
            PollutantArg::Pm10 => &[Pollutant::Pm10],
            PollutantArg::Pm25 => &[Pollutant::Pm25],
            PollutantArg::All => Pollutant::all(),
        }
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure { host } => configure(host),
            Command::Show { lat, lng, pollutant } => {
                show(Coordinate::new(lat, lng), pollutant.pollutants()).await
            }
            Command::Url { lat, lng } => {
                let config = load_config()?;
                let url = config
                    .client()
                    .redacted_url(Coordinate::new(lat, lng))
                    .map_err(|e| anyhow!(e.user_message()))?;
                println!("{url}");
                Ok(())
            }
        }
    }
}

fn load_config() -> anyhow::Result<Config> {
    let config = Config::load()?;
    for warning in config.warnings() {
        warn!("{warning}");
    }
    Ok(config)
}

fn configure(host: Option<String>) -> anyhow::Result<()> {
    let mut config = Config::load()?;

    config.api_host = match host {
        Some(host) => host,
        None => Text::new("API host:")
            .with_default(&config.api_host)
            .prompt()
            .context("Failed to read API host")?,
    };

    let token = Password::new("API token:")
        .without_confirmation()
        .with_help_message("Leave empty to keep the current token")
        .prompt()
        .context("Failed to read API token")?;
    if !token.trim().is_empty() {
        config.token = Some(token.trim().to_string());
    }

    let path = config.save()?;
    println!("Saved configuration to {}", path.display());

    for warning in config.warnings() {
        println!("Warning: {warning}");
    }

    Ok(())
}

async fn show(coordinate: Coordinate, pollutants: &[Pollutant]) -> anyhow::Result<()> {
    let config = load_config()?;
    let service = Arc::new(AirQualityService::new(
        Arc::new(config.client()),
        Arc::new(FixedLocation(Some(coordinate))),
    ));

    let outcome = service
        .spawn_refresh()
        .await
        .context("Air-quality fetch task failed")?
        .map_err(|e| anyhow!("{} ({})", e.user_message(), e.code()))?;

    let report: AirQualityReport = match outcome {
        Some(FetchOutcome::Published(report)) => report,
        Some(FetchOutcome::Superseded { .. }) | None => service
            .current()
            .ok_or_else(|| anyhow!("No air-quality data available for {coordinate}"))?,
    };

    print!("{}", render::ReportView { report: &report, pollutants });
    Ok(())
}
