use std::{
    path::{Path, PathBuf},
    process::ExitCode,
    sync::Arc,
};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use cityweather_core::{
    AppSettings, Config, CycleOutcome, HtmlRegion, WeatherApp, fetcher_from_config,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use crate::page::PageRenderer;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "cityweather", version, about = "Current weather for a city")]
pub struct Cli {
    /// OpenWeather API key; overrides the configured one.
    #[arg(long, global = true, env = "OPENWEATHER_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Use this config file instead of the platform default.
    #[arg(long, global = true, env = "CITYWEATHER_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Html,
    Text,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the API key and default city.
    Configure,

    /// Show today's weather once.
    Show {
        /// City name; defaults to the configured city.
        city: Option<String>,

        #[arg(long, value_enum, default_value_t = Format::Html)]
        format: Format,
    },

    /// Keep an HTML page updated; each stdin line switches the city.
    Watch {
        /// City shown first; defaults to the configured city.
        #[arg(long)]
        city: Option<String>,

        /// Page the display region is written to.
        #[arg(long, default_value = "cityweather.html")]
        output: PathBuf,

        /// Refresh period in milliseconds.
        #[arg(long, env = "CITYWEATHER_INTERVAL_MS")]
        interval_ms: Option<u64>,

        /// How often the written page reloads itself in the browser, seconds.
        #[arg(long, default_value_t = 30)]
        reload_secs: u64,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<ExitCode> {
        let Cli {
            api_key,
            config: config_path,
            command,
        } = self;

        let mut config = load_config(config_path.as_deref())?;
        if let Some(key) = api_key {
            config.set_api_key(key);
        }

        match command {
            Command::Configure => {
                configure(&mut config)?;
                let path = save_config(&config, config_path)?;
                println!("Configuration saved to {}", path.display());
                Ok(ExitCode::SUCCESS)
            }
            Command::Show { city, format } => show(&config, city.as_deref(), format).await,
            Command::Watch {
                city,
                output,
                interval_ms,
                reload_secs,
            } => {
                if let Some(city) = &city {
                    config.set_default_city(city);
                }
                if let Some(ms) = interval_ms {
                    anyhow::ensure!(ms > 0, "--interval-ms must be greater than zero");
                    config.refresh_interval_ms = ms;
                }
                watch(&config, output, reload_secs).await?;
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

fn save_config(config: &Config, path: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    match path {
        Some(path) => {
            config.save_to(&path)?;
            Ok(path)
        }
        None => config.save(),
    }
}

fn configure(config: &mut Config) -> anyhow::Result<()> {
    let api_key = inquire::Password::new("OpenWeather API key:")
        .without_confirmation()
        .with_display_mode(inquire::PasswordDisplayMode::Masked)
        .prompt()
        .context("Failed to read API key")?;
    anyhow::ensure!(!api_key.trim().is_empty(), "API key must not be empty");
    config.set_api_key(api_key);

    let city = inquire::Text::new("Default city:")
        .with_default(&config.default_city)
        .prompt()
        .context("Failed to read default city")?;
    config.set_default_city(&city);

    Ok(())
}

async fn show(config: &Config, city: Option<&str>, format: Format) -> anyhow::Result<ExitCode> {
    let fetcher = fetcher_from_config(config)?;
    let region = Arc::new(HtmlRegion::new()?);
    let app = WeatherApp::new(fetcher, region.clone(), AppSettings::from_config(config));

    // An explicit city goes through the same checks as a form submission.
    let outcome = match city {
        Some(city) => app.submit(city).await,
        None => app.refresh().await,
    };

    match (format, &outcome) {
        (Format::Html, _) => println!("{}", region.html()),
        (Format::Text, CycleOutcome::Displayed(card)) => {
            print!("{}", region.templates().card_text(card)?);
        }
        (Format::Text, CycleOutcome::Failed(message)) => println!("{message}"),
    }

    Ok(if outcome.is_displayed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn watch(config: &Config, output: PathBuf, reload_secs: u64) -> anyhow::Result<()> {
    let fetcher = fetcher_from_config(config)?;
    let renderer = PageRenderer::new(output, reload_secs)?;
    let app = WeatherApp::new(fetcher, renderer.clone(), AppSettings::from_config(config));

    info!(page = %renderer.path().display(), "Writing weather page");
    app.start().await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            res = tokio::signal::ctrl_c() => {
                if let Err(e) = res {
                    warn!(error = %e, "Failed to listen for Ctrl-C");
                }
                break;
            }
            line = lines.next_line() => {
                match line.context("Failed to read city from stdin")? {
                    Some(input) => {
                        // Submissions are not serialized: a slow lookup does
                        // not hold up the next one.
                        let app = app.clone();
                        tokio::spawn(async move { app.submit(&input).await });
                    }
                    None => {
                        info!("stdin closed; refreshing until Ctrl-C");
                        if let Err(e) = tokio::signal::ctrl_c().await {
                            warn!(error = %e, "Failed to listen for Ctrl-C");
                        }
                        break;
                    }
                }
            }
        }
    }

    app.stop().await;
    info!("Stopped");
    Ok(())
}
