//! Runtime configuration: command-line flags plus environment variables
//! (optionally loaded from a dotenv file).

use clap::Parser;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::commands::music::utils::queue_manager::QueueSettings;

#[derive(Parser, Debug)]
#[command(version, about = "A Discord bot that plays music from a per-guild queue")]
pub struct Cli {
    /// Sets the env file to load configuration from
    #[arg(short, long = "config", default_value = ".env")]
    pub config: PathBuf,

    /// Run with the development token and maintenance presence
    #[arg(short, long = "dev")]
    pub dev: bool,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing {0}")]
    MissingVar(&'static str),

    #[error("Invalid duration in {key}: {source}")]
    InvalidDuration {
        key: &'static str,
        source: humantime::DurationError,
    },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub token: String,
    pub development: bool,
    pub log_file: PathBuf,
    pub prefix: String,
    pub idle_sweep_interval: Duration,
    pub queue: QueueSettings,
}

impl Config {
    /// Load the dotenv file named on the command line, then read the environment.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        // A missing env file is fine; variables may come from the process environment.
        dotenv::from_path(&cli.config).ok();
        Self::from_lookup(cli.dev, |key| env::var(key).ok())
    }

    /// Build a config from any key/value source.
    pub fn from_lookup(
        development: bool,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let token_var = if development {
            "DISCORD_DEV_TOKEN"
        } else {
            "DISCORD_TOKEN"
        };
        let token = lookup(token_var)
            .filter(|token| !token.trim().is_empty())
            .ok_or(ConfigError::MissingVar(token_var))?;

        // tokio intervals panic on a zero period.
        let duration = |key: &'static str, default: Duration| match lookup(key) {
            Some(value) => match humantime::parse_duration(value.trim()) {
                Ok(parsed) if parsed.is_zero() => Err(ConfigError::InvalidValue { key, value }),
                Ok(parsed) => Ok(parsed),
                Err(source) => Err(ConfigError::InvalidDuration { key, source }),
            },
            None => Ok(default),
        };

        let defaults = QueueSettings::default();
        let default_volume = match lookup("DEFAULT_VOLUME") {
            Some(value) => value
                .trim()
                .parse::<u8>()
                .ok()
                .filter(|volume| *volume <= 100)
                .ok_or(ConfigError::InvalidValue {
                    key: "DEFAULT_VOLUME",
                    value,
                })?,
            None => defaults.default_volume,
        };

        Ok(Self {
            token,
            development,
            log_file: lookup("LOG_FILE")
                .unwrap_or_else(|| "logs.log".to_string())
                .into(),
            prefix: lookup("COMMAND_PREFIX").unwrap_or_else(|| "~".to_string()),
            idle_sweep_interval: duration("IDLE_SWEEP_INTERVAL", Duration::from_secs(60))?,
            queue: QueueSettings {
                poll_interval: duration("PLAYBACK_POLL_INTERVAL", defaults.poll_interval)?,
                idle_timeout: duration("IDLE_TIMEOUT", defaults.idle_timeout)?,
                default_volume,
            },
        })
    }
}
