use chrono_tz::Tz;
use clap::Parser;
use engine::Currency;
use serde::Deserialize;

use crate::error::{AppError, Result};

const DEFAULT_CONFIG_PATH: &str = "config/payme.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub username: String,
    /// ISO code, one of EUR, USD, GBP.
    pub currency: String,
    pub timezone: String,
    pub export_path: String,
    pub pdf_dir: String,
    pub log_file: String,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3000/api/".to_string(),
            username: String::new(),
            currency: "EUR".to_string(),
            timezone: "Europe/Rome".to_string(),
            export_path: "payme-export.json".to_string(),
            pdf_dir: ".".to_string(),
            log_file: "payme_tui.log".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    pub fn currency(&self) -> Result<Currency> {
        Ok(Currency::try_from(self.currency.as_str())?)
    }

    pub fn timezone(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| AppError::Timezone(self.timezone.clone()))
    }
}

#[derive(Debug, Parser)]
#[command(name = "payme_tui", disable_version_flag = true)]
struct Args {
    /// Optional config file path (TOML).
    #[arg(long)]
    config: Option<String>,
    /// Override base URL (e.g. http://127.0.0.1:3000/api/).
    #[arg(long)]
    base_url: Option<String>,
    /// Override username (password is never read from CLI).
    #[arg(long)]
    username: Option<String>,
    /// Override display currency (EUR, USD, GBP).
    #[arg(long)]
    currency: Option<String>,
    /// Override timezone (IANA name).
    #[arg(long)]
    timezone: Option<String>,
}

pub fn load() -> Result<AppConfig> {
    load_from(Args::parse())
}

fn load_from(args: Args) -> Result<AppConfig> {
    let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(config::Environment::with_prefix("PAYME_TUI"));
    let mut settings: AppConfig = builder.build()?.try_deserialize()?;

    if let Some(base_url) = args.base_url {
        settings.base_url = base_url;
    }
    if let Some(username) = args.username {
        settings.username = username;
    }
    if let Some(currency) = args.currency {
        settings.currency = currency;
    }
    if let Some(timezone) = args.timezone {
        settings.timezone = timezone;
    }

    // Validate early so a typo fails at startup, not on first render.
    settings.currency()?;
    settings.timezone()?;

    Ok(settings)
}
