use anyhow::{bail, Context, Result};
use clap::Parser;
use reqwest::Url;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "vinted-scout",
    about = "Polls Vinted searches and sends new listings to Telegram"
)]
pub struct Config {
    /// Telegram bot token.
    #[arg(long, env = "BOT_TOKEN", hide_env_values = true)]
    pub bot_token: String,

    /// Telegram chat receiving the alerts.
    #[arg(long, env = "CHAT_ID")]
    pub chat_id: String,

    /// Host the status server binds to.
    #[arg(long, env = "BIND_HOST", default_value = "0.0.0.0")]
    pub bind_host: String,

    /// Port the status server listens on.
    #[arg(long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    /// Append-only log of notified fingerprints.
    #[arg(long, env = "SEEN_FILE", default_value = "seen_items.txt")]
    pub seen_file: PathBuf,

    /// Seconds to sleep after each pass over the searches.
    #[arg(long, env = "POLL_INTERVAL_SECS", default_value_t = 15)]
    pub poll_interval_secs: u64,

    /// Seconds before a catalog request times out.
    #[arg(long, env = "FETCH_TIMEOUT_SECS", default_value_t = 20)]
    pub fetch_timeout_secs: u64,

    /// Seconds before a Telegram or Sheets request times out.
    #[arg(long, env = "NOTIFY_TIMEOUT_SECS", default_value_t = 15)]
    pub notify_timeout_secs: u64,

    /// Marketplace origin used for searches and item links.
    #[arg(long, env = "MARKETPLACE_URL", default_value = "https://www.vinted.it")]
    pub marketplace_url: Url,

    /// Telegram Bot API origin.
    #[arg(long, env = "TELEGRAM_API_URL", default_value = "https://api.telegram.org")]
    pub telegram_api_url: Url,

    /// OAuth access token for the Google Sheets API.
    #[arg(long, env = "GOOGLE_ACCESS_TOKEN", hide_env_values = true)]
    pub google_access_token: Option<String>,

    /// Spreadsheet receiving one row per found listing.
    #[arg(long, env = "SHEET_ID")]
    pub sheet_id: Option<String>,

    /// Google Sheets API origin.
    #[arg(long, env = "SHEETS_API_URL", default_value = "https://sheets.googleapis.com")]
    pub sheets_api_url: Url,
}

/// Credentials for the optional spreadsheet sink
#[derive(Debug, Clone)]
pub struct SheetsConfig {
    pub access_token: String,
    pub spreadsheet_id: String,
}

impl Config {
    /// Reject blank required settings that clap lets through
    pub fn validate(&self) -> Result<()> {
        if self.bot_token.trim().is_empty() || self.chat_id.trim().is_empty() {
            bail!("Missing BOT_TOKEN or CHAT_ID; set them before starting.");
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.bind_host, self.port)
            .parse()
            .with_context(|| format!("invalid bind address {}:{}", self.bind_host, self.port))
    }

    /// Spreadsheet settings when both token and id are present
    pub fn sheets(&self) -> Option<SheetsConfig> {
        let token = self.google_access_token.as_deref().map(str::trim).filter(|t| !t.is_empty())?;
        let id = self.sheet_id.as_deref().map(str::trim).filter(|id| !id.is_empty())?;
        Some(SheetsConfig {
            access_token: token.to_string(),
            spreadsheet_id: id.to_string(),
        })
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs.max(1))
    }

    pub fn notify_timeout(&self) -> Duration {
        Duration::from_secs(self.notify_timeout_secs.max(1))
    }
}
