use crate::models::RecentEntry;
use crate::notify::traits::Notifier;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Url};
use std::time::Duration;
use tracing::{debug, warn};

/// Telegram Bot API notifier
pub struct TelegramNotifier {
    client: Client,
    api_base: Url,
    token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(api_base: Url, token: String, chat_id: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_base,
            token,
            chat_id,
        })
    }

    fn endpoint(&self, method: &str) -> Result<Url> {
        self.api_base
            .join(&format!("/bot{}/{}", self.token, method))
            .context("Invalid Telegram API URL")
    }

    async fn dispatch(&self, entry: &RecentEntry) -> Result<()> {
        let text = format_message(entry);
        let request = match &entry.item.photo_url {
            Some(photo) => self.client.get(self.endpoint("sendPhoto")?).query(&[
                ("chat_id", self.chat_id.as_str()),
                ("photo", photo.as_str()),
                ("caption", text.as_str()),
            ]),
            None => self
                .client
                .get(self.endpoint("sendMessage")?)
                .query(&[("chat_id", self.chat_id.as_str()), ("text", text.as_str())]),
        };

        // Request URLs carry the bot token; keep them out of the logs.
        let response = request
            .send()
            .await
            .map_err(|err| err.without_url())
            .context("Telegram request failed")?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Telegram returned {}: {}", status, body);
        }
        debug!("Telegram accepted alert for item {}", entry.item.id);
        Ok(())
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, entry: &RecentEntry) {
        if let Err(err) = self.dispatch(entry).await {
            warn!("Telegram send error: {:#}", err);
        }
    }
}

/// Alert text, also used as the photo caption
pub fn format_message(entry: &RecentEntry) -> String {
    let item = &entry.item;
    format!(
        "🔥 NUOVA OFFERTA!\n\
         {} - {}\n\
         💶 Prezzo: {}€\n\
         📌 {}\n\
         🎽 Taglia: {}\n\
         🔧 Condizione: {}\n\
         🕒 Trovato il: {}\n\
         🔗 {}",
        item.brand,
        item.category,
        item.price_text,
        item.title,
        item.sizes,
        item.condition,
        item.found_at_text(),
        item.link,
    )
}
