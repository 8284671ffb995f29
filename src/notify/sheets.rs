use crate::models::RecentEntry;
use crate::notify::traits::RowSink;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info};

/// Worksheet receiving one row per found listing
pub const FOUND_WORKSHEET: &str = "Trovati";

/// Worksheets kept for the manual bought/resold bookkeeping
const WORKSHEETS: &[&str] = &[FOUND_WORKSHEET, "Comprati", "Rivenduti"];

const NEW_WORKSHEET_ROWS: u32 = 1000;
const NEW_WORKSHEET_COLUMNS: u32 = 20;

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Debug, Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
}

/// Google Sheets v4 sink appending to the `Trovati` worksheet
pub struct GoogleSheetsSink {
    client: Client,
    api_base: Url,
    access_token: String,
    spreadsheet_id: String,
}

impl GoogleSheetsSink {
    /// Connect to a spreadsheet and create any missing worksheet
    pub async fn connect(
        api_base: Url,
        access_token: String,
        spreadsheet_id: String,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;
        let sink = Self {
            client,
            api_base,
            access_token,
            spreadsheet_id,
        };
        sink.ensure_worksheets().await?;
        info!("Google Sheets connected.");
        Ok(sink)
    }

    fn spreadsheet_url(&self, suffix: &str) -> Result<Url> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("Sheets API URL cannot be a base: {}", self.api_base))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets"])
            .push(&format!("{}{}", self.spreadsheet_id, suffix));
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.bearer_auth(&self.access_token)
    }

    async fn ensure_worksheets(&self) -> Result<()> {
        let mut url = self.spreadsheet_url("")?;
        url.query_pairs_mut().append_pair("fields", "sheets.properties.title");
        let meta: SpreadsheetMeta = self
            .authorized(self.client.get(url))
            .send()
            .await
            .context("Failed to read spreadsheet metadata")?
            .error_for_status()
            .context("Spreadsheet metadata request rejected")?
            .json()
            .await
            .context("Failed to parse spreadsheet metadata")?;

        let missing = missing_worksheets(&meta);
        if missing.is_empty() {
            return Ok(());
        }

        let requests: Vec<_> = missing
            .iter()
            .map(|title| {
                json!({
                    "addSheet": {
                        "properties": {
                            "title": title,
                            "gridProperties": {
                                "rowCount": NEW_WORKSHEET_ROWS,
                                "columnCount": NEW_WORKSHEET_COLUMNS,
                            }
                        }
                    }
                })
            })
            .collect();
        self.authorized(self.client.post(self.spreadsheet_url(":batchUpdate")?))
            .json(&json!({ "requests": requests }))
            .send()
            .await
            .context("Failed to create worksheets")?
            .error_for_status()
            .context("Worksheet creation rejected")?;
        info!("Created worksheets: {}", missing.join(", "));
        Ok(())
    }
}

#[async_trait]
impl RowSink for GoogleSheetsSink {
    async fn append(&self, entry: &RecentEntry) -> Result<()> {
        let mut url = self.spreadsheet_url("")?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("Sheets API URL cannot be a base: {}", self.api_base))?
            .push("values")
            .push(&format!("{}!A1:append", FOUND_WORKSHEET));
        url.query_pairs_mut()
            .append_pair("valueInputOption", "RAW")
            .append_pair("insertDataOption", "INSERT_ROWS");

        self.authorized(self.client.post(url))
            .json(&json!({ "values": [sheet_row(entry)] }))
            .send()
            .await
            .context("Sheets append request failed")?
            .error_for_status()
            .context("Sheets append rejected")?;
        debug!("Appended item {} to {}", entry.item.id, FOUND_WORKSHEET);
        Ok(())
    }

    fn sink_name(&self) -> &'static str {
        "Google Sheets"
    }
}

fn missing_worksheets(meta: &SpreadsheetMeta) -> Vec<&'static str> {
    WORKSHEETS
        .iter()
        .copied()
        .filter(|name| !meta.sheets.iter().any(|sheet| sheet.properties.title == *name))
        .collect()
}

/// Row layout: id, brand, category, price, title, sizes, condition, link, timestamp, state
pub fn sheet_row(entry: &RecentEntry) -> [String; 10] {
    let item = &entry.item;
    [
        item.id.clone(),
        item.brand.clone(),
        item.category.clone(),
        item.price_text.clone(),
        item.title.clone(),
        item.sizes.clone(),
        item.condition.clone(),
        item.link.clone(),
        item.found_at_text(),
        entry.state.as_str().to_string(),
    ]
}
