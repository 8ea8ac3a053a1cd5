//! Fetch spreadsheet rows through the Google Sheets v4 API

use std::time::Duration;

use anyhow::{Context, Result, bail};
use log::info;
use serde::Deserialize;
use serde_json::Value;

use super::auth::{SHEETS_READONLY_SCOPE, ServiceAccountKey, fetch_access_token};
use super::rows::{SheetRow, rows_from_values};
use crate::config::SheetsConfig;

const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

/// URL of the values endpoint for a spreadsheet range
pub fn values_url(spreadsheet_id: &str, range: &str) -> String {
    format!(
        "{}/{}/values/{}",
        SHEETS_API_BASE,
        urlencoding::encode(spreadsheet_id),
        urlencoding::encode(range)
    )
}

/// Read the configured range and key each data row by the header row
pub async fn fetch_sheet_rows(config: &SheetsConfig) -> Result<Vec<SheetRow>> {
    let key = ServiceAccountKey::from_file(&config.service_account_json)?;

    let http = reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .context("Failed to create HTTP client")?;

    let token = fetch_access_token(&http, &key, SHEETS_READONLY_SCOPE).await?;

    let url = values_url(&config.spreadsheet_id, &config.range);
    let response = http
        .get(&url)
        .bearer_auth(token)
        .send()
        .await
        .with_context(|| format!("Failed to fetch sheet range '{}'", config.range))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        bail!(
            "Google Sheets returned HTTP {} for range '{}': {}",
            status.as_u16(),
            config.range,
            body
        );
    }

    let range: ValueRange = response
        .json()
        .await
        .context("Invalid Google Sheets values response")?;

    info!(
        "Fetched {} raw rows from range '{}'",
        range.values.len(),
        config.range
    );

    Ok(rows_from_values(&range.values))
}
