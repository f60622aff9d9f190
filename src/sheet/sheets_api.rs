//! Google Sheets v4 REST backend.
//!
//! Authentication is delegated to a [`TokenProvider`]; obtaining and refreshing
//! OAuth tokens is the caller's concern.

use super::{a1, AppendedRange, CellRef, Grid, RowRange, TableBackend, TextStyle, ValueInput, ValueRender};
use crate::config::SheetsApiConfig;
use crate::error::{LedgerError, LedgerResult};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn access_token(&self) -> LedgerResult<String>;
}

/// A bearer token supplied up front.
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl TokenProvider for StaticToken {
    async fn access_token(&self) -> LedgerResult<String> {
        Ok(self.0.clone())
    }
}

#[derive(Deserialize, Debug, Default)]
struct ValueRangeBody {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct AppendBody {
    updates: Option<AppendUpdates>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct AppendUpdates {
    updated_range: Option<String>,
}

fn cell_to_string(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        Value::Bool(true) => "TRUE".to_string(),
        Value::Bool(false) => "FALSE".to_string(),
        other => other.to_string(),
    }
}

#[derive(Clone)]
pub struct SheetsApiTable {
    client: Client,
    endpoint: Url,
    spreadsheet_id: String,
    sheet: String,
    sheet_id: i64,
    tokens: Arc<dyn TokenProvider>,
}

impl SheetsApiTable {
    pub fn new(
        config: &SheetsApiConfig,
        sheet: &str,
        sheet_id: i64,
        tokens: Arc<dyn TokenProvider>,
    ) -> LedgerResult<Self> {
        let endpoint = Url::parse(&config.endpoint).map_err(|e| {
            LedgerError::Config(format!("invalid endpoint '{}': {}", config.endpoint, e))
        })?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LedgerError::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            endpoint,
            spreadsheet_id: config.spreadsheet_id.clone(),
            sheet: sheet.to_string(),
            sheet_id,
            tokens,
        })
    }

    fn url(&self, tail: &[&str]) -> LedgerResult<Url> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| LedgerError::Config("endpoint cannot be a base URL".to_string()))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets"])
            .extend(tail);
        Ok(url)
    }

    async fn check(response: Response) -> LedgerResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let snippet: String = body.chars().take(300).collect();
        Err(LedgerError::Transport(format!(
            "sheets API returned {}: {}",
            status, snippet
        )))
    }
}

#[async_trait]
impl TableBackend for SheetsApiTable {
    fn sheet_name(&self) -> &str {
        &self.sheet
    }

    async fn read_rows(&self, range: RowRange, render: ValueRender) -> LedgerResult<Grid> {
        let a1_range = a1::row_range(&self.sheet, range);
        let url = self.url(&[&self.spreadsheet_id, "values", &a1_range])?;
        let token = self.tokens.access_token().await?;
        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .query(&[
                ("majorDimension", "ROWS"),
                ("valueRenderOption", render.as_api_str()),
                ("dateTimeRenderOption", "FORMATTED_STRING"),
            ])
            .send()
            .await?;
        let body: ValueRangeBody = Self::check(response).await?.json().await?;
        Ok(body
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect())
    }

    async fn write_rows(
        &self,
        range: RowRange,
        rows: &Grid,
        input: ValueInput,
    ) -> LedgerResult<()> {
        let a1_range = a1::row_range(&self.sheet, range);
        let url = self.url(&[&self.spreadsheet_id, "values", &a1_range])?;
        let token = self.tokens.access_token().await?;
        let response = self
            .client
            .put(url)
            .bearer_auth(token)
            .query(&[("valueInputOption", input.as_api_str())])
            .json(&json!({
                "range": a1_range,
                "majorDimension": "ROWS",
                "values": rows,
            }))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn append_row(
        &self,
        values: &[String],
        input: ValueInput,
    ) -> LedgerResult<AppendedRange> {
        let target = format!("{}:append", a1::quote_sheet(&self.sheet));
        let url = self.url(&[&self.spreadsheet_id, "values", &target])?;
        let token = self.tokens.access_token().await?;
        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .query(&[
                ("valueInputOption", input.as_api_str()),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .json(&json!({
                "majorDimension": "ROWS",
                "values": [values],
            }))
            .send()
            .await?;
        let body: AppendBody = Self::check(response).await?.json().await?;
        let updated = body
            .updates
            .and_then(|u| u.updated_range)
            .ok_or_else(|| {
                LedgerError::Transport("append response carried no updated range".to_string())
            })?;
        a1::parse_appended_range(&updated)
    }

    async fn format_cell(&self, cell: CellRef, style: &TextStyle) -> LedgerResult<()> {
        let target = format!("{}:batchUpdate", self.spreadsheet_id);
        let url = self.url(&[&target])?;
        let token = self.tokens.access_token().await?;
        let request = json!({
            "requests": [{
                "repeatCell": {
                    "range": {
                        "sheetId": self.sheet_id,
                        "startRowIndex": cell.row.saturating_sub(1),
                        "endRowIndex": cell.row,
                        "startColumnIndex": cell.column,
                        "endColumnIndex": cell.column + 1,
                    },
                    "cell": {
                        "userEnteredFormat": {
                            "textFormat": {
                                "foregroundColor": style.foreground,
                                "underline": style.underline,
                            }
                        }
                    },
                    "fields": "userEnteredFormat.textFormat(foregroundColor,underline)",
                }
            }]
        });
        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(&request)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}
