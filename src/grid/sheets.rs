use super::{AppendedRange, GridAccess, ReadOptions, SheetInfo, WorkbookMetadata};
use crate::auth::TokenProvider;
use crate::config::DatabaseConfig;
use crate::error::{Result, SheetbaseError};
use async_trait::async_trait;
use serde_json::Value;
use sheetbase_schema::{
    AddSheetRequest, AppendValuesResponse, BatchGetValuesResponse, BatchUpdateRequest,
    DeleteDimensionRequest, Dimension, DimensionRange, InsertDataOption, MajorDimension, Request,
    SheetPropertiesPatch, Spreadsheet, ValueInputOption, ValueRange,
};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const USER_AGENT: &str = concat!("sheetbase/", env!("CARGO_PKG_VERSION"));

/// Google Sheets v4 REST implementation of [`GridAccess`], bound to a
/// single spreadsheet.
pub struct SheetsClient {
    http: reqwest::Client,
    base: Url,
    spreadsheet_id: String,
    tokens: TokenProvider,
}

impl SheetsClient {
    pub fn new(spreadsheet_id: impl Into<String>, config: &DatabaseConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(15))
            .build()?;

        let base = match &config.endpoint {
            Some(endpoint) => endpoint.clone(),
            None => Url::parse(SHEETS_API_BASE)?,
        };
        let tokens = TokenProvider::from_source(&config.credentials, http.clone())?;

        Ok(Self {
            http,
            base,
            spreadsheet_id: spreadsheet_id.into(),
            tokens,
        })
    }

    /// Build `<base>/<segments..>`. Segments are percent-encoded, so
    /// range expressions may be passed verbatim; Google's RPC-style
    /// `:method` suffixes belong glued to their final segment.
    fn url(&self, suffix: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| SheetbaseError::Unexpected("endpoint URL cannot be a base".into()))?
            .extend(suffix);
        Ok(url)
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let token = self.tokens.access_token().await?;
        let resp = req.bearer_auth(token).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            warn!(%status, "sheets api call failed");
            return Err(SheetbaseError::Upstream { status, message });
        }
        Ok(resp)
    }

    async fn batch_update(&self, request: Request) -> Result<()> {
        let url = self.url(&[&format!("{}:batchUpdate", self.spreadsheet_id)])?;
        let body = BatchUpdateRequest {
            requests: vec![request],
        };
        self.send(self.http.post(url).json(&body)).await?;
        Ok(())
    }
}

#[async_trait]
impl GridAccess for SheetsClient {
    async fn workbook_metadata(&self) -> Result<WorkbookMetadata> {
        let url = self.url(&[&self.spreadsheet_id])?;
        let resp = self
            .send(self.http.get(url).query(&[("includeGridData", "false")]))
            .await?;
        let spreadsheet: Spreadsheet = resp.json().await?;

        Ok(WorkbookMetadata {
            title: spreadsheet.properties.title,
            sheets: spreadsheet
                .sheets
                .into_iter()
                .map(|sheet| SheetInfo {
                    title: sheet.properties.title,
                    sheet_id: sheet.properties.sheet_id,
                })
                .collect(),
        })
    }

    async fn get_range(&self, range: &str, opts: ReadOptions) -> Result<Vec<Vec<Value>>> {
        let url = self.url(&[&self.spreadsheet_id, "values", range])?;
        let resp = self
            .send(self.http.get(url).query(&[
                ("valueRenderOption", opts.render.as_str()),
                ("majorDimension", opts.dimension.as_str()),
            ]))
            .await?;
        let body: ValueRange = resp.json().await?;
        Ok(body.values)
    }

    async fn batch_get_ranges(
        &self,
        ranges: &[String],
        opts: ReadOptions,
    ) -> Result<Vec<Vec<Vec<Value>>>> {
        let url = self.url(&[&self.spreadsheet_id, "values:batchGet"])?;
        let mut query: Vec<(&str, &str)> = vec![
            ("valueRenderOption", opts.render.as_str()),
            ("majorDimension", opts.dimension.as_str()),
        ];
        for range in ranges {
            query.push(("ranges", range));
        }
        let resp = self.send(self.http.get(url).query(&query)).await?;
        let body: BatchGetValuesResponse = resp.json().await?;
        Ok(body.value_ranges.into_iter().map(|vr| vr.values).collect())
    }

    async fn update_range(
        &self,
        range: &str,
        values: Vec<Vec<Value>>,
        input: ValueInputOption,
    ) -> Result<()> {
        let url = self.url(&[&self.spreadsheet_id, "values", range])?;
        let body = ValueRange {
            range: None,
            major_dimension: Some(MajorDimension::Rows),
            values,
        };
        debug!(range, "updating cell range");
        self.send(self.http.put(url).json(&body).query(&[
            ("valueInputOption", input.as_str()),
            ("includeValuesInResponse", "false"),
        ]))
        .await?;
        Ok(())
    }

    async fn append_row(
        &self,
        range: &str,
        row: Vec<Value>,
        input: ValueInputOption,
    ) -> Result<AppendedRange> {
        let url = self.url(&[&self.spreadsheet_id, "values", &format!("{range}:append")])?;
        let body = ValueRange {
            range: None,
            major_dimension: Some(MajorDimension::Rows),
            values: vec![row],
        };
        debug!(range, "appending row");
        let resp = self
            .send(self.http.post(url).json(&body).query(&[
                ("valueInputOption", input.as_str()),
                ("insertDataOption", InsertDataOption::InsertRows.as_str()),
                ("includeValuesInResponse", "false"),
            ]))
            .await?;
        let body: AppendValuesResponse = resp.json().await?;
        let updated_range = body.updates.updated_range.ok_or_else(|| {
            SheetbaseError::Unexpected("append response missing updatedRange".into())
        })?;
        Ok(AppendedRange { updated_range })
    }

    async fn create_sheet(&self, title: &str) -> Result<()> {
        debug!(title, "creating sheet");
        self.batch_update(Request::AddSheet(AddSheetRequest {
            properties: SheetPropertiesPatch {
                title: Some(title.to_string()),
                sheet_id: None,
            },
        }))
        .await
    }

    async fn delete_rows(&self, sheet_id: i64, start_index: i64, end_index: i64) -> Result<()> {
        debug!(sheet_id, start_index, end_index, "deleting rows");
        self.batch_update(Request::DeleteDimension(DeleteDimensionRequest {
            range: DimensionRange {
                sheet_id,
                dimension: Dimension::Rows,
                start_index,
                end_index,
            },
        }))
        .await
    }
}
