//! The grid-access seam: everything above this module addresses cells
//! through [`GridAccess`], never through the wire client directly, so the
//! whole store layer can run against any rectangular-grid backend.

mod sheets;

pub use sheets::SheetsClient;

use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use sheetbase_schema::{MajorDimension, ValueInputOption, ValueRenderOption};
use std::sync::Arc;

/// Workbook-level metadata: the document title and the named sheets it
/// contains, in workbook order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkbookMetadata {
    pub title: String,
    pub sheets: Vec<SheetInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetInfo {
    pub title: String,
    pub sheet_id: i64,
}

/// Render and orientation options for a read.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadOptions {
    pub render: ValueRenderOption,
    pub dimension: MajorDimension,
}

impl ReadOptions {
    pub fn unformatted_columns() -> Self {
        Self {
            render: ValueRenderOption::UnformattedValue,
            dimension: MajorDimension::Columns,
        }
    }

    pub fn unformatted_rows() -> Self {
        Self {
            render: ValueRenderOption::UnformattedValue,
            dimension: MajorDimension::Rows,
        }
    }

    pub fn columns() -> Self {
        Self {
            dimension: MajorDimension::Columns,
            ..Self::default()
        }
    }
}

/// Where an appended row actually landed, as reported by the service.
#[derive(Debug, Clone)]
pub struct AppendedRange {
    pub updated_range: String,
}

/// Read/write capability over one workbook's rectangular grids. Range
/// arguments are fully qualified expressions produced by
/// [`SheetRange::in_sheet`](crate::range::SheetRange::in_sheet).
#[async_trait]
pub trait GridAccess: Send + Sync {
    /// Workbook title and sheet listing.
    async fn workbook_metadata(&self) -> Result<WorkbookMetadata>;

    /// Read one range. An entirely empty range yields an empty grid.
    async fn get_range(&self, range: &str, opts: ReadOptions) -> Result<Vec<Vec<Value>>>;

    /// Read several ranges in one round trip, preserving request order.
    async fn batch_get_ranges(
        &self,
        ranges: &[String],
        opts: ReadOptions,
    ) -> Result<Vec<Vec<Vec<Value>>>>;

    /// Overwrite cells starting at the range's top-left corner.
    async fn update_range(
        &self,
        range: &str,
        values: Vec<Vec<Value>>,
        input: ValueInputOption,
    ) -> Result<()>;

    /// Append one row below the used region of `range`, reporting where
    /// the service placed it.
    async fn append_row(
        &self,
        range: &str,
        row: Vec<Value>,
        input: ValueInputOption,
    ) -> Result<AppendedRange>;

    /// Add a new, empty sheet to the workbook.
    async fn create_sheet(&self, title: &str) -> Result<()>;

    /// Delete rows `[start_index, end_index)` (0-based) from the sheet
    /// with the given stable id, shifting later rows up.
    async fn delete_rows(&self, sheet_id: i64, start_index: i64, end_index: i64) -> Result<()>;
}

pub type SharedGrid = Arc<dyn GridAccess>;
