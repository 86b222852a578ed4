use serde::{Deserialize, Serialize};

/// Sheets v4 `spreadsheets.batchUpdate` request types, restricted to the
/// structural operations the client issues (sheet creation, row deletion).

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct BatchUpdateRequest {
    pub requests: Vec<Request>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Request {
    AddSheet(AddSheetRequest),
    DeleteDimension(DeleteDimensionRequest),
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct AddSheetRequest {
    pub properties: SheetPropertiesPatch,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SheetPropertiesPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheet_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct DeleteDimensionRequest {
    pub range: DimensionRange,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DimensionRange {
    pub sheet_id: i64,

    pub dimension: Dimension,

    /// 0-based, inclusive.
    pub start_index: i64,

    /// 0-based, exclusive.
    pub end_index: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Dimension {
    #[default]
    Rows,
    Columns,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct BatchUpdateResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spreadsheet_id: Option<String>,
}
