use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Sheets v4 `spreadsheets.values.*` request/response types.

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub major_dimension: Option<MajorDimension>,

    /// Row- or column-major grid of cells. Absent entirely when the
    /// requested range is empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<Vec<Value>>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct BatchGetValuesResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spreadsheet_id: Option<String>,

    #[serde(default)]
    pub value_ranges: Vec<ValueRange>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateValuesResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spreadsheet_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_range: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_rows: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_columns: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_cells: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AppendValuesResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spreadsheet_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_range: Option<String>,

    #[serde(default)]
    pub updates: UpdateValuesResponse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MajorDimension {
    #[default]
    Rows,
    Columns,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueRenderOption {
    #[default]
    FormattedValue,
    UnformattedValue,
    Formula,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueInputOption {
    /// Values are parsed as if typed into a cell (numbers, dates,
    /// formulas are interpreted).
    #[default]
    UserEntered,
    /// Values are stored as-is without parsing.
    Raw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InsertDataOption {
    #[default]
    InsertRows,
    Overwrite,
}

impl MajorDimension {
    pub fn as_str(self) -> &'static str {
        match self {
            MajorDimension::Rows => "ROWS",
            MajorDimension::Columns => "COLUMNS",
        }
    }
}

impl ValueRenderOption {
    pub fn as_str(self) -> &'static str {
        match self {
            ValueRenderOption::FormattedValue => "FORMATTED_VALUE",
            ValueRenderOption::UnformattedValue => "UNFORMATTED_VALUE",
            ValueRenderOption::Formula => "FORMULA",
        }
    }
}

impl ValueInputOption {
    pub fn as_str(self) -> &'static str {
        match self {
            ValueInputOption::UserEntered => "USER_ENTERED",
            ValueInputOption::Raw => "RAW",
        }
    }
}

impl InsertDataOption {
    pub fn as_str(self) -> &'static str {
        match self {
            InsertDataOption::InsertRows => "INSERT_ROWS",
            InsertDataOption::Overwrite => "OVERWRITE",
        }
    }
}
