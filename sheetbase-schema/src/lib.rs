pub mod batch_update;
pub mod spreadsheet;
pub mod values;

pub use batch_update::{
    AddSheetRequest, BatchUpdateRequest, BatchUpdateResponse, DeleteDimensionRequest, Dimension,
    DimensionRange, Request, SheetPropertiesPatch,
};
pub use spreadsheet::{Sheet, SheetProperties, Spreadsheet, SpreadsheetProperties};
pub use values::{
    AppendValuesResponse, BatchGetValuesResponse, InsertDataOption, MajorDimension,
    UpdateValuesResponse, ValueInputOption, ValueRange, ValueRenderOption,
};
