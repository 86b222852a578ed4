use crate::error::Result;
use crate::grid::SharedGrid;
use crate::range::{CellRef, SheetRange};
use crate::store::resolve_sheet_id;
use serde_json::Value;
use sheetbase_schema::ValueInputOption;
use std::sync::Arc;

/// What a [`Row`] needs to reach back into its table's sheet; shared by
/// every row a single table operation materializes.
pub(crate) struct RowContext {
    pub(crate) grid: SharedGrid,
    pub(crate) sheet: String,
    pub(crate) fields: Arc<Vec<String>>,
    pub(crate) value_input: ValueInputOption,
}

impl std::fmt::Debug for RowContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RowContext")
            .field("sheet", &self.sheet)
            .field("fields", &self.fields)
            .field("value_input", &self.value_input)
            .finish_non_exhaustive()
    }
}

/// A detached snapshot of one table record: field values in the table's
/// field order, plus the 1-based physical row it occupied when fetched.
///
/// The row number is a best-effort position hint, not a stable identity.
/// Structural changes elsewhere in the sheet (row deletions above this
/// row, in particular) silently invalidate it, and `update`/`delete` will
/// then act on whatever currently sits at that position.
#[derive(Debug, Clone)]
pub struct Row {
    ctx: Arc<RowContext>,
    row_number: u32,
    values: Vec<Value>,
}

impl Row {
    pub(crate) fn new(ctx: Arc<RowContext>, row_number: u32, mut values: Vec<Value>) -> Self {
        // Ragged reads come back shorter than the field list; absent
        // trailing cells are missing values.
        values.resize(ctx.fields.len(), Value::Null);
        Self {
            ctx,
            row_number,
            values,
        }
    }

    /// 1-based physical row within the table's sheet, at fetch time.
    pub fn row_number(&self) -> u32 {
        self.row_number
    }

    pub fn fields(&self) -> &[String] {
        &self.ctx.fields
    }

    /// Value of `field`, or `None` when the field is unknown to the table
    /// or the cell is empty.
    pub fn get(&self, field: &str) -> Option<&Value> {
        let index = self.ctx.fields.iter().position(|f| f == field)?;
        match &self.values[index] {
            Value::Null => None,
            value => Some(value),
        }
    }

    /// (field, value) pairs in the table's field order, empty cells
    /// included as `Null`.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.ctx
            .fields
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    /// Merge `partial` over this row's values, write the full
    /// field-ordered row back to the recorded position, and return a new
    /// `Row` with the merged data. `self` is left untouched; fields not
    /// named in `partial` keep their current value, and entries for
    /// fields the table does not have are ignored.
    pub async fn update(&self, partial: &[(&str, Value)]) -> Result<Row> {
        let merged: Vec<Value> = self
            .ctx
            .fields
            .iter()
            .enumerate()
            .map(|(i, field)| {
                partial
                    .iter()
                    .find(|(name, _)| name == field)
                    .map_or_else(|| self.values[i].clone(), |(_, value)| value.clone())
            })
            .collect();

        let field_count = u32::try_from(self.ctx.fields.len()).unwrap_or(u32::MAX);
        let range = SheetRange::cells(
            CellRef::at(self.row_number, 1),
            CellRef::at(self.row_number, field_count),
        )
        .in_sheet(&self.ctx.sheet);

        self.ctx
            .grid
            .update_range(&range, vec![merged.clone()], self.ctx.value_input)
            .await?;

        Ok(Row {
            ctx: Arc::clone(&self.ctx),
            row_number: self.row_number,
            values: merged,
        })
    }

    /// Remove the recorded physical row from the sheet. Rows at or below
    /// this position held by other `Row` instances become stale.
    pub async fn delete(&self) -> Result<()> {
        let sheet_id = resolve_sheet_id(&self.ctx.grid, &self.ctx.sheet).await?;
        let start = i64::from(self.row_number) - 1;
        self.ctx
            .grid
            .delete_rows(sheet_id, start, i64::from(self.row_number))
            .await
    }
}
