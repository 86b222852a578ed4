use crate::error::{Result, SheetbaseError};
use crate::filter::{FilterOp, QueryFilter};
use crate::grid::{ReadOptions, SharedGrid};
use crate::range::{parse_appended_row, CellRef, SheetRange};
use crate::row::{Row, RowContext};
use crate::store::{check_prefix, Store, StoreKind};
use async_trait::async_trait;
use serde_json::Value;
use sheetbase_schema::ValueInputOption;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// An N-column sheet with a header row of field names. The field list is
/// loaded (or written) exactly once at initialization and is immutable
/// for the table's lifetime.
pub struct Table {
    name: String,
    grid: SharedGrid,
    value_input: ValueInputOption,
    fields: Option<Arc<Vec<String>>>,
    explicit_fields: bool,
}

impl Table {
    /// A table discovered in the workbook; its header row is adopted at
    /// initialization.
    pub(crate) fn discovered(
        grid: SharedGrid,
        name: impl Into<String>,
        value_input: ValueInputOption,
    ) -> Result<Self> {
        let name = name.into();
        check_prefix(&name, StoreKind::Table)?;
        Ok(Self {
            name,
            grid,
            value_input,
            fields: None,
            explicit_fields: false,
        })
    }

    /// A freshly created table; initialization writes `fields` as the
    /// header row.
    pub(crate) fn with_fields(
        grid: SharedGrid,
        name: impl Into<String>,
        fields: Vec<String>,
        value_input: ValueInputOption,
    ) -> Result<Self> {
        let name = name.into();
        check_prefix(&name, StoreKind::Table)?;
        Ok(Self {
            name,
            grid,
            value_input,
            fields: Some(Arc::new(fields)),
            explicit_fields: true,
        })
    }

    /// Ordered field names from the header row. Empty until the table is
    /// initialized.
    pub fn fields(&self) -> &[String] {
        self.fields.as_ref().map_or(&[], |fields| fields.as_slice())
    }

    fn loaded_fields(&self) -> Result<&Arc<Vec<String>>> {
        self.fields.as_ref().ok_or_else(|| {
            SheetbaseError::UnsupportedOperation(format!(
                "table {} used before initialization",
                self.name
            ))
        })
    }

    fn row_context(&self) -> Result<Arc<RowContext>> {
        Ok(Arc::new(RowContext {
            grid: Arc::clone(&self.grid),
            sheet: self.name.clone(),
            fields: Arc::clone(self.loaded_fields()?),
            value_input: self.value_input,
        }))
    }

    /// Resolve each filter's field to a 0-based column index, erroring on
    /// the first field the header does not contain. Duplicate fields
    /// resolve once, keeping first-mention order.
    fn search_columns<'a>(
        &self,
        filters: &'a [QueryFilter],
        fields: &[String],
    ) -> Result<Vec<(&'a str, usize)>> {
        let mut seen: Vec<(&str, usize)> = Vec::new();
        for filter in filters {
            if seen.iter().any(|(name, _)| *name == filter.field) {
                continue;
            }
            let index = fields
                .iter()
                .position(|field| *field == filter.field)
                .ok_or_else(|| SheetbaseError::FieldNotFound(filter.field.clone()))?;
            seen.push((filter.field.as_str(), index));
        }
        Ok(seen)
    }

    /// Query the table with a non-empty conjunction of filters.
    ///
    /// Two round trips: the referenced columns are scanned in one batch
    /// read (from row 2, below the header), the candidate row set is
    /// reduced filter by filter in sequence, and only the surviving rows
    /// are fetched in full. There is no isolation between the two reads;
    /// writers racing this call can skew the result.
    pub async fn query_rows(&self, filters: &[QueryFilter]) -> Result<Vec<Row>> {
        if filters.is_empty() {
            return Err(SheetbaseError::InvalidArgument(
                "must provide at least one filter when querying".into(),
            ));
        }

        let fields = Arc::clone(self.loaded_fields()?);
        let search_columns = self.search_columns(filters, &fields)?;

        // Round trip 1: full scan of each referenced column.
        let column_ranges: Vec<String> = search_columns
            .iter()
            .map(|(_, index)| {
                let col = u32::try_from(index + 1).unwrap_or(u32::MAX);
                SheetRange::cells(CellRef::at(2, col), CellRef::col(col)).in_sheet(&self.name)
            })
            .collect();
        let column_grids = self
            .grid
            .batch_get_ranges(&column_ranges, ReadOptions::unformatted_columns())
            .await?;

        let field_data: HashMap<&str, Vec<Value>> = search_columns
            .iter()
            .zip(column_grids)
            .map(|((field, _), mut grid)| {
                let column = if grid.is_empty() {
                    Vec::new()
                } else {
                    grid.swap_remove(0)
                };
                (*field, column)
            })
            .collect();

        // Left-fold reduction: each filter prunes the survivors of the
        // previous one, in caller order. Candidates are seeded from the
        // first referenced column's length, so shorter columns simply
        // contribute missing values.
        let seed_len = field_data
            .get(search_columns[0].0)
            .map_or(0, Vec::len);
        let mut candidates: Vec<usize> = (0..seed_len).collect();
        for filter in filters {
            let column = field_data.get(filter.field.as_str()).ok_or_else(|| {
                SheetbaseError::Unexpected(format!(
                    "no column data returned for field {}",
                    filter.field
                ))
            })?;
            candidates.retain(|&row_index| filter.op.matches(column.get(row_index)));
        }

        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        // Round trip 2: full contents of the surviving rows only.
        let row_ranges: Vec<String> = candidates
            .iter()
            .map(|&row_index| {
                let row = u32::try_from(row_index).unwrap_or(u32::MAX) + 2;
                SheetRange::cells(CellRef::at(row, 1), CellRef::row(row)).in_sheet(&self.name)
            })
            .collect();
        let row_grids = self
            .grid
            .batch_get_ranges(&row_ranges, ReadOptions::unformatted_rows())
            .await?;

        let ctx = self.row_context()?;
        let rows = candidates
            .iter()
            .zip(row_grids)
            .map(|(&row_index, grid)| {
                let values = grid.into_iter().next().unwrap_or_default();
                let row = u32::try_from(row_index).unwrap_or(u32::MAX) + 2;
                Row::new(Arc::clone(&ctx), row, values)
            })
            .collect();
        Ok(rows)
    }

    /// Equality-only convenience over [`Self::query_rows`]: one exact
    /// match filter per (field, value) pair.
    pub async fn find_rows(&self, equalities: &[(&str, Value)]) -> Result<Vec<Row>> {
        let filters: Vec<QueryFilter> = equalities
            .iter()
            .map(|(field, value)| QueryFilter::new(*field, FilterOp::Equals(value.clone())))
            .collect();
        self.query_rows(&filters).await
    }

    /// Project `row_data` onto the table's field order (fields it does
    /// not name become empty cells), append below the used range, and
    /// return a `Row` at the physical position the service reports.
    pub async fn add_row(&self, row_data: &[(&str, Value)]) -> Result<Row> {
        let fields = Arc::clone(self.loaded_fields()?);

        let projected: Vec<Value> = fields
            .iter()
            .map(|field| {
                row_data
                    .iter()
                    .find(|(name, _)| name == field)
                    .map_or(Value::Null, |(_, value)| value.clone())
            })
            .collect();

        let range = SheetRange::literal("A1:Z1000").in_sheet(&self.name);
        let appended = self
            .grid
            .append_row(&range, projected.clone(), self.value_input)
            .await?;

        // The service may land the row anywhere below the requested
        // range; its response is authoritative.
        let row_number = parse_appended_row(&appended.updated_range).ok_or_else(|| {
            SheetbaseError::Unexpected(format!(
                "cannot locate appended row in range {}",
                appended.updated_range
            ))
        })?;

        debug!(table = %self.display_name(), row = row_number, "row appended");
        Ok(Row::new(self.row_context()?, row_number, projected))
    }
}

#[async_trait]
impl Store for Table {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> StoreKind {
        StoreKind::Table
    }

    fn grid(&self) -> &SharedGrid {
        &self.grid
    }

    /// New tables write their explicit field list as the header row;
    /// discovered tables read the existing header and adopt it. Exactly
    /// one branch runs per table lifetime.
    async fn initialize(&mut self) -> Result<()> {
        let header_range = SheetRange::literal("A1:1").in_sheet(&self.name);

        if self.explicit_fields {
            let fields = Arc::clone(self.loaded_fields()?);
            let header: Vec<Value> = fields
                .iter()
                .map(|field| Value::String(field.clone()))
                .collect();
            self.grid
                .update_range(&header_range, vec![header], self.value_input)
                .await?;
            debug!(table = %self.display_name(), "header row written");
            return Ok(());
        }

        let grid = self
            .grid
            .get_range(&header_range, ReadOptions::default())
            .await?;
        let header = grid.into_iter().next().unwrap_or_default();
        let fields: Vec<String> = header
            .into_iter()
            .map(|cell| match cell {
                Value::String(s) => s,
                other => other.to_string(),
            })
            .collect();
        debug!(table = %self.display_name(), fields = fields.len(), "header row adopted");
        self.fields = Some(Arc::new(fields));
        Ok(())
    }
}
