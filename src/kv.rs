use crate::error::{Result, SheetbaseError};
use crate::grid::{ReadOptions, SharedGrid};
use crate::range::{CellRef, SheetRange};
use crate::store::{check_prefix, Store, StoreKind};
use async_trait::async_trait;
use serde_json::Value;
use sheetbase_schema::ValueInputOption;
use tracing::debug;

/// A two-column (key, value) sheet. Keys live in column A, values in
/// column B. Nothing is cached; every operation queries the grid live.
pub struct KeyValueStore {
    name: String,
    grid: SharedGrid,
    value_input: ValueInputOption,
}

impl KeyValueStore {
    pub(crate) fn new(
        grid: SharedGrid,
        name: impl Into<String>,
        value_input: ValueInputOption,
    ) -> Result<Self> {
        let name = name.into();
        check_prefix(&name, StoreKind::KeyValue)?;
        Ok(Self {
            name,
            grid,
            value_input,
        })
    }

    /// All keys, in row order. Empty when the store holds nothing.
    pub async fn fetch_keys(&self) -> Result<Vec<Value>> {
        self.fetch_column("A1:A").await
    }

    /// All values, in row order.
    pub async fn fetch_values(&self) -> Result<Vec<Value>> {
        self.fetch_column("B1:B").await
    }

    async fn fetch_column(&self, range: &str) -> Result<Vec<Value>> {
        let range = SheetRange::literal(range).in_sheet(&self.name);
        let mut grid = self
            .grid
            .get_range(&range, ReadOptions::columns())
            .await?;
        if grid.is_empty() {
            return Ok(Vec::new());
        }
        Ok(grid.swap_remove(0))
    }

    /// 1-based row of the first exact match for `key` in the key column.
    /// Absent keys yield `KeyNotFound`, or the sentinel row 0 when
    /// `throw_if_not_exists` is false.
    pub async fn fetch_key_row(&self, key: &str, throw_if_not_exists: bool) -> Result<u32> {
        let keys = self.fetch_keys().await?;
        let position = keys.iter().position(|cell| cell.as_str() == Some(key));
        match position {
            Some(index) => Ok(u32::try_from(index).unwrap_or(u32::MAX) + 1),
            None if throw_if_not_exists => Err(SheetbaseError::KeyNotFound {
                store: self.display_name().to_string(),
                key: key.to_string(),
            }),
            None => Ok(0),
        }
    }

    /// Value stored under `key`; fails with `KeyNotFound` when absent.
    /// An empty value cell reads as `Null`.
    pub async fn fetch(&self, key: &str) -> Result<Value> {
        let key_row = self.fetch_key_row(key, true).await?;

        let range = SheetRange::cell(CellRef::at(key_row, 2)).in_sheet(&self.name);
        let grid = self.grid.get_range(&range, ReadOptions::default()).await?;
        Ok(grid
            .into_iter()
            .next()
            .and_then(|row| row.into_iter().next())
            .unwrap_or(Value::Null))
    }

    /// Upsert: overwrite the value cell in place when `key` exists,
    /// append a new (key, value) row otherwise. With
    /// `create_if_not_exists` false, an absent key is a `KeyNotFound`
    /// error instead.
    pub async fn set(&self, key: &str, value: Value, create_if_not_exists: bool) -> Result<()> {
        let key_row = self.fetch_key_row(key, !create_if_not_exists).await?;

        if key_row > 0 {
            let range = SheetRange::cell(CellRef::at(key_row, 2)).in_sheet(&self.name);
            debug!(store = %self.display_name(), key, "overwriting value");
            return self
                .grid
                .update_range(&range, vec![vec![value]], self.value_input)
                .await;
        }

        let range = SheetRange::literal("A1:Z").in_sheet(&self.name);
        debug!(store = %self.display_name(), key, "appending new entry");
        self.grid
            .append_row(
                &range,
                vec![Value::String(key.to_string()), value],
                self.value_input,
            )
            .await?;
        Ok(())
    }

    /// `set` with creation disabled: fails when `key` does not exist.
    pub async fn update(&self, key: &str, value: Value) -> Result<()> {
        self.set(key, value, false).await
    }

    /// Remove the key's physical row, shifting all later entries up by
    /// one. Previously resolved row positions become stale.
    pub async fn delete(&self, key: &str) -> Result<()> {
        let key_row = self.fetch_key_row(key, true).await?;
        let sheet_id = self.sheet_id().await?;

        debug!(store = %self.display_name(), key, row = key_row, "deleting entry");
        self.grid
            .delete_rows(
                sheet_id,
                i64::from(key_row) - 1,
                i64::from(key_row),
            )
            .await
    }
}

#[async_trait]
impl Store for KeyValueStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> StoreKind {
        StoreKind::KeyValue
    }

    fn grid(&self) -> &SharedGrid {
        &self.grid
    }

    /// Key/value sheets have no on-sheet structure to load.
    async fn initialize(&mut self) -> Result<()> {
        Ok(())
    }
}
