use crate::config::DatabaseConfig;
use crate::error::Result;
use crate::grid::{SharedGrid, SheetsClient};
use crate::kv::KeyValueStore;
use crate::store::{Store, StoreKind};
use crate::table::Table;
use futures::future::{try_join, try_join_all};
use sheetbase_schema::ValueInputOption;
use std::sync::Arc;
use tracing::{debug, info};

/// One workbook viewed as a database: every sheet whose title carries a
/// store prefix becomes a [`Table`] or [`KeyValueStore`].
///
/// A `Database` must be initialized before anything else; construction
/// only wires up the grid capability.
pub struct Database {
    workbook_id: String,
    name: String,
    grid: SharedGrid,
    value_input: ValueInputOption,
    tables: Vec<Table>,
    kv_stores: Vec<KeyValueStore>,
}

impl Database {
    /// Connect to a Google Sheets workbook.
    pub fn new(workbook_id: impl Into<String>, config: &DatabaseConfig) -> Result<Self> {
        let workbook_id = workbook_id.into();
        let client = SheetsClient::new(workbook_id.clone(), config)?;
        Ok(Self::with_grid(
            workbook_id,
            Arc::new(client),
            config.value_input,
        ))
    }

    /// Build a database over any grid backend. This is the seam tests and
    /// alternative providers plug into.
    pub fn with_grid(
        workbook_id: impl Into<String>,
        grid: SharedGrid,
        value_input: ValueInputOption,
    ) -> Self {
        Self {
            workbook_id: workbook_id.into(),
            name: "Uninitialized Database".to_string(),
            grid,
            value_input,
            tables: Vec::new(),
            kv_stores: Vec::new(),
        }
    }

    /// Discover the workbook's stores: fetch metadata, adopt the workbook
    /// title as the display name, classify every sheet by prefix, and
    /// initialize all discovered stores concurrently. Any single store
    /// failing fails the whole call.
    pub async fn initialize(&mut self) -> Result<()> {
        let metadata = self.grid.workbook_metadata().await?;
        self.name = metadata.title;
        self.tables.clear();
        self.kv_stores.clear();

        for sheet in &metadata.sheets {
            match StoreKind::classify(&sheet.title) {
                Some(StoreKind::Table) => self.tables.push(Table::discovered(
                    Arc::clone(&self.grid),
                    sheet.title.clone(),
                    self.value_input,
                )?),
                Some(StoreKind::KeyValue) => self.kv_stores.push(KeyValueStore::new(
                    Arc::clone(&self.grid),
                    sheet.title.clone(),
                    self.value_input,
                )?),
                None => debug!(sheet = %sheet.title, "sheet matches no store prefix, ignoring"),
            }
        }

        let table_inits = try_join_all(self.tables.iter_mut().map(|table| table.initialize()));
        let kv_inits = try_join_all(self.kv_stores.iter_mut().map(|store| store.initialize()));
        try_join(table_inits, kv_inits).await?;

        info!(
            database = %self.name,
            tables = self.tables.len(),
            kv_stores = self.kv_stores.len(),
            "database initialized"
        );
        Ok(())
    }

    /// The workbook identifier this database is bound to.
    pub fn workbook_id(&self) -> &str {
        &self.workbook_id
    }

    /// Workbook title, once initialized.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn key_value_stores(&self) -> &[KeyValueStore] {
        &self.kv_stores
    }

    /// Look up a table by its full prefixed name or its display name.
    /// Absence is not an error.
    pub fn get_table(&self, name: &str) -> Option<&Table> {
        self.tables
            .iter()
            .find(|table| table.name() == name || table.display_name() == name)
    }

    /// Look up a key/value store by its full prefixed name or its display
    /// name.
    pub fn get_key_value_store(&self, name: &str) -> Option<&KeyValueStore> {
        self.kv_stores
            .iter()
            .find(|store| store.name() == name || store.display_name() == name)
    }

    /// Create a new table: a fresh `tbl_`-prefixed sheet whose header row
    /// is written from `fields`. The table is registered and returned.
    pub async fn create_table(&mut self, display_name: &str, fields: Vec<String>) -> Result<&Table> {
        let name = StoreKind::Table.qualify(display_name);
        self.grid.create_sheet(&name).await?;

        let mut table =
            Table::with_fields(Arc::clone(&self.grid), name, fields, self.value_input)?;
        table.initialize().await?;

        let index = self.tables.len();
        self.tables.push(table);
        Ok(&self.tables[index])
    }

    /// Create a new, empty key/value store sheet and register it.
    pub async fn create_key_value_store(&mut self, display_name: &str) -> Result<&KeyValueStore> {
        let name = StoreKind::KeyValue.qualify(display_name);
        self.grid.create_sheet(&name).await?;

        let mut store = KeyValueStore::new(Arc::clone(&self.grid), name, self.value_input)?;
        store.initialize().await?;

        let index = self.kv_stores.len();
        self.kv_stores.push(store);
        Ok(&self.kv_stores[index])
    }
}
