use crate::error::{Result, SheetbaseError};
use crate::grid::SharedGrid;
use async_trait::async_trait;

pub const TABLE_PREFIX: &str = "tbl_";
pub const KV_PREFIX: &str = "kv_";

/// The closed set of store kinds a sheet can be classified as, keyed by
/// its title prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Table,
    KeyValue,
}

/// Prefix registry consulted once per sheet at discovery time. Sheets
/// matching no entry are not stores and are ignored.
const REGISTRY: [(&str, StoreKind); 2] = [
    (TABLE_PREFIX, StoreKind::Table),
    (KV_PREFIX, StoreKind::KeyValue),
];

impl StoreKind {
    pub fn classify(title: &str) -> Option<StoreKind> {
        REGISTRY
            .iter()
            .find(|(prefix, _)| title.starts_with(prefix))
            .map(|(_, kind)| *kind)
    }

    pub fn prefix(self) -> &'static str {
        match self {
            StoreKind::Table => TABLE_PREFIX,
            StoreKind::KeyValue => KV_PREFIX,
        }
    }

    /// The full sheet title for a store of this kind.
    pub fn qualify(self, display_name: &str) -> String {
        format!("{}{}", self.prefix(), display_name)
    }
}

/// Shared identity and grid plumbing for both store kinds.
#[async_trait]
pub trait Store: Send + Sync {
    /// Full sheet title, including the kind prefix.
    fn name(&self) -> &str;

    fn kind(&self) -> StoreKind;

    fn grid(&self) -> &SharedGrid;

    /// Name with the kind prefix stripped; recomputed on every call.
    fn display_name(&self) -> &str {
        self.name()
            .strip_prefix(self.kind().prefix())
            .unwrap_or_else(|| self.name())
    }

    /// Load or write the store's on-sheet structure. Concrete kinds
    /// override this; the base capability cannot be initialized.
    async fn initialize(&mut self) -> Result<()> {
        Err(SheetbaseError::UnsupportedOperation(
            "stores are not meant to be initialized directly".into(),
        ))
    }

    /// Resolve the store's stable sheet id by listing the workbook's
    /// sheets. Fails if the sheet was renamed or deleted since discovery.
    async fn sheet_id(&self) -> Result<i64> {
        resolve_sheet_id(self.grid(), self.name()).await
    }
}

pub(crate) async fn resolve_sheet_id(grid: &SharedGrid, name: &str) -> Result<i64> {
    let metadata = grid.workbook_metadata().await?;
    metadata
        .sheets
        .iter()
        .find(|sheet| sheet.title == name)
        .map(|sheet| sheet.sheet_id)
        .ok_or_else(|| SheetbaseError::SheetNotFound(name.to_string()))
}

/// Construction guard: every store name must carry its kind's prefix.
pub(crate) fn check_prefix(name: &str, kind: StoreKind) -> Result<()> {
    if name.starts_with(kind.prefix()) {
        Ok(())
    } else {
        Err(SheetbaseError::InvalidArgument(format!(
            "store name {name} must start with {}",
            kind.prefix()
        )))
    }
}
