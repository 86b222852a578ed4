//! Tables and key/value stores on top of a spreadsheet workbook.
//!
//! Sheets whose titles carry a recognized prefix (`tbl_`, `kv_`) become
//! queryable row collections or simple key/value stores. All cell access
//! goes through the [`grid::GridAccess`] capability, implemented for the
//! Google Sheets v4 API by [`grid::SheetsClient`].

pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod filter;
pub mod grid;
pub mod kv;
pub mod range;
pub mod row;
pub mod store;
pub mod table;

pub use config::{CredentialSource, DatabaseConfig};
pub use database::Database;
pub use error::{Result, SheetbaseError};
pub use filter::{FilterOp, QueryFilter};
pub use grid::{GridAccess, ReadOptions, SharedGrid, SheetsClient, WorkbookMetadata};
pub use kv::KeyValueStore;
pub use row::Row;
pub use store::{Store, StoreKind, KV_PREFIX, TABLE_PREFIX};
pub use table::Table;
