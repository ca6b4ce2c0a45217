//! Database models module

mod models;
mod table;

pub use models::*;

pub use table::Table;

/// Append-only snapshot table, the only store the service writes to.
pub type SnapshotStore = Table<Defi_Snapshot>;
