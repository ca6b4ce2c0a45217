pub mod balance_snapshot;

pub use balance_snapshot::{balance_snapshot_task, Poller};
