pub use self::{
    defi_snapshot::format_timestamp,
    path::get_path,
    types::{ConnectOptions, PoolOption, PoolType},
};
mod defi_snapshot;
mod path;
mod types;
