mod sqlite;

pub use sqlite::{
    format_timestamp, get_path, ConnectOptions, PoolOption, PoolType,
};
