pub use self::{
    aggregator::{to_reading, BalanceAggregator, Instruments, USD_DECIMALS},
    chain::{
        ChainClient, ContractCall, ContractMethod, RetryPolicy, Transport,
    },
    database::DatabasePool,
    endpoint_pool::EndpointPool,
    http::HTTP,
};

mod aggregator;
mod chain;
mod database;
mod endpoint_pool;
mod http;
