use std::time::Duration;

use alloy::primitives::Address;
use tokio::time::sleep;
use tracing::{error, info};

use crate::{
    configuration::{AppState, Config, State},
    error::Error,
    model::{Defi_Snapshot, SnapshotStore},
    provider::{
        BalanceAggregator, ChainClient, EndpointPool, Instruments, Transport,
        HTTP,
    },
};

/// Single producer of the snapshot table. Owns the chain client and its
/// endpoint cursor.
#[derive(Debug)]
pub struct Poller<T> {
    aggregator: BalanceAggregator<T>,
    address: Address,
    interval: Duration,
    retention_limit: u32,
}

impl Poller<HTTP> {
    pub fn from_config(config: &Config) -> Result<Poller<HTTP>, Error> {
        let transport = HTTP::new(config)?;
        let endpoints = EndpointPool::new(config.rpc_endpoints.clone())?;
        let client =
            ChainClient::new(transport, endpoints, config.retry_policy());
        let aggregator =
            BalanceAggregator::new(client, Instruments::from_config(config));

        Ok(Poller::new(
            aggregator,
            config.user_address,
            config.poll_interval(),
            config.retention_limit,
        ))
    }
}

impl<T: Transport> Poller<T> {
    pub fn new(
        aggregator: BalanceAggregator<T>,
        address: Address,
        interval: Duration,
        retention_limit: u32,
    ) -> Self {
        Poller {
            aggregator,
            address,
            interval,
            retention_limit,
        }
    }

    /// One cycle: read balances, append a snapshot, prune old rows.
    pub async fn fetch_insert(
        &mut self,
        store: &SnapshotStore,
    ) -> Result<Defi_Snapshot, Error> {
        let reading = self.aggregator.compute_reading(self.address).await?;
        let snapshot = store.append(&self.address.to_string(), &reading).await?;

        let deleted = store.enforce_retention(self.retention_limit).await?;
        if deleted > 0 {
            info!(
                "Database cleaned, removed {} rows and kept the {} most recent",
                deleted, self.retention_limit
            );
        }

        Ok(snapshot)
    }

    /// Polls forever. A failed cycle is logged and never ends the loop.
    pub async fn run(mut self, app_state: AppState<State>) -> Result<(), Error> {
        info!(
            "Starting balance poller for {} every {}s",
            self.address,
            self.interval.as_secs()
        );

        loop {
            match self.fetch_insert(&app_state.database.defi_snapshot).await {
                Ok(snapshot) => info!(
                    "Snapshot {} saved at {}, net {}",
                    snapshot.id, snapshot.timestamp, snapshot.net
                ),
                Err(e) => error!("Error in balance poller: {}", e),
            }

            sleep(self.interval).await;
        }
    }
}

pub async fn balance_snapshot_task(
    app_state: AppState<State>,
) -> Result<(), Error> {
    let poller = Poller::from_config(&app_state.config)?;
    tokio::spawn(poller.run(app_state)).await?
}
