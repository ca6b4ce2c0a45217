use std::{fmt, time::Duration};

use alloy::{
    primitives::{Address, U256},
    sol,
    sol_types::SolCall,
};
use async_trait::async_trait;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::{error::Error, provider::EndpointPool};

sol! {
    function balanceOf(address account) external view returns (uint256);
    function convertToAssets(uint256 shares) external view returns (uint256);
}

/// Read-only contract views the service needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContractMethod {
    BalanceOf(Address),
    ConvertToAssets(U256),
}

impl ContractMethod {
    pub fn name(&self) -> &'static str {
        match self {
            ContractMethod::BalanceOf(_) => "balanceOf",
            ContractMethod::ConvertToAssets(_) => "convertToAssets",
        }
    }

    pub fn abi_encode(&self) -> Vec<u8> {
        match self {
            ContractMethod::BalanceOf(account) => {
                balanceOfCall { account: *account }.abi_encode()
            },
            ContractMethod::ConvertToAssets(shares) => {
                convertToAssetsCall { shares: *shares }.abi_encode()
            },
        }
    }

    /// Decodes the `uint256` both views return. Trailing words are ignored.
    pub fn decode_output(&self, data: &[u8]) -> Result<U256, Error> {
        let value = match self {
            ContractMethod::BalanceOf(_) => {
                balanceOfCall::abi_decode_returns(data, false)?._0
            },
            ContractMethod::ConvertToAssets(_) => {
                convertToAssetsCall::abi_decode_returns(data, false)?._0
            },
        };

        Ok(value)
    }
}

impl fmt::Display for ContractMethod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ContractMethod::BalanceOf(account) => {
                write!(f, "balanceOf({})", account)
            },
            ContractMethod::ConvertToAssets(shares) => {
                write!(f, "convertToAssets({})", shares)
            },
        }
    }
}

/// One encoded `eth_call`, reused unchanged across retries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractCall {
    pub contract: Address,
    pub method: ContractMethod,
    pub data: Vec<u8>,
}

impl ContractCall {
    pub fn new(contract: Address, method: ContractMethod) -> Self {
        ContractCall {
            contract,
            method,
            data: method.abi_encode(),
        }
    }

    pub fn decode(&self, output: &[u8]) -> Result<U256, Error> {
        self.method.decode_output(output)
    }
}

/// Network seam of [`ChainClient`]: one `eth_call` against one endpoint.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn call(
        &self,
        endpoint: &str,
        call: &ContractCall,
    ) -> Result<U256, Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub backoff: Duration,
    pub max_backoff: Duration,
    /// Full passes over the pool before giving up. `None` retries forever.
    pub max_rounds: Option<u32>,
}

impl RetryPolicy {
    /// Delay after the `failures`-th consecutive failure (1-based).
    pub fn delay(&self, failures: u64) -> Duration {
        let exponent = failures.saturating_sub(1).min(31) as u32;

        self.backoff
            .checked_mul(1_u32 << exponent)
            .unwrap_or(self.max_backoff)
            .min(self.max_backoff)
    }

    pub fn max_attempts(&self, endpoints: usize) -> Option<u64> {
        self.max_rounds
            .filter(|rounds| *rounds > 0)
            .map(|rounds| u64::from(rounds) * endpoints as u64)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            backoff: Duration::from_secs(2),
            max_backoff: Duration::from_secs(30),
            max_rounds: None,
        }
    }
}

#[derive(Debug)]
pub struct ChainClient<T> {
    transport: T,
    endpoints: EndpointPool,
    policy: RetryPolicy,
}

impl<T: Transport> ChainClient<T> {
    pub fn new(
        transport: T,
        endpoints: EndpointPool,
        policy: RetryPolicy,
    ) -> Self {
        ChainClient {
            transport,
            endpoints,
            policy,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn endpoints(&self) -> &EndpointPool {
        &self.endpoints
    }

    /// Reads `method` from `contract`, switching endpoint after every
    /// failure until a call succeeds or the retry policy runs out.
    pub async fn read(
        &mut self,
        contract: Address,
        method: ContractMethod,
    ) -> Result<U256, Error> {
        let call = ContractCall::new(contract, method);
        let limit = self.policy.max_attempts(self.endpoints.len());
        let mut failures: u64 = 0;

        loop {
            let endpoint = self.endpoints.current();
            let error = match self.transport.call(endpoint, &call).await {
                Ok(value) => return Ok(value),
                Err(e) => e,
            };

            failures += 1;
            warn!(
                "Error with RPC {} on {} {}: {}",
                endpoint, call.contract, call.method, error
            );

            let next = self.endpoints.advance();
            info!("Switching RPC to: {}", next);

            if let Some(limit) = limit {
                if failures >= limit {
                    return Err(Error::EndpointsExhausted { attempts: failures });
                }
            }

            sleep(self.policy.delay(failures)).await;
        }
    }
}
