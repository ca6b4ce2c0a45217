use alloy::primitives::{Address, U256};
use bigdecimal::{
    num_bigint::{BigInt, BigUint},
    BigDecimal,
};
use tracing::debug;

use crate::{
    configuration::Config,
    error::Error,
    model::BalanceReading,
    provider::{ChainClient, ContractMethod, Transport},
};

/// Every leg is denominated in a 6 decimal stablecoin.
pub const USD_DECIMALS: i64 = 6;

/// Contracts of the four tracked legs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruments {
    pub morpho_vault: Address,
    pub aave_usdc: Address,
    pub aave_debt: Address,
    pub euler_vault: Address,
}

impl Instruments {
    pub fn from_config(config: &Config) -> Instruments {
        Instruments {
            morpho_vault: config.morpho_vault,
            aave_usdc: config.aave_usdc,
            aave_debt: config.aave_debt,
            euler_vault: config.euler_vault,
        }
    }
}

#[derive(Debug)]
pub struct BalanceAggregator<T> {
    client: ChainClient<T>,
    instruments: Instruments,
}

impl<T: Transport> BalanceAggregator<T> {
    pub fn new(client: ChainClient<T>, instruments: Instruments) -> Self {
        BalanceAggregator {
            client,
            instruments,
        }
    }

    pub fn client(&self) -> &ChainClient<T> {
        &self.client
    }

    pub async fn compute_reading(
        &mut self,
        address: Address,
    ) -> Result<BalanceReading, Error> {
        let Instruments {
            morpho_vault,
            aave_usdc,
            aave_debt,
            euler_vault,
        } = self.instruments;
        let client = &mut self.client;
        let balance_of = ContractMethod::BalanceOf(address);

        let morpho = vault_assets(client, morpho_vault, address).await?;
        let aave = client.read(aave_usdc, balance_of).await?;
        let debt = client.read(aave_debt, balance_of).await?;
        let euler = vault_assets(client, euler_vault, address).await?;

        debug!(
            "Raw balances morpho={} aave={} euler={} debt={}",
            morpho, aave, euler, debt
        );

        to_reading(morpho, aave, euler, debt)
    }
}

async fn vault_assets<T: Transport>(
    client: &mut ChainClient<T>,
    vault: Address,
    address: Address,
) -> Result<U256, Error> {
    let shares = client
        .read(vault, ContractMethod::BalanceOf(address))
        .await?;

    client
        .read(vault, ContractMethod::ConvertToAssets(shares))
        .await
}

fn to_usd(raw: U256) -> BigDecimal {
    let raw = BigUint::from_bytes_be(&raw.to_be_bytes::<32>());
    BigDecimal::new(BigInt::from(raw), USD_DECIMALS)
}

/// Goes through the decimal string so the result is the closest f64.
fn to_f64(value: &BigDecimal) -> Result<f64, Error> {
    let value = value.to_string().parse::<f64>()?;
    Ok(value)
}

/// Scales raw token amounts to USD and nets the debt leg out.
pub fn to_reading(
    morpho: U256,
    aave: U256,
    euler: U256,
    debt: U256,
) -> Result<BalanceReading, Error> {
    let morpho = to_usd(morpho);
    let aave = to_usd(aave);
    let euler = to_usd(euler);
    let debt = to_usd(debt);
    let net = morpho.clone() + aave.clone() + euler.clone() - debt.clone();

    Ok(BalanceReading {
        morpho: to_f64(&morpho)?,
        aave: to_f64(&aave)?,
        euler: to_f64(&euler)?,
        debt: to_f64(&debt)?,
        net: to_f64(&net)?,
    })
}
