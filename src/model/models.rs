use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One persisted row of `defi_snapshots`.
#[derive(Debug, Clone, PartialEq, FromRow, Deserialize, Serialize)]
pub struct Defi_Snapshot {
    pub id: i64,
    pub timestamp: String,
    pub address: String,
    pub morpho: f64,
    pub aave: f64,
    pub euler: f64,
    pub debt: f64,
    pub net: f64,
}

/// USD value of every leg of the tracked position, taken in one poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct BalanceReading {
    pub morpho: f64,
    pub aave: f64,
    pub euler: f64,
    pub debt: f64,
    pub net: f64,
}

impl BalanceReading {
    pub fn new(morpho: f64, aave: f64, euler: f64, debt: f64) -> Self {
        Self {
            morpho,
            aave,
            euler,
            debt,
            net: morpho + aave + euler - debt,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Net_Stats {
    pub average_net: f64,
    pub min_net: f64,
    pub max_net: f64,
    pub variation: f64,
}

impl Net_Stats {
    pub fn new(average_net: f64, min_net: f64, max_net: f64) -> Self {
        Self {
            average_net,
            min_net,
            max_net,
            variation: max_net - min_net,
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
