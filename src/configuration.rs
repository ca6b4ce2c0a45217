use std::{env, fs, ops::Deref, path::Path, sync::Arc, time::Duration};

use alloy::primitives::Address;
use url::Url;

use crate::{
    error::Error,
    helpers::{parse_address, parse_list},
    provider::{DatabasePool, RetryPolicy},
};

const DEFAULT_USER_ADDRESS: &str = "0x0000000000000000000000000000000000000000";
const DEFAULT_DATABASE_URL: &str = "sqlite://defi_data.db";
const DEFAULT_RPC_ENDPOINTS: &str = "https://arbitrum-one-rpc.publicnode.com,\
https://arb1.arbitrum.io/rpc,\
https://1rpc.io/arb,\
https://rpc.ankr.com/arbitrum,\
https://arbitrum.meowrpc.com";
const DEFAULT_MORPHO_VAULT: &str = "0x7e97fa6893871A2751B5fE961978DCCb2c201E65";
const DEFAULT_AAVE_USDC: &str = "0x724dc807b04555b71ed48a6896b6f41593b8c637";
const DEFAULT_AAVE_DEBT: &str = "0xf611aeb5013fd2c0511c9cd55c7dc5c1140741a6";
const DEFAULT_EULER_VAULT: &str = "0xe4783824593a50Bfe9dc873204CEc171ebC62dE0";

#[derive(Debug)]
pub struct AppState<T>(Arc<T>);

impl<T> AppState<T> {
    pub fn new(state: T) -> AppState<T> {
        AppState(Arc::new(state))
    }
}

impl<T> Clone for AppState<T> {
    fn clone(&self) -> AppState<T> {
        AppState(Arc::clone(&self.0))
    }
}

impl<T> Deref for AppState<T> {
    type Target = Arc<T>;

    fn deref(&self) -> &Arc<T> {
        &self.0
    }
}

#[derive(Debug)]
pub struct State {
    pub config: Config,
    pub database: DatabasePool,
}

impl State {
    pub async fn new(
        config: Config,
        database: DatabasePool,
    ) -> Result<State, Error> {
        database.run_migrations().await?;
        Ok(Self { config, database })
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub database_url: String,
    pub max_connections: u32,
    pub user_address: Address,
    pub poll_interval: u64,
    pub retention_limit: u32,
    pub rpc_endpoints: Vec<String>,
    pub rpc_backoff: u64,
    pub rpc_max_backoff: u64,
    pub rpc_max_rounds: Option<u32>,
    pub rpc_timeout: u64,
    pub morpho_vault: Address,
    pub aave_usdc: Address,
    pub aave_debt: Address,
    pub euler_vault: Address,
}

impl Config {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            backoff: Duration::from_millis(self.rpc_backoff),
            max_backoff: Duration::from_millis(self.rpc_max_backoff),
            max_rounds: self.rpc_max_rounds,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval)
    }
}

pub fn get_configuration() -> Result<Config, Error> {
    build_configuration(|key| env::var(key).ok())
}

/// Builds the config from a key lookup, falling back to the defaults for
/// anything missing or blank.
pub fn build_configuration<F>(lookup: F) -> Result<Config, Error>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str, default: &str| -> String {
        match lookup(key) {
            Some(value) if !value.trim().is_empty() => value.trim().to_owned(),
            _ => default.to_owned(),
        }
    };

    let server_host = get("SERVER_HOST", "0.0.0.0");
    let port: u16 = get("PORT", "5000").parse()?;
    let allowed_origins = parse_list(&get("ALLOWED_ORIGINS", "*"));
    let database_url = get("DATABASE_URL", DEFAULT_DATABASE_URL);
    let max_connections: u32 = get("DATABASE_MAX_CONNECTIONS", "5").parse()?;
    let user_address = parse_address(&get("USER_ADDRESS", DEFAULT_USER_ADDRESS))?;
    let poll_interval: u64 = get("POLL_INTERVAL_IN_SEC", "300").parse()?;
    let retention_limit: u32 = get("RETENTION_LIMIT", "10000").parse()?;
    let rpc_endpoints = parse_list(&get("RPC_ENDPOINTS", DEFAULT_RPC_ENDPOINTS));
    let rpc_backoff: u64 = get("RPC_BACKOFF_IN_MS", "2000").parse()?;
    let rpc_max_backoff: u64 = get("RPC_MAX_BACKOFF_IN_MS", "30000").parse()?;
    let rpc_max_rounds: u32 = get("RPC_MAX_ROUNDS", "0").parse()?;
    let rpc_timeout: u64 = get("RPC_TIMEOUT_IN_SEC", "10").parse()?;

    let morpho_vault = parse_address(&get("MORPHO_VAULT", DEFAULT_MORPHO_VAULT))?;
    let aave_usdc = parse_address(&get("AAVE_USDC", DEFAULT_AAVE_USDC))?;
    let aave_debt = parse_address(&get("AAVE_DEBT", DEFAULT_AAVE_DEBT))?;
    let euler_vault = parse_address(&get("EULER_VAULT", DEFAULT_EULER_VAULT))?;

    if rpc_endpoints.is_empty() {
        return Err(Error::ConfigurationError(String::from(
            "RPC_ENDPOINTS must list at least one endpoint",
        )));
    }

    for endpoint in &rpc_endpoints {
        Url::parse(endpoint)?;
    }

    if rpc_timeout == 0 {
        return Err(Error::ConfigurationError(String::from(
            "RPC_TIMEOUT_IN_SEC must be greater than 0",
        )));
    }

    if rpc_backoff == 0 {
        return Err(Error::ConfigurationError(String::from(
            "RPC_BACKOFF_IN_MS must be greater than 0",
        )));
    }

    if poll_interval == 0 {
        return Err(Error::ConfigurationError(String::from(
            "POLL_INTERVAL_IN_SEC must be greater than 0",
        )));
    }

    if retention_limit == 0 {
        return Err(Error::ConfigurationError(String::from(
            "RETENTION_LIMIT must be greater than 0",
        )));
    }

    if max_connections == 0 {
        return Err(Error::ConfigurationError(String::from(
            "DATABASE_MAX_CONNECTIONS must be greater than 0",
        )));
    }

    let config = Config {
        server_host,
        port,
        allowed_origins,
        database_url,
        max_connections,
        user_address,
        poll_interval,
        retention_limit,
        rpc_endpoints,
        rpc_backoff,
        rpc_max_backoff: rpc_max_backoff.max(rpc_backoff),
        rpc_max_rounds: if rpc_max_rounds == 0 {
            None
        } else {
            Some(rpc_max_rounds)
        },
        rpc_timeout,
        morpho_vault,
        aave_usdc,
        aave_debt,
        euler_vault,
    };

    Ok(config)
}

/// Loads `etl.conf` and then `.env` from the crate directory into the
/// process environment. Missing files are skipped.
pub fn set_configuration() -> Result<(), Error> {
    let config_file: &str = ".env";
    let etl_config_file: &str = "etl.conf";

    let directory = env!("CARGO_MANIFEST_DIR");

    for file in [etl_config_file, config_file] {
        let path = Path::new(directory).join(file);
        if !path.exists() {
            continue;
        }

        let config_string = fs::read_to_string(path)?;
        for (key, value) in parse_config_string(&config_string) {
            env::set_var(key, value);
        }
    }

    Ok(())
}

fn parse_config_string(config: &str) -> Vec<(String, String)> {
    config
        .lines()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.trim().to_owned(), value.trim().to_owned()))
        .filter(|(key, _)| !key.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, Error> {
        let values: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        build_configuration(|key| values.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.user_address, Address::ZERO);
        assert_eq!(config.poll_interval, 300);
        assert_eq!(config.retention_limit, 10_000);
        assert_eq!(config.rpc_endpoints.len(), 5);
        assert_eq!(
            config.rpc_endpoints[0],
            "https://arbitrum-one-rpc.publicnode.com"
        );
        assert_eq!(config.rpc_max_rounds, None);
        assert_eq!(config.port, 5000);
        assert_eq!(config.allowed_origins, vec![String::from("*")]);
        assert_eq!(
            config.morpho_vault,
            parse_address(DEFAULT_MORPHO_VAULT).unwrap()
        );
        assert_eq!(
            config.euler_vault.to_string().to_lowercase(),
            "0xe4783824593a50bfe9dc873204cec171ebc62de0"
        );
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("USER_ADDRESS", "0x1111111111111111111111111111111111111111"),
            ("POLL_INTERVAL_IN_SEC", "60"),
            ("RETENTION_LIMIT", "500"),
            ("RPC_ENDPOINTS", "https://a.example, https://b.example"),
            ("RPC_MAX_ROUNDS", "3"),
            ("RPC_BACKOFF_IN_MS", "500"),
            ("RPC_MAX_BACKOFF_IN_MS", "100"),
        ])
        .unwrap();

        assert_eq!(
            config.user_address.to_string(),
            "0x1111111111111111111111111111111111111111"
        );
        assert_eq!(config.poll_interval(), Duration::from_secs(60));
        assert_eq!(config.retention_limit, 500);
        assert_eq!(
            config.rpc_endpoints,
            vec![
                String::from("https://a.example"),
                String::from("https://b.example")
            ]
        );

        let policy = config.retry_policy();
        assert_eq!(policy.max_rounds, Some(3));
        assert_eq!(policy.backoff, Duration::from_millis(500));
        assert_eq!(policy.max_backoff, Duration::from_millis(500));
    }

    #[test]
    fn test_blank_value_falls_back_to_default() {
        let config = config_from(&[("POLL_INTERVAL_IN_SEC", "  ")]).unwrap();
        assert_eq!(config.poll_interval, 300);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(matches!(
            config_from(&[("USER_ADDRESS", "0x1234")]),
            Err(Error::ConfigurationError(_))
        ));
        assert!(matches!(
            config_from(&[("RPC_ENDPOINTS", ",")]),
            Err(Error::ConfigurationError(_))
        ));
        assert!(matches!(
            config_from(&[("RPC_ENDPOINTS", "not a url")]),
            Err(Error::URL(_))
        ));
        assert!(matches!(
            config_from(&[("RETENTION_LIMIT", "0")]),
            Err(Error::ConfigurationError(_))
        ));
        assert!(matches!(
            config_from(&[("PORT", "http")]),
            Err(Error::INT(_))
        ));
        assert!(matches!(
            config_from(&[("RPC_TIMEOUT_IN_SEC", "0")]),
            Err(Error::ConfigurationError(_))
        ));
        assert!(matches!(
            config_from(&[("RPC_BACKOFF_IN_MS", "0")]),
            Err(Error::ConfigurationError(_))
        ));
        assert!(matches!(
            config_from(&[("RPC_BACKOFF_IN_MS", "-5")]),
            Err(Error::INT(_))
        ));
    }

    #[test]
    fn test_parse_config_string() {
        let pairs = parse_config_string(
            "# comment\nPORT=8080\r\n\nDATABASE_URL=sqlite://a.db?mode=rwc\nbroken line\n",
        );

        assert_eq!(
            pairs,
            vec![
                (String::from("PORT"), String::from("8080")),
                (
                    String::from("DATABASE_URL"),
                    String::from("sqlite://a.db?mode=rwc")
                ),
            ]
        );
    }
}
