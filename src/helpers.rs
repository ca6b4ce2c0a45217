use std::str::FromStr;

use alloy::primitives::Address;

use crate::error::Error;

/// Parses a `0x`-prefixed 20-byte hex address.
pub fn parse_address(value: &str) -> Result<Address, Error> {
    if strip_hex_prefix(value).is_none() {
        return Err(Error::ConfigurationError(format!(
            "Address {} must start with 0x",
            value
        )));
    }

    Address::from_str(value).map_err(|e| {
        Error::ConfigurationError(format!("Address {} is invalid: {}", value, e))
    })
}

pub fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
        .map(|item| item.to_owned())
        .collect()
}

/// Decodes the `0x` hex payload of an `eth_call` result.
pub fn decode_hex(result: &str) -> Result<Vec<u8>, Error> {
    let data = strip_hex_prefix(result).ok_or_else(|| {
        Error::Rpc(format!("Result {} is not 0x-prefixed hex", result))
    })?;

    if data.is_empty() {
        return Err(Error::Rpc(String::from(
            "Empty call result, contract may not exist at this address",
        )));
    }

    let bytes = hex::decode(data)?;
    Ok(bytes)
}

fn strip_hex_prefix(value: &str) -> Option<&str> {
    value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
}
