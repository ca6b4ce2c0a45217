use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use alloy::primitives::U256;
use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;

use crate::{
    configuration::Config,
    error::Error,
    helpers::decode_hex,
    provider::{ContractCall, Transport},
    types::{JsonRpcRequest, JsonRpcResponse},
};

/// JSON-RPC over HTTP, one `eth_call` per request.
#[derive(Debug)]
pub struct HTTP {
    client: Client,
    id: AtomicU64,
}

impl HTTP {
    pub fn new(config: &Config) -> Result<HTTP, Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.rpc_timeout))
            .build()?;

        Ok(HTTP {
            client,
            id: AtomicU64::new(1),
        })
    }

    fn next_id(&self) -> u64 {
        self.id.fetch_add(1, Ordering::Relaxed)
    }
}

#[async_trait]
impl Transport for HTTP {
    async fn call(
        &self,
        endpoint: &str,
        call: &ContractCall,
    ) -> Result<U256, Error> {
        let to = format!("0x{}", hex::encode(call.contract.as_slice()));
        let data = format!("0x{}", hex::encode(&call.data));
        let request = JsonRpcRequest::eth_call(self.next_id(), &to, &data);

        let response = self
            .client
            .post(endpoint)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json::<JsonRpcResponse>()
            .await?;

        if let Some(error) = response.error {
            return Err(Error::Rpc(format!(
                "{} (code {})",
                error.message, error.code
            )));
        }

        let result = response.result.with_context(|| {
            format!("Response from {} has neither result nor error", endpoint)
        })?;

        let output = decode_hex(&result)?;
        call.decode(&output)
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use actix_web::{dev::ServerHandle, web, App, HttpResponse, HttpServer};
    use alloy::primitives::{address, Address};
    use serde_json::{json, Value};

    use super::*;
    use crate::{configuration::build_configuration, provider::ContractMethod};

    const HOLDER: Address = address!("00000000000000000000000000000000000000aa");
    const VAULT: Address = address!("7e97fa6893871A2751B5fE961978DCCb2c201E65");
    const GARBLED: Address = address!("00000000000000000000000000000000000000bb");

    async fn fake_node(body: web::Json<Value>) -> HttpResponse {
        let to = body["params"][0]["to"].as_str().unwrap_or_default();
        let data = body["params"][0]["data"].as_str().unwrap_or_default();
        let id = body["id"].clone();

        if to == "0x00000000000000000000000000000000000000bb" {
            return HttpResponse::Ok().json(json!({
                "jsonrpc": "2.0",
                "id": id,
                "result": format!("0x{}", "€".repeat(22))
            }));
        }

        if data.starts_with("0x70a08231") {
            return HttpResponse::Ok().json(json!({
                "jsonrpc": "2.0",
                "id": id,
                "result": format!("0x{:064x}", 50_000_000u64)
            }));
        }

        if data.starts_with("0x07a2d13a") {
            return HttpResponse::Ok().json(json!({
                "jsonrpc": "2.0",
                "id": id,
                "error": { "code": -32000, "message": "execution reverted" }
            }));
        }

        HttpResponse::Ok().json(json!({ "jsonrpc": "2.0", "id": id }))
    }

    fn start_node() -> (SocketAddr, ServerHandle) {
        let server = HttpServer::new(|| {
            App::new().route("/", web::post().to(fake_node))
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .unwrap();

        let address = server.addrs()[0];
        let server = server.run();
        let handle = server.handle();
        actix_web::rt::spawn(server);

        (address, handle)
    }

    fn transport() -> HTTP {
        let config = build_configuration(|_| None).unwrap();
        HTTP::new(&config).unwrap()
    }

    #[actix_web::test]
    async fn test_balance_of_roundtrip() {
        let (address, handle) = start_node();
        let endpoint = format!("http://{}/", address);
        let call = ContractCall::new(VAULT, ContractMethod::BalanceOf(HOLDER));

        let value = transport().call(&endpoint, &call).await.unwrap();

        assert_eq!(value, U256::from(50_000_000u64));
        handle.stop(true).await;
    }

    #[actix_web::test]
    async fn test_node_error_is_rpc_error() {
        let (address, handle) = start_node();
        let endpoint = format!("http://{}/", address);
        let call = ContractCall::new(
            VAULT,
            ContractMethod::ConvertToAssets(U256::from(10u64)),
        );

        let result = transport().call(&endpoint, &call).await;

        match result {
            Err(Error::Rpc(message)) => {
                assert!(message.contains("execution reverted"))
            },
            other => panic!("unexpected result {:?}", other),
        }
        handle.stop(true).await;
    }

    #[actix_web::test]
    async fn test_non_hex_result_is_an_error() {
        let (address, handle) = start_node();
        let endpoint = format!("http://{}/", address);
        let call = ContractCall::new(GARBLED, ContractMethod::BalanceOf(HOLDER));

        let result = transport().call(&endpoint, &call).await;

        assert!(matches!(result, Err(Error::Hex(_))), "{:?}", result);
        handle.stop(true).await;
    }

    #[actix_web::test]
    async fn test_unreachable_endpoint_fails() {
        let call = ContractCall::new(VAULT, ContractMethod::BalanceOf(HOLDER));

        let result = transport().call("http://127.0.0.1:1/", &call).await;

        assert!(matches!(result, Err(Error::Reqwest(_))));
    }
}
