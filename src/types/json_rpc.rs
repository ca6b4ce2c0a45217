use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct JsonRpcRequest<'a> {
    pub jsonrpc: &'a str,
    pub id: u64,
    pub method: &'a str,
    pub params: (CallObject<'a>, &'a str),
}

#[derive(Debug, Serialize)]
pub struct CallObject<'a> {
    pub to: &'a str,
    pub data: &'a str,
}

impl<'a> JsonRpcRequest<'a> {
    pub fn eth_call(id: u64, to: &'a str, data: &'a str) -> Self {
        JsonRpcRequest {
            jsonrpc: "2.0",
            id,
            method: "eth_call",
            params: (CallObject { to, data }, "latest"),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct JsonRpcResponse {
    pub result: Option<String>,
    pub error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
}
