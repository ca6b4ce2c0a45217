pub use self::json_rpc::{
    CallObject, JsonRpcError, JsonRpcRequest, JsonRpcResponse,
};

mod json_rpc;
