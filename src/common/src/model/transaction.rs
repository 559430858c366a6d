use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const SEND_TRANSACTION: &str = "eth_sendTransaction";

/// Body returned to a frame client by a transaction button. The client's
/// wallet signs and submits it, the server never does.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    /// CAIP-2 chain id, e.g. `eip155:84532`
    pub chain_id: String,
    pub method: String,
    pub params: TransactionParams,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TransactionParams {
    pub abi: Vec<Value>,
    pub to: String,
    /// 0x-prefixed calldata
    pub data: String,
    /// Decimal wei
    pub value: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
}
