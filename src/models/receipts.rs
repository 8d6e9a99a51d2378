use alloy_primitives::{Address, B256, Bytes, U256};
use serde::{Serialize, Serializer};

/// A single log entry of a receipt. Every field is required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Log {
    pub transaction_index: u64,
    pub block_number: u64,
    pub transaction_hash: B256,
    #[serde(serialize_with = "checksummed")]
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Bytes,
    pub index: u64,
    pub block_hash: B256,
}

/// Typed transaction receipt.
///
/// `None` covers both a field the node sent as `null` and a field it left out. When
/// serialized, only `to`, `from` and `contractAddress` are written as `null`; the other
/// optional fields are skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    #[serde(serialize_with = "checksummed_opt")]
    pub to: Option<Address>,
    #[serde(serialize_with = "checksummed_opt")]
    pub from: Option<Address>,
    #[serde(serialize_with = "checksummed_opt")]
    pub contract_address: Option<Address>,
    pub index: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<Bytes>,
    pub gas_used: U256,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logs_bloom: Option<Bytes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_hash: Option<B256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<B256>,
    pub logs: Vec<Log>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
    pub cumulative_gas_used: U256,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_gas_price: Option<U256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u64>,
    #[serde(rename = "type")]
    pub tx_type: u64,
}

impl TransactionReceipt {
    // Pre-Byzantium receipts carry `root` instead of a status code
    pub fn succeeded(&self) -> Option<bool> {
        self.status.map(|status| status == 1)
    }
}

fn checksummed<S: Serializer>(address: &Address, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&address.to_checksum(None))
}

fn checksummed_opt<S: Serializer>(
    address: &Option<Address>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match address {
        Some(address) => checksummed(address, serializer),
        None => serializer.serialize_none(),
    }
}
