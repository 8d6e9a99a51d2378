use alloy_primitives::{B256, U256, address};
use serde_json::{Value, json};

use zksync_receipts::format::format_transaction_receipt;
use zksync_receipts::{ErrorKind, FormatError, ReceiptFormatter};

const TO: &str = "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed";
const FROM: &str = "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359";

fn hash(byte: &str) -> String {
    format!("0x{}", byte.repeat(32))
}

/// Receipt as returned by a ZKsync Era node: no `type`, no `hash`, no `effectiveGasPrice`.
fn zksync_receipt() -> Value {
    json!({
        "to": TO,
        "from": FROM,
        "index": "0x1",
        "gasUsed": "0x5208",
        "cumulativeGasUsed": "0x5208",
        "logsBloom": null,
        "blockHash": hash("11"),
        "transactionHash": hash("22"),
        "logs": [],
        "blockNumber": "0x64",
        "status": "0x1",
    })
}

fn zksync_log() -> Value {
    json!({
        "transactionIndex": "0x1",
        "blockNumber": "0x64",
        "transactionHash": hash("22"),
        "address": "0x000000000000000000000000000000000000800a",
        "topics": [hash("aa"), hash("bb")],
        "data": "0x",
        "logIndex": "0x0",
        "blockHash": hash("11"),
    })
}

#[test]
fn test_end_to_end_receipt() {
    let receipt = ReceiptFormatter::zksync().format(&zksync_receipt()).unwrap();

    assert_eq!(receipt.to, Some(address!("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed")));
    assert_eq!(receipt.from, Some(address!("0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359")));
    assert_eq!(receipt.contract_address, None);
    assert_eq!(receipt.tx_type, 0);
    assert_eq!(receipt.hash, Some(B256::repeat_byte(0x22)));
    assert_eq!(receipt.index, 1);
    assert_eq!(receipt.gas_used, U256::from(0x5208));
    assert_eq!(receipt.cumulative_gas_used, U256::from(0x5208));
    assert_eq!(receipt.block_hash, Some(B256::repeat_byte(0x11)));
    assert_eq!(receipt.block_number, Some(100));
    assert_eq!(receipt.status, Some(1));
    assert_eq!(receipt.succeeded(), Some(true));
    assert_eq!(receipt.logs_bloom, None);
    assert_eq!(receipt.effective_gas_price, None);
    assert!(receipt.logs.is_empty());
}

#[test]
fn test_receipt_with_logs() {
    let mut raw = zksync_receipt();
    raw["logs"] = json!([zksync_log(), zksync_log()]);
    raw["logs"][1]["logIndex"] = json!("0x1");

    let receipt = format_transaction_receipt()(&raw).unwrap();
    let indexes: Vec<u64> = receipt.logs.iter().map(|log| log.index).collect();
    assert_eq!(indexes, vec![0, 1]);
    assert_eq!(
        receipt.logs[0].topics,
        vec![B256::repeat_byte(0xaa), B256::repeat_byte(0xbb)]
    );
    assert!(receipt.logs[0].data.is_empty());
}

#[test]
fn test_gas_price_alias() {
    let mut raw = zksync_receipt();
    raw["gasPrice"] = json!("0x2b275d0");
    let receipt = format_transaction_receipt()(&raw).unwrap();
    assert_eq!(receipt.effective_gas_price, Some(U256::from(0x2b275d0)));

    raw["effectiveGasPrice"] = json!("0x10");
    let receipt = format_transaction_receipt()(&raw).unwrap();
    assert_eq!(receipt.effective_gas_price, Some(U256::from(0x10)));
}

#[test]
fn test_missing_status_is_none() {
    let mut raw = zksync_receipt();
    raw.as_object_mut().unwrap().remove("status");
    let receipt = format_transaction_receipt()(&raw).unwrap();
    assert_eq!(receipt.status, None);
    assert_eq!(receipt.tx_type, 0);
}

#[test]
fn test_malformed_logs() {
    let mut raw = zksync_receipt();
    raw["logs"] = json!("not-an-array");

    let err = format_transaction_receipt()(&raw).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BadData);
    assert_eq!(err.field_path(), "logs");
    assert!(matches!(err.root_cause(), FormatError::NotAnArray { .. }));
    assert_eq!(err.value(), &raw);
    assert_eq!(err.to_string(), "invalid value for value.logs (not an array)");
}

#[test]
fn test_bad_address_checksum() {
    let mut raw = zksync_receipt();
    raw["from"] = json!("0xFB6916095ca1df60bB79Ce92cE3Ea74c37c5d359");

    let err = format_transaction_receipt()(&raw).unwrap_err();
    assert_eq!(err.field_path(), "from");
}

#[test]
fn test_serialized_receipt_keeps_null_and_omitted_fields_apart() {
    let receipt = format_transaction_receipt()(&zksync_receipt()).unwrap();
    let serialized = serde_json::to_value(&receipt).unwrap();
    let fields = serialized.as_object().unwrap();

    assert_eq!(fields["contractAddress"], Value::Null);
    assert!(!fields.contains_key("logsBloom"));
    assert!(!fields.contains_key("root"));
    assert!(!fields.contains_key("effectiveGasPrice"));
    assert_eq!(fields["to"], json!("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"));
    assert_eq!(fields["type"], json!(0));
    assert_eq!(fields["from"], json!(FROM));
    assert_eq!(fields["hash"], json!(hash("22")));
}

#[test]
fn test_formatter_is_shareable_across_threads() {
    let formatter = ReceiptFormatter::zksync();
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let formatter = formatter.clone();
            std::thread::spawn(move || formatter.format(&zksync_receipt()).map(|r| r.index))
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap().unwrap(), 1);
    }
}
