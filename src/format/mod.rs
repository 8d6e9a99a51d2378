pub mod combinators;
pub mod primitives;
pub mod receipts;

pub use combinators::{AliasMap, FieldAliases, Formatter, RecordReader, allow_null, array_of, object};
pub use receipts::{ReceiptFormatter, format_receipt_log, format_transaction_receipt};
