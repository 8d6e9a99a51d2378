pub mod format;
pub mod metrics;
pub mod models;
pub mod provider;
pub mod utils;

pub use format::ReceiptFormatter;
pub use models::errors::{ErrorKind, FormatError, ProviderError};
pub use models::receipts::{Log, TransactionReceipt};
pub use provider::{ProviderReceipt, ZkSyncProvider};
