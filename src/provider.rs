use alloy_network::AnyNetwork;
use alloy_primitives::{B256, U256};
use alloy_provider::{DynProvider, Provider, ProviderBuilder};
use alloy_transport::{RpcError, TransportError};
use anyhow::{Context, Result};
use serde_json::Value;
use std::ops::Deref;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use url::Url;

use crate::format::ReceiptFormatter;
use crate::metrics::Metrics;
use crate::models::common::{Config, NetworkContext};
use crate::models::errors::{FormatError, ProviderError};
use crate::models::receipts::TransactionReceipt;
use crate::utils::retry::{RetryConfig, retry_if};

pub type HttpProvider = DynProvider<AnyNetwork>;

/// JSON-RPC provider for ZKsync-family chains. Receipts are fetched raw and converted
/// with the configured [`ReceiptFormatter`] instead of the client library's own decoding.
pub struct ZkSyncProvider<P> {
    inner: P,
    network: NetworkContext,
    formatter: ReceiptFormatter,
    retry_config: RetryConfig,
    metrics: Option<Arc<Metrics>>,
}

impl ZkSyncProvider<HttpProvider> {
    /// Connects to ZKsync Era mainnet.
    pub async fn mainnet() -> Result<Self> {
        Self::connect(&Config::default()).await
    }

    pub async fn connect(config: &Config) -> Result<Self> {
        let rpc_url: Url = config.rpc_url.parse().context("invalid RPC URL")?;
        info!("RPC URL: {}", rpc_url);

        let inner = ProviderBuilder::new()
            .network::<AnyNetwork>()
            .connect_http(rpc_url)
            .erased();

        let retry_config = RetryConfig::from(config.retry.clone());
        let chain_id = retry_if(
            || async {
                inner
                    .get_chain_id()
                    .await
                    .map_err(|e| rpc_error("eth_chainId", e))
            },
            &retry_config,
            "eth_chainId",
            is_transient,
        )
        .await?;
        info!("Chain ID: {}", chain_id);

        let network = NetworkContext::new(config.chain_name.clone(), chain_id);
        Ok(Self::new(inner, network).with_retry(retry_config))
    }
}

impl<P> ZkSyncProvider<P>
where
    P: Provider<AnyNetwork>,
{
    pub fn new(inner: P, network: NetworkContext) -> Self {
        Self {
            inner,
            network,
            formatter: ReceiptFormatter::zksync(),
            retry_config: RetryConfig::default(),
            metrics: None,
        }
    }

    pub fn with_formatter(mut self, formatter: ReceiptFormatter) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn with_retry(mut self, retry_config: RetryConfig) -> Self {
        self.retry_config = retry_config;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn network(&self) -> &NetworkContext {
        &self.network
    }

    pub fn formatter(&self) -> &ReceiptFormatter {
        &self.formatter
    }

    /// Turns a raw receipt into a typed receipt bound to this provider.
    pub fn wrap_transaction_receipt(
        &self,
        value: &Value,
        network: &NetworkContext,
    ) -> Result<ProviderReceipt<'_, P>, FormatError> {
        let receipt = self.formatter.format(value)?;
        Ok(ProviderReceipt {
            receipt,
            network: network.clone(),
            provider: self,
        })
    }

    /// Fetches and formats the receipt of `hash`. `None` when the node does not know the
    /// transaction or it is still pending.
    pub async fn get_transaction_receipt(
        &self,
        hash: B256,
    ) -> Result<Option<ProviderReceipt<'_, P>>> {
        let raw = self
            .request::<_, Option<Value>>("eth_getTransactionReceipt", (hash,))
            .await?;

        let Some(raw) = raw.filter(|value| !value.is_null()) else {
            debug!("No receipt for transaction {}", hash);
            return Ok(None);
        };

        match self.wrap_transaction_receipt(&raw, &self.network) {
            Ok(receipt) => {
                if let Some(metrics) = &self.metrics {
                    metrics
                        .receipts_formatted
                        .add(1, &metrics.labels("get_transaction_receipt"));
                }
                Ok(Some(receipt))
            }
            Err(source) => {
                warn!(
                    "Receipt for transaction {} rejected at field '{}': {}",
                    hash,
                    source.field_path(),
                    source.root_cause()
                );
                if let Some(metrics) = &self.metrics {
                    metrics
                        .receipt_format_errors
                        .add(1, &metrics.labels("get_transaction_receipt"));
                }
                Err(ProviderError::InvalidReceipt { hash, source }.into())
            }
        }
    }

    pub async fn get_block_number(&self) -> Result<u64> {
        retry_if(
            || async {
                let start = Instant::now();
                let result = self.inner.get_block_number().await;
                self.observe("eth_blockNumber", start, result.is_err());
                result.map_err(|e| rpc_error("eth_blockNumber", e))
            },
            &self.retry_config,
            "eth_blockNumber",
            is_transient,
        )
        .await
    }

    async fn request<Params, R>(&self, method: &'static str, params: Params) -> Result<R>
    where
        Params: serde::Serialize + Clone + std::fmt::Debug + Send + Sync + Unpin + 'static,
        R: serde::de::DeserializeOwned + std::fmt::Debug + Send + Sync + Unpin + 'static,
    {
        retry_if(
            || async {
                let start = Instant::now();
                let result = self
                    .inner
                    .raw_request::<_, R>(method.into(), params.clone())
                    .await;
                self.observe(method, start, result.is_err());
                result.map_err(|e| rpc_error(method, e))
            },
            &self.retry_config,
            method,
            is_transient,
        )
        .await
    }

    fn observe(&self, method: &'static str, start: Instant, failed: bool) {
        let Some(metrics) = &self.metrics else {
            return;
        };
        let labels = metrics.labels(method);
        metrics.rpc_requests.add(1, &labels);
        metrics
            .rpc_latency
            .record(start.elapsed().as_secs_f64(), &labels);
        if failed {
            metrics.rpc_errors.add(1, &labels);
        }
    }
}

/// JSON-RPC error responses become [`ProviderError::Rpc`]. Transport failures keep their
/// alloy type so [`is_transient`] can recognize them.
fn rpc_error(method: &'static str, error: TransportError) -> anyhow::Error {
    match error {
        RpcError::ErrorResp(payload) => {
            warn!("{} rejected by node: {}", method, payload);
            ProviderError::Rpc {
                method,
                code: payload.code,
                message: payload.message.to_string(),
            }
            .into()
        }
        error => {
            warn!("Request {} failed. Error details:\n{:#?}", method, error);
            error.into()
        }
    }
}

/// Only failures to reach the node are worth another attempt. Error responses and
/// (de)serialization failures repeat on every try.
fn is_transient(error: &anyhow::Error) -> bool {
    matches!(
        error.downcast_ref::<TransportError>(),
        Some(RpcError::Transport(_))
    )
}

/// A formatted receipt together with the provider and network it came from.
pub struct ProviderReceipt<'p, P> {
    receipt: TransactionReceipt,
    network: NetworkContext,
    provider: &'p ZkSyncProvider<P>,
}

impl<'p, P> ProviderReceipt<'p, P>
where
    P: Provider<AnyNetwork>,
{
    pub fn receipt(&self) -> &TransactionReceipt {
        &self.receipt
    }

    pub fn into_receipt(self) -> TransactionReceipt {
        self.receipt
    }

    pub fn network(&self) -> &NetworkContext {
        &self.network
    }

    pub fn provider(&self) -> &'p ZkSyncProvider<P> {
        self.provider
    }

    /// Gas used times the effective gas price, if the node reported a price.
    pub fn fee(&self) -> Option<U256> {
        self.receipt
            .effective_gas_price
            .map(|price| self.receipt.gas_used.saturating_mul(price))
    }

    /// Number of blocks mined on top of the receipt's block, counting the block itself.
    /// Zero while the receipt has no block number or the node's tip is behind it.
    pub async fn confirmations(&self) -> Result<u64> {
        let Some(block_number) = self.receipt.block_number else {
            return Ok(0);
        };
        let tip = self.provider.get_block_number().await?;
        // A lagging node may not have reached the receipt's block yet
        Ok(tip.checked_sub(block_number).map_or(0, |depth| depth + 1))
    }
}

impl<P> Deref for ProviderReceipt<'_, P> {
    type Target = TransactionReceipt;

    fn deref(&self) -> &Self::Target {
        &self.receipt
    }
}

impl<P> std::fmt::Debug for ProviderReceipt<'_, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderReceipt")
            .field("receipt", &self.receipt)
            .field("network", &self.network)
            .finish_non_exhaustive()
    }
}
