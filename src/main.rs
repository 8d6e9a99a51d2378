use alloy_primitives::B256;
use anyhow::{Context, Result, anyhow};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{self, EnvFilter};

use zksync_receipts::ZkSyncProvider;
use zksync_receipts::metrics::Metrics;
use zksync_receipts::utils::load_config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_writer(std::io::stderr)
        .init();

    // Load config
    let config = match load_config("config.yml") {
        Ok(config) => {
            info!("Config loaded successfully");
            config
        }
        Err(e) => {
            error!("Failed to load config: {}", e);
            return Err(anyhow!(e));
        }
    };

    let hashes = std::env::args()
        .skip(1)
        .map(|arg| {
            arg.parse::<B256>()
                .with_context(|| format!("invalid transaction hash: {arg}"))
        })
        .collect::<Result<Vec<_>>>()?;
    if hashes.is_empty() {
        return Err(anyhow!("usage: zksync-receipts <tx-hash>..."));
    }

    // Initialize optional metrics
    let metrics = if config.metrics.enabled {
        let metrics = Arc::new(Metrics::new(config.chain_name.clone())?);
        metrics
            .start_metrics_server(&config.metrics.address, config.metrics.port)
            .await?;
        Some(metrics)
    } else {
        info!("Metrics are disabled");
        None
    };

    let mut provider = ZkSyncProvider::connect(&config).await?;
    if let Some(metrics) = metrics {
        provider = provider.with_metrics(metrics);
    }

    for hash in hashes {
        match provider.get_transaction_receipt(hash).await? {
            Some(receipt) => {
                info!(
                    "Receipt for {} in block {:?} with {} logs",
                    hash,
                    receipt.block_number,
                    receipt.logs.len()
                );
                println!("{}", serde_json::to_string_pretty(receipt.receipt())?);
            }
            None => warn!("No receipt found for transaction {}", hash),
        }
    }

    Ok(())
}
