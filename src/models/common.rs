use serde::{Deserialize, Serialize};

pub const ZKSYNC_MAINNET_RPC_URL: &str = "https://mainnet.era.zksync.io";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub address: String,
    pub port: u16,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            address: "0.0.0.0".to_string(),
            port: 9100,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 8,
            base_delay_ms: 1_000,
            max_delay_ms: 60_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub chain_name: String,
    pub rpc_url: String,
    #[serde(default)]
    pub retry: RetrySettings,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chain_name: "zksync_era".to_string(),
            rpc_url: ZKSYNC_MAINNET_RPC_URL.to_string(),
            retry: RetrySettings::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

/// Chain family of the connected node. Informational only: receipts from any chain id are
/// formatted the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Chain {
    ZKsync,
    Unknown(u64),
}

impl Chain {
    pub fn from_chain_id(chain_id: u64) -> Self {
        match chain_id {
            232 | 300 | 320 | 324 | 325 | 388 | 1217 | 1345 | 2741 | 2904 | 9637 | 50104
            | 61166 | 543210 => Self::ZKsync, // Lens | ZKsync Era Sepolia | ZKcandy | ZKsync Era | GRVT | OpenZK | SxT | Cronos zkEVM | Abstract | Ripio LaChain | WonderFi | Sophon | Treasure Chain | Zero Network
            _ => Self::Unknown(chain_id),
        }
    }
}

/// The network a receipt was fetched from. Attached to every wrapped receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkContext {
    pub name: String,
    pub chain_id: u64,
    pub chain: Chain,
}

impl NetworkContext {
    pub fn new(name: impl Into<String>, chain_id: u64) -> Self {
        Self {
            name: name.into(),
            chain_id,
            chain: Chain::from_chain_id(chain_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zksync_family_chain_ids() {
        for chain_id in [300, 324, 2741, 50104] {
            assert_eq!(Chain::from_chain_id(chain_id), Chain::ZKsync);
        }
        assert_eq!(Chain::from_chain_id(10), Chain::Unknown(10));
    }

    #[test]
    fn test_network_context() {
        let network = NetworkContext::new("zksync_era", 324);
        assert_eq!(network.chain, Chain::ZKsync);
        assert_eq!(network.name, "zksync_era");
    }

    #[test]
    fn test_network_context_accepts_any_chain_id() {
        let sepolia = NetworkContext::new("zksync_sepolia", 300);
        assert_eq!(sepolia.chain, Chain::ZKsync);

        let other = NetworkContext::new("devnet", 270_000);
        assert_eq!(other.chain_id, 270_000);
        assert_eq!(other.chain, Chain::Unknown(270_000));
    }
}
