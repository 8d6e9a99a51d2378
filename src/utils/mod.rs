pub mod retry;

use anyhow::{Context, Result};
use config::{Environment, File, FileFormat, Map};
use std::path::Path;
use tracing::info;

use crate::models::common::{Config, ZKSYNC_MAINNET_RPC_URL};

/// Loads `file_name` relative to the crate root. The file is optional. Any key can be
/// overridden from the environment: `ZKSYNC_RECEIPTS_RPC_URL`, with `__` between nested
/// keys (`ZKSYNC_RECEIPTS_RETRY__MAX_ATTEMPTS`).
pub fn load_config<P: AsRef<Path>>(file_name: P) -> Result<Config> {
    build_config(file_name.as_ref(), None)
}

fn build_config(file_name: &Path, env: Option<Map<String, String>>) -> Result<Config> {
    // Build the path to the config file
    let manifest_dir = env!("CARGO_MANIFEST_DIR").to_string();
    let config_path = Path::new(&manifest_dir).join(file_name);
    info!("Config path: {}", config_path.to_string_lossy());

    let settings = config::Config::builder()
        .set_default("chain_name", "zksync_era")?
        .set_default("rpc_url", ZKSYNC_MAINNET_RPC_URL)?
        .add_source(
            File::from(config_path.as_path())
                .format(FileFormat::Yaml)
                .required(false),
        )
        .add_source(
            Environment::with_prefix("ZKSYNC_RECEIPTS")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(env),
        )
        .build()
        .context("failed to read config")?;

    let mut config: Config = settings
        .try_deserialize()
        .context("failed to parse config")?;

    // Convert hyphens to underscores in the chain name
    config.chain_name = config.chain_name.replace('-', "_");

    Ok(config)
}

/// Gateways in front of RPC nodes answer outages with an HTML page, which then ends up in
/// the transport error. Keeps the first line of plain text from such a page.
fn strip_html(error: &str) -> String {
    let lowered = error.to_ascii_lowercase();
    if !lowered.contains("<html") && !lowered.contains("<!doctype") {
        return error.to_string();
    }

    error
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with('<') && !line.ends_with('>'))
        .unwrap_or(error)
        .to_string()
}
