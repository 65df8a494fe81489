//! Application configuration: compiled defaults, overridden by environment
//! variables, overridden by launch flags. Everything is static for the
//! lifetime of the process.

use crate::chain::chain_id::parse_chain_id;
use crate::cli::LaunchArgs;

/// The Base mainnet collection contract the app ships pointed at.
pub const DEFAULT_CONTRACT_ADDRESS: &str = "0x272787Fe24C7F618799F5c15B731b673ada17db9";
pub const DEFAULT_RPC_URL: &str = "https://mainnet.base.org";
pub const DEFAULT_BLOCK_EXPLORER_URL: &str = "https://basescan.org";
pub const DEFAULT_STORAGE_API_URL: &str = "https://node.lighthouse.storage/api/v0/add";
pub const DEFAULT_STORAGE_GATEWAY: &str = "https://gateway.lighthouse.storage/ipfs";
/// Base mainnet.
pub const DEFAULT_CHAIN_ID: u64 = 8453;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub contract_address: String,
    pub factory_address: String,
    pub rpc_url: String,
    pub block_explorer_url: String,
    pub storage_api_url: String,
    pub storage_gateway: String,
    pub storage_api_key: String,
    pub required_chain_id: u64,
}

impl AppConfig {
    pub fn load(args: &LaunchArgs) -> Self {
        Self::from_sources(args, |name| std::env::var(name).ok())
    }

    /// The environment lookup is injected so tests are immune to whatever
    /// variables happen to be set on the machine running them.
    fn from_sources(args: &LaunchArgs, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let env = |name: &str| lookup(name).filter(|v| !v.is_empty());

        Self {
            contract_address: args
                .contract
                .clone()
                .or_else(|| env("CONTRACT_ADDRESS"))
                .unwrap_or_else(|| DEFAULT_CONTRACT_ADDRESS.to_string()),
            factory_address: args
                .factory
                .clone()
                .or_else(|| env("TOKEN_FACTORY_ADDRESS"))
                .unwrap_or_default(),
            rpc_url: args
                .rpc_url
                .clone()
                .or_else(|| env("RPC_URL"))
                .unwrap_or_else(|| DEFAULT_RPC_URL.to_string()),
            block_explorer_url: env("BLOCK_EXPLORER_URL")
                .unwrap_or_else(|| DEFAULT_BLOCK_EXPLORER_URL.to_string()),
            storage_api_url: env("STORAGE_API_URL")
                .unwrap_or_else(|| DEFAULT_STORAGE_API_URL.to_string()),
            storage_gateway: env("IPFS_GATEWAY")
                .unwrap_or_else(|| DEFAULT_STORAGE_GATEWAY.to_string()),
            storage_api_key: args
                .storage_key
                .clone()
                .or_else(|| env("LIGHTHOUSE_API_KEY"))
                .unwrap_or_default(),
            required_chain_id: args
                .chain_id
                .as_deref()
                .and_then(parse_chain_id)
                .or_else(|| env("CHAIN_ID").as_deref().and_then(parse_chain_id))
                .unwrap_or(DEFAULT_CHAIN_ID),
        }
    }

    /// Explorer page for one NFT.
    pub fn nft_explorer_url(&self, contract: &str, token_id: u64) -> String {
        format!(
            "{}/nft/{}/{}",
            self.block_explorer_url.trim_end_matches('/'),
            contract,
            token_id
        )
    }

    /// Explorer page for a deployed token contract.
    pub fn token_explorer_url(&self, address: &str) -> String {
        format!(
            "{}/token/{}",
            self.block_explorer_url.trim_end_matches('/'),
            address
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn launch_flags_override_defaults() {
        let args = LaunchArgs {
            rpc_url: Some("http://localhost:8545".to_string()),
            contract: Some("0x0000000000000000000000000000000000000042".to_string()),
            chain_id: Some("0x7a69".to_string()),
            ..Default::default()
        };
        let config = AppConfig::from_sources(&args, |_| None);
        assert_eq!(config.rpc_url, "http://localhost:8545");
        assert_eq!(
            config.contract_address,
            "0x0000000000000000000000000000000000000042"
        );
        assert_eq!(config.required_chain_id, 0x7a69);
    }

    #[test]
    fn defaults_point_at_base_mainnet() {
        let config = AppConfig::from_sources(&LaunchArgs::default(), |_| None);
        assert_eq!(config.required_chain_id, DEFAULT_CHAIN_ID);
        assert_eq!(config.rpc_url, DEFAULT_RPC_URL);
        assert_eq!(config.contract_address, DEFAULT_CONTRACT_ADDRESS);
    }

    #[test]
    fn env_layer_sits_between_flags_and_defaults() {
        let fake_env = |name: &str| match name {
            "RPC_URL" => Some("http://env-host:8545".to_string()),
            "CHAIN_ID" => Some("10".to_string()),
            _ => None,
        };

        let config = AppConfig::from_sources(&LaunchArgs::default(), fake_env);
        assert_eq!(config.rpc_url, "http://env-host:8545");
        assert_eq!(config.required_chain_id, 10);

        // A launch flag beats the environment.
        let args = LaunchArgs {
            rpc_url: Some("http://flag-host:8545".to_string()),
            ..Default::default()
        };
        let config = AppConfig::from_sources(&args, fake_env);
        assert_eq!(config.rpc_url, "http://flag-host:8545");
        assert_eq!(config.required_chain_id, 10);
    }

    #[test]
    fn explorer_urls_are_well_formed() {
        let config = AppConfig::from_sources(&LaunchArgs::default(), |_| None);
        assert_eq!(
            config.nft_explorer_url("0xabc", 42),
            format!("{}/nft/0xabc/42", DEFAULT_BLOCK_EXPLORER_URL)
        );
        assert_eq!(
            config.token_explorer_url("0xdef"),
            format!("{}/token/0xdef", DEFAULT_BLOCK_EXPLORER_URL)
        );
    }
}
