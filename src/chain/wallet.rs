//! Wallet session: an RPC endpoint plus a signing key.
//!
//! The desktop app has no browser wallet extension to talk to, so
//! "connecting" means building an ethers client from an RPC URL and a
//! private key the user supplies. Disconnecting is dropping the session.

use std::sync::Arc;

use ethers::middleware::SignerMiddleware;
use ethers::providers::{Http, Middleware, Provider};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::Address;

use crate::chain::error::ChainError;

pub type RpcClient = SignerMiddleware<Provider<Http>, LocalWallet>;

/// A connected account: provider, signer, and the chain it reported.
pub struct WalletSession {
    client: Arc<RpcClient>,
    account: Address,
    chain_id: u64,
}

impl WalletSession {
    /// Build a session against `rpc_url` signing as `private_key`.
    ///
    /// Queries the endpoint's chain id so the signer produces replay-protected
    /// signatures and so the mint workflow can check the network before doing
    /// anything else.
    pub async fn connect(rpc_url: &str, private_key: &str) -> Result<Self, ChainError> {
        let provider = Provider::<Http>::try_from(rpc_url)
            .map_err(|e| ChainError::Rpc(format!("Invalid RPC URL: {}", e)))?;
        let chain_id = provider
            .get_chainid()
            .await
            .map_err(|e| ChainError::Rpc(format!("Could not reach {}: {}", rpc_url, e)))?
            .as_u64();

        let key = private_key.trim().trim_start_matches("0x");
        let wallet: LocalWallet = key
            .parse()
            .map_err(|e| ChainError::Wallet(format!("Invalid private key: {}", e)))?;
        let wallet = wallet.with_chain_id(chain_id);
        let account = wallet.address();

        Ok(Self {
            client: Arc::new(SignerMiddleware::new(provider, wallet)),
            account,
            chain_id,
        })
    }

    pub fn client(&self) -> Arc<RpcClient> {
        Arc::clone(&self.client)
    }

    pub fn account(&self) -> Address {
        self.account
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Chain id in the hex form wallet providers report (`"0x2105"`).
    pub fn chain_id_hex(&self) -> String {
        format!("{:#x}", self.chain_id)
    }

    /// `0x1234…abcd` shortened form for the nav bar.
    pub fn account_short(&self) -> String {
        let full = format!("{:#x}", self.account);
        if full.len() > 10 {
            format!("{}…{}", &full[..6], &full[full.len() - 4..])
        } else {
            full
        }
    }

    /// Whether any code is deployed at `address`.
    pub async fn has_code_at(&self, address: Address) -> Result<bool, ChainError> {
        let code = self
            .client
            .get_code(address, None)
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))?;
        Ok(!code.is_empty())
    }
}
