//! ERC-721 gateway: ownership queries, token URI lookup, and minting.
//!
//! The contract surface matches the deployed collection contract: standard
//! ERC-721 reads plus a custom `mint(recipient, tokenURI)` entry point.

use std::collections::BTreeSet;
use std::sync::Arc;

use ethers::contract::{abigen, parse_log};
use ethers::types::{Address, H256, U256};

use crate::chain::error::ChainError;
use crate::chain::wallet::{RpcClient, WalletSession};
use crate::log_warn;

abigen!(
    CanvasNft,
    r#"[
        function balanceOf(address owner) external view returns (uint256)
        function ownerOf(uint256 tokenId) external view returns (address)
        function tokenURI(uint256 tokenId) external view returns (string)
        function name() external view returns (string)
        function symbol() external view returns (string)
        function mint(address recipient, string _tokenURI) external returns (uint256)
        event Transfer(address indexed from, address indexed to, uint256 indexed tokenId)
    ]"#
);

/// Read side of the collection contract, abstracted so the ownership
/// discovery logic can run against a mock in tests.
#[allow(async_fn_in_trait)]
pub trait Erc721Source {
    async fn balance_of(&self, owner: Address) -> Result<u64, ChainError>;
    /// Token ids carried by historical `Transfer(_, owner, id)` events.
    async fn transfers_to(&self, owner: Address) -> Result<Vec<u64>, ChainError>;
    async fn owner_of(&self, token_id: u64) -> Result<Address, ChainError>;
}

/// Discover the token ids currently owned by `owner`.
///
/// Balance zero short-circuits without touching the event log. Otherwise
/// historical transfer-in events are deduplicated and each candidate is
/// re-verified against `ownerOf`, since a token seen in an old event may
/// have been transferred away since. Candidates whose ownership lookup
/// fails are skipped rather than failing the whole scan.
pub async fn collect_owned_ids<S: Erc721Source>(
    source: &S,
    owner: Address,
) -> Result<Vec<u64>, ChainError> {
    if source.balance_of(owner).await? == 0 {
        return Ok(Vec::new());
    }

    let candidates: BTreeSet<u64> = source.transfers_to(owner).await?.into_iter().collect();
    let mut owned = Vec::new();
    for token_id in candidates {
        match source.owner_of(token_id).await {
            Ok(current) if current == owner => owned.push(token_id),
            Ok(_) => {}
            Err(e) => {
                log_warn!("Could not verify ownership of token {}: {}", token_id, e);
            }
        }
    }
    Ok(owned)
}

pub struct NftGateway {
    contract: CanvasNft<RpcClient>,
    address: Address,
    session_account: Address,
    has_code: bool,
}

impl NftGateway {
    /// Bind the gateway to `address`, probing for deployed code up front so
    /// every operation can fail fast with `ContractUnreachable`.
    pub async fn connect(session: &WalletSession, address: Address) -> Result<Self, ChainError> {
        let has_code = session.has_code_at(address).await?;
        Ok(Self {
            contract: CanvasNft::new(address, session.client()),
            address,
            session_account: session.account(),
            has_code,
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    fn ensure_reachable(&self) -> Result<(), ChainError> {
        if self.has_code {
            Ok(())
        } else {
            Err(ChainError::ContractUnreachable(self.address))
        }
    }

    /// Token ids owned by `owner` right now.
    pub async fn owned_token_ids(&self, owner: Address) -> Result<Vec<u64>, ChainError> {
        self.ensure_reachable()?;

        // Contract identity, useful when pointing the app at the wrong chain.
        match (self.contract.name().call().await, self.contract.symbol().call().await) {
            (Ok(name), Ok(symbol)) => {
                crate::log_info!("Collection contract: {} ({})", name, symbol);
            }
            _ => log_warn!("Could not read contract name/symbol"),
        }

        collect_owned_ids(self, owner).await
    }

    /// The token's URI; an empty string counts as missing.
    pub async fn token_uri(&self, token_id: u64) -> Result<String, ChainError> {
        self.ensure_reachable()?;
        let uri = self
            .contract
            .token_uri(U256::from(token_id))
            .call()
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))?;
        if uri.is_empty() {
            return Err(ChainError::TokenNotFound(token_id));
        }
        Ok(uri)
    }

    /// Mint `token_uri` to `recipient`, wait for inclusion, and pull the new
    /// token id out of the emitted Transfer event. A receipt without a
    /// decodable Transfer event is still a successful mint; the id is just
    /// unknown.
    pub async fn mint(
        &self,
        recipient: Address,
        token_uri: &str,
    ) -> Result<Option<u64>, ChainError> {
        self.ensure_reachable()?;
        let call = self.contract.mint(recipient, token_uri.to_string());
        let pending = call
            .send()
            .await
            .map_err(|e| ChainError::transaction(e.to_string()))?;
        let receipt = pending
            .await
            .map_err(|e| ChainError::transaction(e.to_string()))?
            .ok_or_else(|| ChainError::transaction("transaction dropped from the mempool"))?;

        let token_id = receipt
            .logs
            .iter()
            .filter(|log| log.address == self.address)
            .find_map(|log| parse_log::<TransferFilter>(log.clone()).ok())
            .map(|ev| ev.token_id.as_u64());
        Ok(token_id)
    }

    pub fn minting_account(&self) -> Address {
        self.session_account
    }
}

/// Mint port bound to a wallet session. The gateway is connected only when
/// the workflow reaches the transaction step, so uploads always run ahead of
/// any contract traffic.
pub struct SessionMinter {
    session: Option<Arc<WalletSession>>,
    contract: Address,
}

impl SessionMinter {
    pub fn new(session: Option<Arc<WalletSession>>, contract: Address) -> Self {
        Self { session, contract }
    }
}

impl crate::workflow::MintSink for SessionMinter {
    async fn mint(&self, recipient: Address, token_uri: &str) -> Result<Option<u64>, ChainError> {
        let session = self.session.as_ref().ok_or(ChainError::WalletNotConnected)?;
        let gateway = NftGateway::connect(session, self.contract).await?;
        gateway.mint(recipient, token_uri).await
    }
}

impl Erc721Source for NftGateway {
    async fn balance_of(&self, owner: Address) -> Result<u64, ChainError> {
        let balance = self
            .contract
            .balance_of(owner)
            .call()
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))?;
        Ok(balance.as_u64())
    }

    async fn transfers_to(&self, owner: Address) -> Result<Vec<u64>, ChainError> {
        let events = self
            .contract
            .transfer_filter()
            .topic2(H256::from(owner))
            .from_block(0u64)
            .query()
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))?;
        Ok(events.into_iter().map(|ev| ev.token_id.as_u64()).collect())
    }

    async fn owner_of(&self, token_id: u64) -> Result<Address, ChainError> {
        self.contract
            .owner_of(U256::from(token_id))
            .call()
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;

    struct MockSource {
        balance: u64,
        transfers: Vec<u64>,
        owners: HashMap<u64, Address>,
        event_queries: Cell<u32>,
        ownership_checks: RefCell<Vec<u64>>,
    }

    impl MockSource {
        fn new(balance: u64, transfers: Vec<u64>, owners: &[(u64, Address)]) -> Self {
            Self {
                balance,
                transfers,
                owners: owners.iter().copied().collect(),
                event_queries: Cell::new(0),
                ownership_checks: RefCell::new(Vec::new()),
            }
        }
    }

    impl Erc721Source for MockSource {
        async fn balance_of(&self, _owner: Address) -> Result<u64, ChainError> {
            Ok(self.balance)
        }

        async fn transfers_to(&self, _owner: Address) -> Result<Vec<u64>, ChainError> {
            self.event_queries.set(self.event_queries.get() + 1);
            Ok(self.transfers.clone())
        }

        async fn owner_of(&self, token_id: u64) -> Result<Address, ChainError> {
            self.ownership_checks.borrow_mut().push(token_id);
            self.owners
                .get(&token_id)
                .copied()
                .ok_or(ChainError::TokenNotFound(token_id))
        }
    }

    fn addr(n: u8) -> Address {
        Address::from_low_u64_be(n as u64)
    }

    #[tokio::test]
    async fn zero_balance_short_circuits_without_event_query() {
        let owner = addr(1);
        let source = MockSource::new(0, vec![1, 2, 3], &[]);
        let ids = collect_owned_ids(&source, owner).await.unwrap();
        assert!(ids.is_empty());
        assert_eq!(source.event_queries.get(), 0);
        assert!(source.ownership_checks.borrow().is_empty());
    }

    #[tokio::test]
    async fn excludes_tokens_transferred_away() {
        let owner = addr(1);
        let stranger = addr(2);
        // Token 7 was received historically but now belongs to someone else.
        let source = MockSource::new(
            2,
            vec![5, 7, 9],
            &[(5, owner), (7, stranger), (9, owner)],
        );
        let ids = collect_owned_ids(&source, owner).await.unwrap();
        assert_eq!(ids, vec![5, 9]);
    }

    #[tokio::test]
    async fn deduplicates_repeated_transfer_events() {
        let owner = addr(1);
        // The same token transferred in, out, and back in again.
        let source = MockSource::new(1, vec![4, 4, 4], &[(4, owner)]);
        let ids = collect_owned_ids(&source, owner).await.unwrap();
        assert_eq!(ids, vec![4]);
        assert_eq!(source.ownership_checks.borrow().len(), 1);
    }

    #[tokio::test]
    async fn failed_ownership_lookup_skips_token_only() {
        let owner = addr(1);
        // Token 8 has no owner entry: owner_of errors, the rest survive.
        let source = MockSource::new(2, vec![3, 8], &[(3, owner)]);
        let ids = collect_owned_ids(&source, owner).await.unwrap();
        assert_eq!(ids, vec![3]);
    }
}
