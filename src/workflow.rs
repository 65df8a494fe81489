//! Mint submission workflow.
//!
//! A strictly linear machine: wallet/network check, two-step upload, then
//! the mint transaction. Any failure drops the UI back to `Idle` carrying a
//! `ChainError`; there are no automatic retries, resubmission starts over.
//! The causal ordering (image before metadata before transaction) lives in
//! `storage::upload::publish_artifact` and in the step order here.

use ethers::types::Address;

use crate::chain::chain_id::is_required_chain;
use crate::chain::error::ChainError;
use crate::storage::upload::{publish_artifact, BlobStore, PublishedArtifact};

/// Where a submission currently is. The UI disables the mint control in
/// every state but `Idle`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MintPhase {
    Idle,
    AwaitingWalletCheck,
    AwaitingUpload,
    AwaitingTransaction,
    Confirmed,
}

impl MintPhase {
    /// Label for the status line while a mint is in flight.
    pub fn label(&self) -> &'static str {
        match self {
            MintPhase::Idle => "",
            MintPhase::AwaitingWalletCheck => "Checking wallet…",
            MintPhase::AwaitingUpload => "Uploading to IPFS…",
            MintPhase::AwaitingTransaction => "Minting…",
            MintPhase::Confirmed => "Minted",
        }
    }
}

/// Wallet facts the workflow needs, decoupled from the live session so the
/// machine runs the same against tests and against a real connection.
#[derive(Clone, Debug, Default)]
pub struct WalletView {
    pub account: Option<Address>,
    /// Chain id as the provider reports it: hex (`0x2105`) or decimal.
    pub chain_id: Option<String>,
}

#[derive(Clone, Debug)]
pub struct MintInput {
    pub image_png: Vec<u8>,
    pub name: String,
    pub description: String,
}

#[derive(Clone, Debug)]
pub struct MintOutcome {
    /// `None` when the receipt carried no decodable Transfer event:
    /// the token minted but its id could not be determined.
    pub token_id: Option<u64>,
    pub artifact: PublishedArtifact,
}

/// The contract's mint entry point, as a port.
#[allow(async_fn_in_trait)]
pub trait MintSink {
    async fn mint(&self, recipient: Address, token_uri: &str) -> Result<Option<u64>, ChainError>;
}

/// Drive one submission from wallet check through confirmation.
///
/// `on_phase` fires on entry to each non-`Idle` phase so the UI can narrate
/// progress; failures simply return early with the error for the caller to
/// surface.
pub async fn run_mint<S, M>(
    wallet: &WalletView,
    required_chain: u64,
    store: &S,
    minter: &M,
    input: MintInput,
    mut on_phase: impl FnMut(MintPhase),
) -> Result<MintOutcome, ChainError>
where
    S: BlobStore,
    M: MintSink,
{
    on_phase(MintPhase::AwaitingWalletCheck);
    let account = wallet.account.ok_or(ChainError::WalletNotConnected)?;
    let chain_id = wallet.chain_id.as_deref().unwrap_or("");
    if !is_required_chain(chain_id, required_chain) {
        return Err(ChainError::WrongNetwork {
            actual: if chain_id.is_empty() {
                "unknown".to_string()
            } else {
                chain_id.to_string()
            },
            required: required_chain,
        });
    }

    on_phase(MintPhase::AwaitingUpload);
    let artifact = publish_artifact(store, input.image_png, &input.name, &input.description).await?;

    on_phase(MintPhase::AwaitingTransaction);
    let token_id = minter.mint(account, &artifact.metadata_uri).await?;

    on_phase(MintPhase::Confirmed);
    Ok(MintOutcome { token_id, artifact })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    struct StubStore {
        uploads: Cell<u32>,
        fail_with: Option<String>,
    }

    impl StubStore {
        fn ok() -> Self {
            Self {
                uploads: Cell::new(0),
                fail_with: None,
            }
        }
    }

    impl BlobStore for StubStore {
        async fn upload_blob(
            &self,
            _bytes: Vec<u8>,
            _filename: &str,
            _mime: &str,
        ) -> Result<String, ChainError> {
            if let Some(msg) = &self.fail_with {
                return Err(ChainError::Upload(msg.clone()));
            }
            let n = self.uploads.get() + 1;
            self.uploads.set(n);
            Ok(if n == 1 {
                "ipfs://X".to_string()
            } else {
                "ipfs://Y".to_string()
            })
        }
    }

    struct StubMinter {
        minted_uris: RefCell<Vec<String>>,
        token_id: Option<u64>,
        fail: bool,
    }

    impl StubMinter {
        fn returning(token_id: Option<u64>) -> Self {
            Self {
                minted_uris: RefCell::new(Vec::new()),
                token_id,
                fail: false,
            }
        }
    }

    impl MintSink for StubMinter {
        async fn mint(
            &self,
            _recipient: Address,
            token_uri: &str,
        ) -> Result<Option<u64>, ChainError> {
            if self.fail {
                return Err(ChainError::transaction("user rejected"));
            }
            self.minted_uris.borrow_mut().push(token_uri.to_string());
            Ok(self.token_id)
        }
    }

    fn connected_wallet() -> WalletView {
        WalletView {
            account: Some(Address::from_low_u64_be(1)),
            chain_id: Some("0x2105".to_string()),
        }
    }

    fn input() -> MintInput {
        MintInput {
            image_png: vec![137, 80, 78, 71],
            name: "Red stroke".to_string(),
            description: "A red 5px stroke on white".to_string(),
        }
    }

    #[tokio::test]
    async fn wrong_network_halts_before_any_upload() {
        let wallet = WalletView {
            account: Some(Address::from_low_u64_be(1)),
            chain_id: Some("1".to_string()),
        };
        let store = StubStore::ok();
        let minter = StubMinter::returning(Some(1));
        let mut phases = Vec::new();

        let err = run_mint(&wallet, 8453, &store, &minter, input(), |p| phases.push(p))
            .await
            .unwrap_err();

        assert!(matches!(err, ChainError::WrongNetwork { .. }));
        assert_eq!(store.uploads.get(), 0, "no upload may be attempted");
        assert!(minter.minted_uris.borrow().is_empty());
        assert_eq!(phases, vec![MintPhase::AwaitingWalletCheck]);
    }

    #[tokio::test]
    async fn disconnected_wallet_is_rejected_first() {
        let store = StubStore::ok();
        let minter = StubMinter::returning(None);
        let err = run_mint(
            &WalletView::default(),
            8453,
            &store,
            &minter,
            input(),
            |_| {},
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ChainError::WalletNotConnected));
        assert_eq!(store.uploads.get(), 0);
    }

    #[tokio::test]
    async fn full_flow_reaches_confirmed_with_token_id() {
        let store = StubStore::ok();
        let minter = StubMinter::returning(Some(42));
        let mut phases = Vec::new();

        let outcome = run_mint(
            &connected_wallet(),
            8453,
            &store,
            &minter,
            input(),
            |p| phases.push(p),
        )
        .await
        .unwrap();

        assert_eq!(outcome.token_id, Some(42));
        assert_eq!(outcome.artifact.image_uri, "ipfs://X");
        assert_eq!(outcome.artifact.metadata_uri, "ipfs://Y");
        // The mint must be driven by the metadata URI, never the image URI.
        assert_eq!(*minter.minted_uris.borrow(), vec!["ipfs://Y".to_string()]);
        assert_eq!(
            phases,
            vec![
                MintPhase::AwaitingWalletCheck,
                MintPhase::AwaitingUpload,
                MintPhase::AwaitingTransaction,
                MintPhase::Confirmed,
            ]
        );
    }

    #[tokio::test]
    async fn decimal_chain_id_matches_required_network() {
        let wallet = WalletView {
            account: Some(Address::from_low_u64_be(1)),
            chain_id: Some("8453".to_string()),
        };
        let store = StubStore::ok();
        let minter = StubMinter::returning(Some(7));
        let outcome = run_mint(&wallet, 8453, &store, &minter, input(), |_| {})
            .await
            .unwrap();
        assert_eq!(outcome.token_id, Some(7));
    }

    #[tokio::test]
    async fn upload_failure_surfaces_verbatim_and_skips_mint() {
        let store = StubStore {
            uploads: Cell::new(0),
            fail_with: Some("storage endpoint returned 500: quota exceeded".to_string()),
        };
        let minter = StubMinter::returning(Some(1));
        let err = run_mint(&connected_wallet(), 8453, &store, &minter, input(), |_| {})
            .await
            .unwrap_err();
        assert!(err.to_string().contains("quota exceeded"));
        assert!(minter.minted_uris.borrow().is_empty());
    }

    #[tokio::test]
    async fn mint_without_transfer_event_still_confirms() {
        let store = StubStore::ok();
        let minter = StubMinter::returning(None);
        let mut phases = Vec::new();
        let outcome = run_mint(
            &connected_wallet(),
            8453,
            &store,
            &minter,
            input(),
            |p| phases.push(p),
        )
        .await
        .unwrap();
        assert_eq!(outcome.token_id, None);
        assert_eq!(phases.last(), Some(&MintPhase::Confirmed));
    }

    #[tokio::test]
    async fn transaction_failure_is_classified() {
        let store = StubStore::ok();
        let minter = StubMinter {
            minted_uris: RefCell::new(Vec::new()),
            token_id: None,
            fail: true,
        };
        let err = run_mint(&connected_wallet(), 8453, &store, &minter, input(), |_| {})
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ChainError::Transaction(crate::chain::error::TxFailure::UserRejected)
        ));
    }
}
