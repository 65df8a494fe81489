//! Error taxonomy for wallet, storage, and contract operations.
//!
//! Every variant is recoverable: errors travel back to the UI thread and
//! surface as transient toasts, never as panics.

use ethers::types::Address;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ChainError {
    #[error("Please connect your wallet")]
    WalletNotConnected,

    #[error("Wrong network: connected to chain {actual}, expected chain {required}")]
    WrongNetwork { actual: String, required: u64 },

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Gas estimation failed: {0}")]
    GasEstimationFailed(String),

    #[error("{0}")]
    Transaction(TxFailure),

    #[error("No contract is deployed at {0:?}")]
    ContractUnreachable(Address),

    #[error("Token URI not found for token {0}")]
    TokenNotFound(u64),

    #[error("Fetch failed: {0}")]
    Fetch(String),

    #[error("Could not parse token metadata: {0}")]
    MetadataParse(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("{0}")]
    Validation(String),

    #[error("Wallet error: {0}")]
    Wallet(String),

    #[error("RPC error: {0}")]
    Rpc(String),
}

impl ChainError {
    /// Wrap a state-changing call failure, classifying the common cases.
    pub fn transaction(message: impl Into<String>) -> Self {
        ChainError::Transaction(TxFailure::classify(&message.into()))
    }
}

/// Why a state-changing transaction failed. The common cases get their own
/// user-facing message; everything else keeps the underlying reason.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TxFailure {
    #[error("Insufficient funds. Please ensure you have enough ETH for gas.")]
    InsufficientFunds,

    #[error("Transaction was rejected by user.")]
    UserRejected,

    #[error("Gas limit too low. Please try again.")]
    GasTooLow,

    #[error("Transaction failed: {0}")]
    Other(String),
}

impl TxFailure {
    /// Classify a raw provider/contract error message by substring, the way
    /// wallet libraries report these conditions.
    pub fn classify(message: &str) -> Self {
        let lower = message.to_lowercase();
        if lower.contains("insufficient funds") {
            TxFailure::InsufficientFunds
        } else if lower.contains("user rejected") || lower.contains("rejected by user") {
            TxFailure::UserRejected
        } else if lower.contains("gas required exceeds allowance") {
            TxFailure::GasTooLow
        } else {
            TxFailure::Other(message.to_string())
        }
    }
}
