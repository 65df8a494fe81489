//! Blockchain-facing side of the app: wallet session, chain-id predicates,
//! the ERC-721 gateway, the token factory gateway, and the shared error
//! taxonomy. Everything network-bound is async and runs on worker threads.

pub mod chain_id;
pub mod contract;
pub mod error;
pub mod factory;
pub mod wallet;

pub use error::{ChainError, TxFailure};
