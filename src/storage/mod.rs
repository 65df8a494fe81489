//! Off-chain persistence: the decentralized-storage upload client and the
//! local append-only log of deployed tokens.

pub mod token_log;
pub mod upload;
