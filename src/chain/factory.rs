//! Token factory gateway: deploy an ERC-20 through the factory contract and
//! record the deployment locally.
//!
//! The deployment flow is deliberately staged: validate everything locally,
//! estimate gas (a cheap dry run that catches reverts before anything is
//! signed), then send and wait. Each stage fails with its own error kind.

use ethers::contract::abigen;
use ethers::types::{Address, U256};
use ethers::utils::{format_units, parse_units};

use crate::chain::error::ChainError;
use crate::chain::wallet::{RpcClient, WalletSession};
use crate::log_info;
use crate::storage::token_log::{DeployedTokenRecord, TokenLog};

abigen!(
    TokenFactory,
    r#"[
        function createToken(string name, string symbol, uint256 initialSupply, address recipient) returns (address)
        function getTokenInfo(address tokenAddress) view returns (string name, string symbol, uint256 totalSupply)
    ]"#
);

/// All tokens minted by the factory use 18 decimal places.
pub const TOKEN_DECIMALS: u32 = 18;

/// Fully validated deployment parameters, supply already in base units.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenParams {
    pub name: String,
    pub symbol: String,
    pub initial_supply: U256,
    pub recipient: Address,
}

/// The factory's write side, abstracted for testing the deployment flow.
#[allow(async_fn_in_trait)]
pub trait TokenCreator {
    /// Dry-run the creation call. Failure means nothing was sent.
    async fn estimate_create(&self, params: &TokenParams) -> Result<(), ChainError>;
    /// Send the creation transaction, wait for inclusion, and return the
    /// deployed token's address.
    async fn create(&self, params: &TokenParams) -> Result<Address, ChainError>;
}

/// Validate inputs, convert the human-readable supply, and run the staged
/// deployment. On success the deployment is appended to `log`; a log write
/// failure does not undo an already-successful deployment.
pub async fn deploy_token<C: TokenCreator, L: TokenLog>(
    creator: &C,
    log: &mut L,
    name: &str,
    symbol: &str,
    initial_supply: &str,
    recipient: &str,
) -> Result<Address, ChainError> {
    let params = validate_params(name, symbol, initial_supply, recipient)?;

    creator.estimate_create(&params).await?;
    let address = creator.create(&params).await?;

    let record = DeployedTokenRecord::now(
        format!("{:#x}", address),
        params.name.clone(),
        params.symbol.clone(),
    );
    if let Err(e) = log.append(record) {
        crate::log_warn!("Token deployed but could not record it locally: {}", e);
    }
    Ok(address)
}

/// All validation happens here, before any network traffic.
pub fn validate_params(
    name: &str,
    symbol: &str,
    initial_supply: &str,
    recipient: &str,
) -> Result<TokenParams, ChainError> {
    if name.trim().is_empty() || symbol.trim().is_empty() || initial_supply.trim().is_empty() {
        return Err(ChainError::Validation(
            "All parameters are required".to_string(),
        ));
    }
    let recipient: Address = recipient
        .trim()
        .parse()
        .map_err(|_| ChainError::InvalidAddress(recipient.trim().to_string()))?;
    let initial_supply: U256 = parse_units(initial_supply.trim(), TOKEN_DECIMALS)
        .map_err(|e| ChainError::Validation(format!("Invalid supply: {}", e)))?
        .into();
    Ok(TokenParams {
        name: name.trim().to_string(),
        symbol: symbol.trim().to_string(),
        initial_supply,
        recipient,
    })
}

/// Read-through info about a factory-deployed token.
#[derive(Clone, Debug)]
pub struct TokenInfo {
    pub name: String,
    pub symbol: String,
    /// Total supply formatted back to a human-readable decimal string.
    pub total_supply: String,
}

pub struct FactoryGateway {
    contract: TokenFactory<RpcClient>,
}

impl FactoryGateway {
    pub fn new(session: &WalletSession, factory_address: Address) -> Self {
        Self {
            contract: TokenFactory::new(factory_address, session.client()),
        }
    }

    pub async fn token_info(&self, token_address: Address) -> Result<TokenInfo, ChainError> {
        let (name, symbol, total_supply) = self
            .contract
            .get_token_info(token_address)
            .call()
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))?;
        let total_supply = format_units(total_supply, TOKEN_DECIMALS)
            .map_err(|e| ChainError::Rpc(e.to_string()))?;
        Ok(TokenInfo {
            name,
            symbol,
            total_supply,
        })
    }
}

impl TokenCreator for FactoryGateway {
    async fn estimate_create(&self, params: &TokenParams) -> Result<(), ChainError> {
        let call = self.contract.create_token(
            params.name.clone(),
            params.symbol.clone(),
            params.initial_supply,
            params.recipient,
        );
        let estimate = call
            .estimate_gas()
            .await
            .map_err(|e| ChainError::GasEstimationFailed(e.to_string()))?;
        log_info!("createToken gas estimate: {}", estimate);
        Ok(())
    }

    async fn create(&self, params: &TokenParams) -> Result<Address, ChainError> {
        let call = self.contract.create_token(
            params.name.clone(),
            params.symbol.clone(),
            params.initial_supply,
            params.recipient,
        );
        let pending = call
            .send()
            .await
            .map_err(|e| ChainError::transaction(e.to_string()))?;
        let receipt = pending
            .await
            .map_err(|e| ChainError::transaction(e.to_string()))?
            .ok_or_else(|| ChainError::transaction("transaction dropped from the mempool"))?;

        // The deployed token's address is carried by the first emitted log.
        let address = receipt
            .logs
            .first()
            .map(|log| log.address)
            .ok_or_else(|| {
                ChainError::transaction("creation receipt carried no logs".to_string())
            })?;
        log_info!("Token deployed at {:#x}", address);
        Ok(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::error::TxFailure;
    use crate::storage::token_log::MemoryTokenLog;
    use std::cell::Cell;

    struct MockCreator {
        estimate_calls: Cell<u32>,
        create_calls: Cell<u32>,
        estimate_result: Result<(), ChainError>,
        create_result: Result<Address, ChainError>,
    }

    impl MockCreator {
        fn succeeding(address: Address) -> Self {
            Self {
                estimate_calls: Cell::new(0),
                create_calls: Cell::new(0),
                estimate_result: Ok(()),
                create_result: Ok(address),
            }
        }
    }

    impl TokenCreator for MockCreator {
        async fn estimate_create(&self, _params: &TokenParams) -> Result<(), ChainError> {
            self.estimate_calls.set(self.estimate_calls.get() + 1);
            self.estimate_result.clone()
        }

        async fn create(&self, _params: &TokenParams) -> Result<Address, ChainError> {
            self.create_calls.set(self.create_calls.get() + 1);
            self.create_result.clone()
        }
    }

    fn addr(n: u8) -> Address {
        Address::from_low_u64_be(n as u64)
    }

    #[tokio::test]
    async fn invalid_recipient_fails_before_any_network_call() {
        let creator = MockCreator::succeeding(addr(9));
        let mut log = MemoryTokenLog::default();
        let err = deploy_token(&creator, &mut log, "Tok", "TOK", "1000000", "not-an-address")
            .await
            .unwrap_err();
        assert!(matches!(err, ChainError::InvalidAddress(_)));
        assert_eq!(creator.estimate_calls.get(), 0);
        assert_eq!(creator.create_calls.get(), 0);
        assert!(log.records().is_empty());
    }

    #[tokio::test]
    async fn empty_fields_fail_validation() {
        assert!(validate_params("", "TOK", "1", "0x0000000000000000000000000000000000000001").is_err());
        assert!(validate_params("Tok", "", "1", "0x0000000000000000000000000000000000000001").is_err());
        assert!(validate_params("Tok", "TOK", "", "0x0000000000000000000000000000000000000001").is_err());
    }

    #[test]
    fn supply_converts_to_base_units() {
        let params = validate_params(
            "Tok",
            "TOK",
            "1000000",
            "0x0000000000000000000000000000000000000001",
        )
        .unwrap();
        let expected = U256::from(1_000_000u64) * U256::exp10(TOKEN_DECIMALS as usize);
        assert_eq!(params.initial_supply, expected);

        // Fractional supplies are legal, 18 places fixed.
        let params = validate_params(
            "Tok",
            "TOK",
            "0.5",
            "0x0000000000000000000000000000000000000001",
        )
        .unwrap();
        assert_eq!(params.initial_supply, U256::exp10(17));
    }

    #[tokio::test]
    async fn gas_estimation_failure_sends_nothing() {
        let creator = MockCreator {
            estimate_calls: Cell::new(0),
            create_calls: Cell::new(0),
            estimate_result: Err(ChainError::GasEstimationFailed("execution reverted".into())),
            create_result: Ok(addr(9)),
        };
        let mut log = MemoryTokenLog::default();
        let err = deploy_token(
            &creator,
            &mut log,
            "Tok",
            "TOK",
            "10",
            "0x0000000000000000000000000000000000000001",
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ChainError::GasEstimationFailed(_)));
        assert_eq!(creator.create_calls.get(), 0);
        assert!(log.records().is_empty());
    }

    #[tokio::test]
    async fn successful_deployment_is_recorded() {
        let creator = MockCreator::succeeding(addr(0xAB));
        let mut log = MemoryTokenLog::default();
        let address = deploy_token(
            &creator,
            &mut log,
            "Canvas Coin",
            "CNV",
            "21000000",
            "0x0000000000000000000000000000000000000002",
        )
        .await
        .unwrap();
        assert_eq!(address, addr(0xAB));

        let records = log.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Canvas Coin");
        assert_eq!(records[0].symbol, "CNV");
        assert_eq!(records[0].address, format!("{:#x}", addr(0xAB)));
        assert!(records[0].timestamp > 0);
    }

    #[tokio::test]
    async fn creation_failure_maps_through_classification() {
        let creator = MockCreator {
            estimate_calls: Cell::new(0),
            create_calls: Cell::new(0),
            estimate_result: Ok(()),
            create_result: Err(ChainError::transaction(
                "err: insufficient funds for gas * price + value",
            )),
        };
        let mut log = MemoryTokenLog::default();
        let err = deploy_token(
            &creator,
            &mut log,
            "Tok",
            "TOK",
            "10",
            "0x0000000000000000000000000000000000000001",
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            ChainError::Transaction(TxFailure::InsufficientFunds)
        ));
        assert!(log.records().is_empty());
    }
}
