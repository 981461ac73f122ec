//! # Contract Ports
//!
//! Bindings of the liquidity bridge contract (LBC) and the RSK bridge.

use super::client::{BlockchainResult, TransactionConfig, TransactionReceipt, TxHash};
use crate::domain::entities::{PegoutDeposit, PeginQuote};
use crate::domain::value_objects::{Timestamp, Wei};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pause state of a contract.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PauseStatus {
    /// True while the contract rejects new operations.
    pub is_paused: bool,
    /// Reason given when pausing.
    pub reason: String,
    /// When the contract was paused.
    pub since: Option<Timestamp>,
}

/// Arguments of `refundPegOut`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefundPegoutParams {
    /// Quote hash.
    pub quote_hash: [u8; 32],
    /// Serialized BTC payment made by the LP.
    pub btc_raw_tx: Vec<u8>,
    /// Header hash of the block including the payment.
    pub btc_block_header_hash: [u8; 32],
    /// Merkle branch bit path.
    pub merkle_branch_path: u64,
    /// Merkle branch sibling hashes.
    pub merkle_branch_hashes: Vec<[u8; 32]>,
}

/// Arguments of `registerPegIn`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterPeginParams {
    /// LP signature over the quote hash.
    pub quote_signature: Vec<u8>,
    /// Serialized user BTC deposit.
    pub bitcoin_raw_transaction: Vec<u8>,
    /// Serialized partial merkle tree of the deposit.
    pub partial_merkle_tree: Vec<u8>,
    /// Height of the block including the deposit.
    pub block_height: u64,
    /// Quote terms.
    pub quote: PeginQuote,
}

/// Inputs of the flyover deposit address derivation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlyoverDerivationArgs {
    /// Quote hash.
    pub quote_hash: [u8; 32],
    /// User BTC refund address.
    pub user_btc_refund_address: String,
    /// LP BTC address.
    pub lp_btc_address: String,
    /// LBC address.
    pub lbc_address: String,
}

/// A deposit decoded from an LBC receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDeposit {
    /// Contract that emitted the log.
    pub contract_address: String,
    /// Decoded deposit.
    pub deposit: PegoutDeposit,
}

/// The liquidity bridge contract.
#[async_trait]
pub trait LiquidityBridgeContract: Send + Sync + fmt::Debug {
    /// Returns the contract address.
    fn address(&self) -> String;

    /// Returns whether the contract is paused.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails.
    async fn paused_status(&self) -> BlockchainResult<PauseStatus>;

    /// Returns the LP balance held by the contract.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails.
    async fn get_balance(&self, address: &str) -> BlockchainResult<Wei>;

    /// Returns true if the contract already settled the pegout.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails.
    async fn is_pegout_quote_completed(&self, quote_hash: &str) -> BlockchainResult<bool>;

    /// Decodes the `PegOutDeposit` log of a receipt.
    ///
    /// # Errors
    ///
    /// Returns a decoding error if the receipt has no such log.
    fn parse_pegout_deposit(&self, receipt: &TransactionReceipt) -> BlockchainResult<ParsedDeposit>;

    /// Scans `PegOutDeposit` logs between two blocks, both inclusive.
    ///
    /// # Errors
    ///
    /// Returns an error if the log query fails.
    async fn get_deposit_events(
        &self,
        from_block: u64,
        to_block: u64,
    ) -> BlockchainResult<Vec<PegoutDeposit>>;

    /// Claims a pegout deposit by proving the BTC payment.
    ///
    /// # Errors
    ///
    /// Returns [`BlockchainError::WaitingForBridge`] if the bridge has not
    /// seen the payment yet, any other error if the call fails.
    ///
    /// [`BlockchainError::WaitingForBridge`]: super::client::BlockchainError::WaitingForBridge
    async fn refund_pegout(
        &self,
        config: TransactionConfig,
        params: RefundPegoutParams,
    ) -> BlockchainResult<TxHash>;

    /// Performs the call of a pegin on behalf of the user.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction fails.
    async fn call_for_user(
        &self,
        config: TransactionConfig,
        quote: PeginQuote,
    ) -> BlockchainResult<TxHash>;

    /// Registers a pegin so the LP recovers the BTC deposit.
    ///
    /// # Errors
    ///
    /// Returns [`BlockchainError::WaitingForBridge`] if the bridge has not
    /// seen the deposit yet, any other error if the call fails.
    ///
    /// [`BlockchainError::WaitingForBridge`]: super::client::BlockchainError::WaitingForBridge
    async fn register_pegin(&self, params: RegisterPeginParams) -> BlockchainResult<TxHash>;

    /// Returns the product fee percentage, scaled by `10^8`.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails.
    async fn product_fee_percentage(&self) -> BlockchainResult<u64>;

    /// Returns the minimum collateral an LP must keep.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails.
    async fn get_minimum_collateral(&self) -> BlockchainResult<Wei>;

    /// Returns the pegin collateral of an LP.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails.
    async fn get_collateral(&self, address: &str) -> BlockchainResult<Wei>;

    /// Returns the pegout collateral of an LP.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails.
    async fn get_pegout_collateral(&self, address: &str) -> BlockchainResult<Wei>;

    /// Adds pegin collateral.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction fails.
    async fn add_collateral(&self, amount: Wei) -> BlockchainResult<()>;

    /// Adds pegout collateral.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction fails.
    async fn add_pegout_collateral(&self, amount: Wei) -> BlockchainResult<()>;

    /// Withdraws all pegin collateral of a resigned LP.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction fails.
    async fn withdraw_collateral(&self) -> BlockchainResult<()>;

    /// Withdraws all pegout collateral of a resigned LP.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction fails.
    async fn withdraw_pegout_collateral(&self) -> BlockchainResult<()>;
}

/// The RSK bridge (federation) contract.
#[async_trait]
pub trait Bridge: Send + Sync + fmt::Debug {
    /// Returns the bridge address.
    fn address(&self) -> String;

    /// Returns the minimum value the bridge converts.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails.
    async fn get_minimum_lock_tx_value(&self) -> BlockchainResult<Wei>;

    /// Returns the BTC confirmations the bridge requires on a deposit.
    fn required_tx_confirmations(&self) -> u64;

    /// Derives the BTC address a pegin user deposits to.
    ///
    /// # Errors
    ///
    /// Returns an error if an address cannot be decoded or the federation
    /// cannot be read.
    async fn flyover_deposit_address(&self, args: FlyoverDerivationArgs)
    -> BlockchainResult<String>;
}
