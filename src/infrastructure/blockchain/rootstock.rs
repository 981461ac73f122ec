//! # Rootstock Ports
//!
//! Read access to the RSK network and the LP's RSK wallet.

use super::client::{BlockInfo, BlockchainResult, TransactionConfig, TransactionReceipt};
use crate::domain::value_objects::Wei;
use async_trait::async_trait;
use std::fmt;

/// The all-zero RSK address.
pub const RSK_ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// Returns true for `0x` followed by 40 hex digits.
#[must_use]
pub fn is_rsk_address(address: &str) -> bool {
    address
        .strip_prefix("0x")
        .is_some_and(|hex| hex.len() == 40 && hex.chars().all(|c| c.is_ascii_hexdigit()))
}

/// Read access to the RSK network.
#[async_trait]
pub trait RootstockRpc: Send + Sync + fmt::Debug {
    /// Returns the current block number.
    ///
    /// # Errors
    ///
    /// Returns an error if the RPC call fails.
    async fn get_height(&self) -> BlockchainResult<u64>;

    /// Returns the current gas price.
    ///
    /// # Errors
    ///
    /// Returns an error if the RPC call fails.
    async fn gas_price(&self) -> BlockchainResult<Wei>;

    /// Returns the balance of an address.
    ///
    /// # Errors
    ///
    /// Returns an error if the RPC call fails.
    async fn get_balance(&self, address: &str) -> BlockchainResult<Wei>;

    /// Returns the receipt of a mined transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the RPC call fails or the tx is not mined.
    async fn get_transaction_receipt(&self, tx_hash: &str) -> BlockchainResult<TransactionReceipt>;

    /// Returns the header data of a block.
    ///
    /// # Errors
    ///
    /// Returns an error if the RPC call fails or the block is unknown.
    async fn get_block_by_hash(&self, block_hash: &str) -> BlockchainResult<BlockInfo>;

    /// Estimates the gas of a call.
    ///
    /// # Arguments
    ///
    /// * `to` - Destination address
    /// * `value` - Value sent
    /// * `data` - Calldata
    ///
    /// # Errors
    ///
    /// Returns an error if gas estimation fails.
    async fn estimate_gas(&self, to: &str, value: Wei, data: &[u8]) -> BlockchainResult<u64>;
}

/// The LP's RSK wallet.
#[async_trait]
pub trait RootstockWallet: Send + Sync + fmt::Debug {
    /// Returns the wallet address.
    fn address(&self) -> String;

    /// Returns the wallet balance.
    ///
    /// # Errors
    ///
    /// Returns an error if the RPC call fails.
    async fn get_balance(&self) -> BlockchainResult<Wei>;

    /// Sends RBTC and waits for the receipt.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction fails. A receipt of a mined but
    /// reverted transaction is reported as [`BlockchainError::Reverted`].
    ///
    /// [`BlockchainError::Reverted`]: super::client::BlockchainError::Reverted
    async fn send_rbtc(
        &self,
        config: TransactionConfig,
        to: &str,
    ) -> BlockchainResult<TransactionReceipt>;
}
