//! # Bitcoin Ports
//!
//! The LP's Bitcoin wallet and read access to the Bitcoin network.

use super::client::BlockchainResult;
use crate::domain::value_objects::{Timestamp, Wei};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Bitcoin output script types a user may pay out to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BtcAddressType {
    /// Pay to public key hash.
    #[default]
    P2pkh,
    /// Pay to script hash.
    P2sh,
    /// Pay to witness public key hash.
    P2wpkh,
    /// Pay to witness script hash.
    P2wsh,
    /// Pay to taproot.
    P2tr,
}

impl fmt::Display for BtcAddressType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::P2pkh => write!(f, "p2pkh"),
            Self::P2sh => write!(f, "p2sh"),
            Self::P2wpkh => write!(f, "p2wpkh"),
            Self::P2wsh => write!(f, "p2wsh"),
            Self::P2tr => write!(f, "p2tr"),
        }
    }
}

/// Outcome of a wallet payment.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BitcoinTransactionResult {
    /// Transaction id.
    pub hash: String,
    /// Fee paid.
    pub fee: Wei,
}

/// Confirmation status and outputs of a Bitcoin transaction.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BitcoinTransactionInformation {
    /// Transaction id.
    pub hash: String,
    /// Number of confirmations.
    pub confirmations: u64,
    /// Output amounts grouped by destination address.
    pub outputs: HashMap<String, Vec<Wei>>,
}

impl BitcoinTransactionInformation {
    /// Returns the total paid to `address` by this transaction.
    #[must_use]
    pub fn amount_to_address(&self, address: &str) -> Wei {
        self.outputs
            .get(address)
            .map(|amounts| amounts.iter().fold(Wei::zero(), |acc, v| acc.saturating_add(*v)))
            .unwrap_or_default()
    }
}

/// Block that included a Bitcoin transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitcoinBlockInformation {
    /// Block hash, internal byte order.
    pub hash: [u8; 32],
    /// Block height.
    pub height: u64,
    /// Block time.
    pub time: Timestamp,
}

/// Merkle inclusion proof of a transaction in its block.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MerkleBranch {
    /// Sibling hashes from leaf to root.
    pub hashes: Vec<[u8; 32]>,
    /// Bit path, one bit per level.
    pub path: u64,
}

/// The LP's Bitcoin wallet.
#[async_trait]
pub trait BitcoinWallet: Send + Sync + fmt::Debug {
    /// Returns the spendable balance, in wei.
    ///
    /// # Errors
    ///
    /// Returns an error if the wallet is unreachable.
    async fn get_balance(&self) -> BlockchainResult<Wei>;

    /// Estimates the fee of paying `value` to `address`.
    ///
    /// # Errors
    ///
    /// Returns an error if the wallet cannot build the transaction.
    async fn estimate_tx_fees(&self, address: &str, value: Wei) -> BlockchainResult<Wei>;

    /// Pays `value` to `address` with an extra `OP_RETURN` output carrying
    /// `data`.
    ///
    /// # Arguments
    ///
    /// * `address` - Destination address
    /// * `value` - Amount in wei, rounded down to satoshis by the wallet
    /// * `data` - Payload of the `OP_RETURN` output
    ///
    /// # Errors
    ///
    /// Returns an error if the payment could not be broadcast.
    async fn send_with_op_return(
        &self,
        address: &str,
        value: Wei,
        data: &[u8],
    ) -> BlockchainResult<BitcoinTransactionResult>;
}

/// Read access to the Bitcoin network.
#[async_trait]
pub trait BitcoinNetwork: Send + Sync + fmt::Debug {
    /// Returns confirmations and outputs of a transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the node is unreachable or the tx is unknown.
    async fn get_transaction_info(&self, tx_hash: &str)
    -> BlockchainResult<BitcoinTransactionInformation>;

    /// Returns the serialized transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the node is unreachable or the tx is unknown.
    async fn get_raw_transaction(&self, tx_hash: &str) -> BlockchainResult<Vec<u8>>;

    /// Returns the serialized partial merkle tree proving the transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the tx is not yet mined.
    async fn get_partial_merkle_tree(&self, tx_hash: &str) -> BlockchainResult<Vec<u8>>;

    /// Returns the block that included the transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the tx is not yet mined.
    async fn get_transaction_block_info(
        &self,
        tx_hash: &str,
    ) -> BlockchainResult<BitcoinBlockInformation>;

    /// Builds the merkle branch of the transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the tx is not yet mined.
    async fn build_merkle_branch(&self, tx_hash: &str) -> BlockchainResult<MerkleBranch>;

    /// Returns the all-zero address of the given type on this network, used
    /// for fee estimation.
    ///
    /// # Errors
    ///
    /// Returns an error if the type is not supported by the network.
    fn get_zero_address(&self, address_type: BtcAddressType) -> BlockchainResult<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_to_address_sums_outputs() {
        let mut outputs = HashMap::new();
        outputs.insert(
            "2N".to_string(),
            vec![Wei::from_satoshis(5), Wei::from_satoshis(7)],
        );
        let info = BitcoinTransactionInformation {
            hash: "tx".to_string(),
            confirmations: 1,
            outputs,
        };
        assert_eq!(info.amount_to_address("2N"), Wei::from_satoshis(12));
        assert_eq!(info.amount_to_address("other"), Wei::zero());
    }

    #[test]
    fn default_address_type_is_p2pkh() {
        assert_eq!(BtcAddressType::default(), BtcAddressType::P2pkh);
        assert_eq!(BtcAddressType::P2wpkh.to_string(), "p2wpkh");
    }
}
