//! # Batch Pegout
//!
//! A bridge release that paid out BTC for several pegout refunds at once.

use serde::{Deserialize, Serialize};

/// Release of a batch of pegouts observed on the bridge.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchPegOut {
    /// RSK transaction that emitted the release event.
    pub transaction_hash: String,
    /// RSK block hash of the release.
    pub block_hash: String,
    /// RSK block number of the release.
    pub block_number: u64,
    /// BTC transaction paying out the batch.
    pub btc_tx_hash: String,
    /// RSK transactions (bridge refunds) covered by the batch.
    pub release_rsk_tx_hashes: Vec<String>,
}

impl BatchPegOut {
    /// Returns true if the batch covers the given bridge transaction.
    #[must_use]
    pub fn contains(&self, rsk_tx_hash: &str) -> bool {
        self.release_rsk_tx_hashes
            .iter()
            .any(|hash| hash.eq_ignore_ascii_case(rsk_tx_hash))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_ignores_hex_case() {
        let batch = BatchPegOut {
            release_rsk_tx_hashes: vec!["0xABCD".to_string()],
            ..BatchPegOut::default()
        };
        assert!(batch.contains("0xabcd"));
        assert!(!batch.contains("0xabce"));
    }
}
