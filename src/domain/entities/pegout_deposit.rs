//! # Pegout Deposit
//!
//! A user deposit observed on the liquidity bridge contract.

use crate::domain::entities::pegout_quote::PegoutQuote;
use crate::domain::value_objects::{Timestamp, Wei};
use serde::{Deserialize, Serialize};

/// RBTC deposit made by a user against a pegout quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PegoutDeposit {
    /// Deposit transaction hash.
    pub tx_hash: String,
    /// Quote the deposit pays for.
    pub quote_hash: String,
    /// Deposited amount.
    pub amount: Wei,
    /// Block timestamp of the deposit.
    pub timestamp: Timestamp,
    /// Block number of the deposit.
    pub block_number: u64,
    /// Depositor address.
    pub from: String,
}

impl PegoutDeposit {
    /// Returns true if the deposit covers the quote total, happened before
    /// the quote expired, and landed no later than the expire block.
    ///
    /// A quote whose total overflows is never satisfied.
    #[must_use]
    pub fn is_valid_for_quote(&self, quote: &PegoutQuote) -> bool {
        let Ok(total) = quote.total() else {
            return false;
        };
        self.amount >= total
            && self.timestamp.is_before(&quote.expire_time())
            && self.block_number <= u64::from(quote.expire_block)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn quote(expire_date: u32) -> PegoutQuote {
        PegoutQuote {
            value: Wei::parse("500000000000000000").unwrap(),
            call_fee: Wei::parse("60000000000000000").unwrap(),
            gas_fee: Wei::parse("30000000000000000").unwrap(),
            product_fee_amount: Wei::parse("10000000000000000").unwrap(),
            expire_block: 500,
            expire_date,
            ..PegoutQuote::default()
        }
    }

    fn deposit(amount: &str, block_number: u64, timestamp: Timestamp) -> PegoutDeposit {
        PegoutDeposit {
            tx_hash: "0x01".to_string(),
            quote_hash: "ab".repeat(32),
            amount: Wei::parse(amount).unwrap(),
            timestamp,
            block_number,
            from: "0x02".to_string(),
        }
    }

    fn in_a_minute() -> u32 {
        u32::try_from(Timestamp::now().timestamp_secs() + 60).unwrap()
    }

    #[test]
    fn quote_total_matches_fixture() {
        assert_eq!(
            quote(0).total().unwrap(),
            Wei::parse("600000000000000000").unwrap()
        );
    }

    #[test]
    fn amount_too_low_is_invalid() {
        let quote = quote(in_a_minute());
        let deposit = deposit("490000000000000000", 499, Timestamp::now());
        assert!(!deposit.is_valid_for_quote(&quote));
    }

    #[test]
    fn block_too_late_is_invalid() {
        let quote = quote(in_a_minute());
        let deposit = deposit("5100000000000000000", 501, Timestamp::now());
        assert!(!deposit.is_valid_for_quote(&quote));
    }

    #[test]
    fn deposit_in_time_is_valid() {
        let quote = quote(in_a_minute());
        let deposit = deposit("5100000000000000000", 499, Timestamp::now());
        assert!(deposit.is_valid_for_quote(&quote));
    }

    #[test]
    fn deposit_after_expiry_is_invalid() {
        let quote = quote(in_a_minute());
        let deposit = deposit("5100000000000000000", 499, Timestamp::now().add_secs(120));
        assert!(!deposit.is_valid_for_quote(&quote));
    }

    proptest! {
        #[test]
        fn valid_iff_all_three_conditions_hold(
            amount in 0u64..2_000,
            block_number in 0u64..1_000,
            offset in -600i64..600,
        ) {
            let quote = PegoutQuote {
                value: Wei::from(600u64),
                call_fee: Wei::from(300u64),
                gas_fee: Wei::from(100u64),
                expire_block: 500,
                expire_date: 1_700_000_000,
                ..PegoutQuote::default()
            };
            let timestamp = Timestamp::from_unix_u32(1_700_000_000).add_secs(offset);
            let deposit = PegoutDeposit {
                tx_hash: String::new(),
                quote_hash: String::new(),
                amount: Wei::from(amount),
                timestamp,
                block_number,
                from: String::new(),
            };
            let expected = amount >= 1_000 && offset < 0 && block_number <= 500;
            prop_assert_eq!(deposit.is_valid_for_quote(&quote), expected);
        }
    }
}
