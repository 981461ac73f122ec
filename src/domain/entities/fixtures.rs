//! Builders shared by tests across layers.

#![allow(clippy::unwrap_used)]

use super::{
    PegoutCreationData, PegoutQuote, PeginQuote, RetainedPeginQuote, RetainedPegoutQuote,
    WatchedPegoutQuote,
};
use crate::domain::value_objects::{PeginState, PegoutState, Timestamp, Wei};

/// A 64 hex char quote hash derived from `seed`.
pub(crate) fn quote_hash(seed: u8) -> String {
    format!("{seed:02x}").repeat(32)
}

/// Unix seconds `offset` seconds from now.
pub(crate) fn unix_from_now(offset: i64) -> u32 {
    u32::try_from(Timestamp::now().add_secs(offset).timestamp_secs()).unwrap()
}

/// A pegout quote expiring in an hour.
pub(crate) fn pegout_quote(value: u64, call_fee: u64, gas_fee: u64) -> PegoutQuote {
    PegoutQuote {
        lbc_address: "0xc2a630c053d12d63d32b025082f6ba268db18300".to_string(),
        lp_rsk_address: "0x9d93929a9099be4355fc2389fbf253982f9df47c".to_string(),
        btc_refund_address: "mnYcQxCZBbmLzNfE9BhV7E8E2u7amdz5y6".to_string(),
        rsk_refund_address: "0x79568c2989232dcb1e2a4b7e6c1d7bc8d9a4a6f3".to_string(),
        lp_btc_address: "mxqk28jvEtvjxRN8k7W9hFEJfWz5VcUgHW".to_string(),
        call_fee: Wei::from(call_fee),
        penalty_fee: Wei::from(10u64),
        deposit_address: "mnYcQxCZBbmLzNfE9BhV7E8E2u7amdz5y6".to_string(),
        value: Wei::from(value),
        agreement_timestamp: unix_from_now(-60),
        deposit_date_limit: unix_from_now(3600),
        deposit_confirmations: 10,
        transfer_confirmations: 2,
        transfer_time: 600,
        expire_date: unix_from_now(3600),
        expire_block: 5_000,
        gas_fee: Wei::from(gas_fee),
        ..PegoutQuote::default()
    }
}

/// A retained pegout quote in the given state.
pub(crate) fn retained_pegout(hash: &str, state: PegoutState) -> RetainedPegoutQuote {
    let mut retained = RetainedPegoutQuote::new(
        hash,
        "0xc2a630c053d12d63d32b025082f6ba268db18300",
        "signature",
        Wei::from(100u64),
    );
    retained.state = state;
    retained
}

/// A watched pegout quote in the given state.
pub(crate) fn watched_pegout(
    seed: u8,
    state: PegoutState,
    value: u64,
    call_fee: u64,
    gas_fee: u64,
) -> WatchedPegoutQuote {
    WatchedPegoutQuote::new(
        pegout_quote(value, call_fee, gas_fee),
        retained_pegout(&quote_hash(seed), state),
        PegoutCreationData::zero(),
    )
}

/// A pegin quote with an hour left to deposit.
pub(crate) fn pegin_quote(value: u64, call_fee: u64, gas_fee: u64) -> PeginQuote {
    PeginQuote {
        fed_btc_address: "2N5muMepJizJE1gR7FbHJU6CD18V3BpNF9p".to_string(),
        lbc_address: "0xc2a630c053d12d63d32b025082f6ba268db18300".to_string(),
        lp_rsk_address: "0x9d93929a9099be4355fc2389fbf253982f9df47c".to_string(),
        btc_refund_address: "mnYcQxCZBbmLzNfE9BhV7E8E2u7amdz5y6".to_string(),
        rsk_refund_address: "0x79568c2989232dcb1e2a4b7e6c1d7bc8d9a4a6f3".to_string(),
        lp_btc_address: "mxqk28jvEtvjxRN8k7W9hFEJfWz5VcUgHW".to_string(),
        call_fee: Wei::from(call_fee),
        penalty_fee: Wei::from(10u64),
        contract_address: "0x79568c2989232dcb1e2a4b7e6c1d7bc8d9a4a6f3".to_string(),
        data: String::new(),
        gas_limit: 21_000,
        value: Wei::from(value),
        agreement_timestamp: unix_from_now(-60),
        time_for_deposit: 3_600,
        lp_call_time: 7_200,
        confirmations: 2,
        gas_fee: Wei::from(gas_fee),
        ..PeginQuote::default()
    }
}

/// A retained pegin quote in the given state.
pub(crate) fn retained_pegin(hash: &str, state: PeginState) -> RetainedPeginQuote {
    let mut retained = RetainedPeginQuote::new(
        hash,
        "2N1GMB8gxHYR5HLPSRgf9CJ9Lunjb9CTnKB",
        "signature",
        Wei::from(100u64),
    );
    retained.state = state;
    retained
}
