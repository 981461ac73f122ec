//! # Blockchain Ports
//!
//! Ports of the Bitcoin and Rootstock networks and the contracts the LP
//! talks to.
//!
//! ## Available Components
//!
//! - [`BitcoinWallet`]: The LP's Bitcoin wallet
//! - [`BitcoinNetwork`]: Read access to Bitcoin
//! - [`RootstockRpc`]: Read access to RSK
//! - [`RootstockWallet`]: The LP's RSK wallet
//! - [`LiquidityBridgeContract`]: The liquidity bridge contract
//! - [`Bridge`]: The RSK bridge
//! - [`GasBudget`]: Fixed gas budgets of protocol calls

pub mod bitcoin;
pub mod client;
pub mod contracts;
pub mod gas;
pub mod rootstock;

pub use bitcoin::{
    BitcoinBlockInformation, BitcoinNetwork, BitcoinTransactionInformation,
    BitcoinTransactionResult, BitcoinWallet, BtcAddressType, MerkleBranch,
};
pub use client::{
    BlockInfo, BlockchainError, BlockchainResult, ReceiptLog, TransactionConfig,
    TransactionReceipt, TxHash,
};
pub use contracts::{
    Bridge, FlyoverDerivationArgs, LiquidityBridgeContract, ParsedDeposit, PauseStatus,
    RefundPegoutParams, RegisterPeginParams,
};
pub use gas::{
    BRIDGE_CONVERSION_GAS_LIMIT, BRIDGE_CONVERSION_GAS_PRICE, GasBudget, REFUND_PEGOUT_GAS_LIMIT,
};
pub use rootstock::{RSK_ZERO_ADDRESS, RootstockRpc, RootstockWallet, is_rsk_address};
