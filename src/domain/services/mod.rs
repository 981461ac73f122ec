//! # Domain Services
//!
//! Domain logic that doesn't naturally belong to a single entity or value
//! object.
//!
//! ## Services
//!
//! - [`liquidity_provider`]: LP capability ports and configurations
//! - [`recommended`]: Fixed-point recommended-amount algebra
//! - [`signature`]: EIP-191 signer recovery

pub mod liquidity_provider;
pub mod recommended;
pub mod signature;

pub use liquidity_provider::{
    LiquidityProvider, PeginConfiguration, PeginLiquidityProvider, PegoutConfiguration,
    PegoutLiquidityProvider, ProviderError, ProviderResult,
};
pub use recommended::{FEE_SCALE, FeeSchedule, RecommendedOperation, recommend};
pub use signature::recover_signer_address;
