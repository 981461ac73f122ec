//! # Liquidity Provider Engine
//!
//! Quote lifecycle and liquidity reservation engine for a liquidity provider
//! brokering pegins (BTC to RBTC) and pegouts (RBTC to BTC) between Bitcoin
//! and Rootstock.
//!
//! ## Architecture
//!
//! This crate follows Domain-Driven Design with a layered architecture:
//!
//! - **Domain Layer** (`domain`): Quotes, retained quotes, the `Wei` monetary
//!   type, lifecycle states and events
//! - **Application Layer** (`application`): Use cases, liquidity guards and the
//!   retryable/terminal failure model
//! - **Infrastructure Layer** (`infrastructure`): Repository, blockchain and
//!   event bus ports plus in-memory adapters
//!
//! ## Example
//!
//! ```rust,ignore
//! use liquidity_provider::application::use_cases::AcceptPegoutQuoteUseCase;
//!
//! let use_case = AcceptPegoutQuoteUseCase::new(/* dependencies */);
//! let accepted = use_case.execute(&quote_hash, None).await?;
//! println!("deposit to {}", accepted.deposit_address);
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
