//! # Application Layer
//!
//! Use case orchestration for the quote lifecycle.
//!
//! This layer coordinates domain objects and infrastructure ports to move
//! pegin and pegout quotes through their states, serializing access to the
//! LP's funds with [`LiquidityGuards`].
//!
//! ## Modules
//!
//! - `error`: [`UseCaseError`], the error every use case returns
//! - `outcome`: [`Failure`], the retryable/terminal split used inside handlers
//! - `guard`: Per-resource async mutexes
//! - `use_cases`: One struct per lifecycle operation

pub mod error;
pub mod guard;
pub mod outcome;
pub mod use_cases;

pub use error::{ErrorContext, ErrorKind, UseCaseError, UseCaseId, UseCaseResult};
pub use guard::{GuardedResource, LiquidityGuards, ResourceGuard};
pub use outcome::{Failure, Outcome};
