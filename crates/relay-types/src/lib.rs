//! Shared types for the EIP-3009 authorization relay.
//!
//! This crate holds the domain model used across the relay workspace:
//! signed authorization messages, the network profiles the relay can serve,
//! the description of a contract call handed to the network boundary, and
//! the outcome and receipt types returned to callers.

pub mod authorization;
pub mod chains;
pub mod delivery;
pub mod validation;

pub use authorization::*;
pub use chains::*;
pub use delivery::*;
pub use validation::*;

// Re-export the primitive types every crate in the workspace speaks in.
pub use alloy::primitives::{Address, Bytes, B256, U256};
