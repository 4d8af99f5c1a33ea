//! Delivery implementations.
//!
//! Available implementations:
//! - `evm::alloy`: JSON-RPC over HTTP using Alloy providers

pub mod evm {
	pub mod alloy;
}
