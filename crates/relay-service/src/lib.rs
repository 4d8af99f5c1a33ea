//! HTTP service for the EIP-3009 authorization relay.
//!
//! # Components
//!
//! - `api`: axum router and request handlers
//! - `cli`: command-line interface

pub mod api;
pub mod cli;
