//! Chain Error Types
//!
//! Errors raised by the contract client layer. Revert reasons are decoded
//! from simulation so callers see them without spending gas.

use thiserror::Error;

/// Errors that can occur when talking to the chain
#[derive(Error, Debug)]
pub enum ChainError {
    /// Transport or node-side RPC failure
    #[error("RPC error: {0}")]
    Rpc(String),

    /// Contract execution reverted with a decoded reason
    #[error("Contract reverted: {reason}")]
    Revert { reason: String },

    /// A write was attempted without a configured signer
    #[error("No signer configured; set LANDLEDGER_SIGNER_KEY to submit transactions")]
    NoSigner,

    /// Transaction was submitted but dropped before a receipt appeared
    #[error("Transaction {tx_hash} dropped from the mempool")]
    Dropped { tx_hash: String },

    /// A value returned by the contract could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// Malformed address or other invalid input
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// ABI fragment failed to parse at startup
    #[error("ABI error: {0}")]
    Abi(String),
}

/// Result type for chain operations
pub type ChainResult<T> = Result<T, ChainError>;
