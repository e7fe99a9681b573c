// playergold-core/src/lib.rs

//! Core data types for the PlayerGold token platform
//!
//! This crate provides:
//! - Shared scalar types (timestamps, block numbers, nonces)
//! - The transaction record with canonical-JSON hashing and
//!   Ed25519 signing
//! - Typed transaction payloads

pub mod transaction;
pub mod types;

pub use transaction::{Transaction, TransactionKind, TransactionType, BURN_ADDRESS};
pub use types::*;

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in core operations
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),

    #[error("Transaction already signed")]
    AlreadySigned,

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Cryptographic error: {0}")]
    CryptoError(#[from] playergold_crypto::CryptoError),
}
