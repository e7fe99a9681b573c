// playergold-liquidity/src/lib.rs

//! Constant-product AMM for the PlayerGold token platform
//!
//! This crate implements:
//! - Single-pair liquidity pools using the x * y = k invariant
//! - LP-token accounting with geometric-mean bootstrap minting
//! - A pool registry routing swaps and liquidity operations

pub mod manager;
pub mod pool;

pub use manager::{
    LiquidityPoolManager, LiquidityPosition, PoolInfo, SwapOutcome, SwapQuote,
};
pub use pool::{LiquidityPool, PoolStatus};

use rust_decimal::Decimal;

/// Result type for liquidity operations
pub type LiquidityResult<T> = Result<T, LiquidityError>;

/// Errors that can occur in liquidity operations
#[derive(Debug, thiserror::Error)]
pub enum LiquidityError {
    #[error("Pool not found: {0}")]
    PoolNotFound(String),

    #[error("Pool already exists: {0}")]
    PoolAlreadyExists(String),

    #[error("Pool {pool_id} is {status}")]
    PoolInactive {
        pool_id: String,
        status: pool::PoolStatus,
    },

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid fee percentage: {0}")]
    InvalidFee(Decimal),

    #[error("Token {token} is not part of pool {pool_id}")]
    UnknownToken { pool_id: String, token: String },

    #[error("Insufficient liquidity in pool {0}")]
    InsufficientLiquidity(String),

    #[error("Insufficient LP tokens: required {required}, available {available}")]
    InsufficientLpTokens {
        required: Decimal,
        available: Decimal,
    },

    #[error("No positions found for provider {0}")]
    NoPositions(String),
}
