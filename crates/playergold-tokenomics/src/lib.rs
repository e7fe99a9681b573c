// playergold-tokenomics/src/lib.rs

//! Tokenomics for the PlayerGold platform: dynamic transaction fees,
//! deflationary burning, block reward distribution, and delegated
//! staking on AI validator nodes.

pub mod burning;
pub mod fees;
pub mod rewards;
pub mod staking;

pub use burning::{
    calculate_deflationary_impact, BurnReason, BurnRecord, FeeDistribution, SupplyInfo,
    TokenBurnManager,
};
pub use fees::{
    FeeCalculator, FeeStructure, NetworkCongestion, NetworkMetrics, NetworkMetricsTracker,
};
pub use rewards::{
    AiValidator, AiValidatorReward, RewardCalculator, RewardDistribution, StakeType, StakerInfo,
    StakerReward,
};
pub use staking::{AiNodeInfo, Stake, StakeStatus, StakingConfig, StakingStats, StakingSystem};

use rust_decimal::Decimal;
use thiserror::Error;

pub type TokenomicsResult<T> = Result<T, TokenomicsError>;

#[derive(Error, Debug)]
pub enum TokenomicsError {
    #[error("Stake not found for staker: {0}")]
    StakeNotFound(String),

    #[error("AI node not found: {0}")]
    NodeNotFound(String),

    #[error("AI node is not active: {0}")]
    NodeInactive(String),

    #[error("AI node already registered: {0}")]
    NodeAlreadyRegistered(String),

    #[error("Stake amount {amount} is below the minimum of {minimum}")]
    BelowMinimumStake { minimum: Decimal, amount: Decimal },

    #[error("Staker {0} already has an active stake")]
    ActiveStakeExists(String),

    #[error("No withdrawal has been requested for staker: {0}")]
    WithdrawalNotRequested(String),

    #[error("Withdrawal delay not met: {remaining_seconds} seconds remaining")]
    WithdrawalDelayNotMet { remaining_seconds: u64 },

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
}
