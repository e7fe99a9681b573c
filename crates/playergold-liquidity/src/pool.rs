// playergold-liquidity/src/pool.rs

use crate::{LiquidityError, LiquidityResult};
use playergold_core::{current_timestamp, Timestamp};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a liquidity pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoolStatus {
    Active,
    Paused,
    Closed,
}

impl fmt::Display for PoolStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PoolStatus::Active => "active",
            PoolStatus::Paused => "paused",
            PoolStatus::Closed => "closed",
        };
        write!(f, "{}", s)
    }
}

/// AMM liquidity pool using the constant product formula (x * y = k)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiquidityPool {
    /// Pool identifier: the two token symbols sorted and joined with '-'
    pub pool_id: String,
    /// First token symbol (lexicographically smaller)
    pub token_a_symbol: String,
    /// Second token symbol
    pub token_b_symbol: String,
    /// Reserve of token A
    pub reserve_a: Decimal,
    /// Reserve of token B
    pub reserve_b: Decimal,
    /// Total LP tokens minted against this pool
    pub total_lp_tokens: Decimal,
    /// Trading fee as a fraction in [0, 1)
    pub fee_percentage: Decimal,
    /// Pool status
    pub status: PoolStatus,
    /// Creation timestamp
    pub created_at: Timestamp,
    /// Cumulative volume traded into the A side
    pub total_volume_a: Decimal,
    /// Cumulative volume traded into the B side
    pub total_volume_b: Decimal,
    /// Cumulative fees retained by the pool
    pub total_fees_collected: Decimal,
}

impl LiquidityPool {
    /// Create a new empty pool. Token symbols must already be in sorted
    /// order (the manager guarantees this).
    pub fn new(
        pool_id: String,
        token_a_symbol: String,
        token_b_symbol: String,
        fee_percentage: Decimal,
    ) -> Self {
        Self {
            pool_id,
            token_a_symbol,
            token_b_symbol,
            reserve_a: Decimal::ZERO,
            reserve_b: Decimal::ZERO,
            total_lp_tokens: Decimal::ZERO,
            fee_percentage,
            status: PoolStatus::Active,
            created_at: current_timestamp(),
            total_volume_a: Decimal::ZERO,
            total_volume_b: Decimal::ZERO,
            total_fees_collected: Decimal::ZERO,
        }
    }

    /// Constant product k = reserve_a * reserve_b, recomputed on demand
    pub fn constant_product(&self) -> Decimal {
        self.reserve_a * self.reserve_b
    }

    /// Price of token A in terms of token B, None when there is no A liquidity
    pub fn price_a_to_b(&self) -> Option<Decimal> {
        if self.reserve_a.is_zero() {
            return None;
        }
        Some(self.reserve_b / self.reserve_a)
    }

    /// Price of token B in terms of token A, None when there is no B liquidity
    pub fn price_b_to_a(&self) -> Option<Decimal> {
        if self.reserve_b.is_zero() {
            return None;
        }
        Some(self.reserve_a / self.reserve_b)
    }

    pub fn is_active(&self) -> bool {
        self.status == PoolStatus::Active
    }

    /// Calculate swap output via the constant product formula.
    ///
    /// Returns `(output_amount, fee_amount)`. The fee is taken from the
    /// input before the curve is applied:
    /// `output = reserve_out - k / (reserve_in + input_after_fee)`.
    /// Returns `(0, 0)` for non-positive input or an empty reserve.
    pub fn calculate_output_amount(
        &self,
        input_amount: Decimal,
        input_is_token_a: bool,
    ) -> (Decimal, Decimal) {
        if input_amount <= Decimal::ZERO {
            return (Decimal::ZERO, Decimal::ZERO);
        }

        if self.reserve_a.is_zero() || self.reserve_b.is_zero() {
            return (Decimal::ZERO, Decimal::ZERO);
        }

        let fee_amount = input_amount * self.fee_percentage;
        let input_after_fee = input_amount - fee_amount;

        let k = self.constant_product();
        let output_amount = if input_is_token_a {
            let new_reserve_a = self.reserve_a + input_after_fee;
            self.reserve_b - k / new_reserve_a
        } else {
            let new_reserve_b = self.reserve_b + input_after_fee;
            self.reserve_a - k / new_reserve_b
        };

        (output_amount.max(Decimal::ZERO), fee_amount)
    }

    /// Calculate the input required for a desired output (inverse of
    /// `calculate_output_amount`). Returns `(0, 0)` when the requested
    /// output is not positive or cannot be covered by the reserve.
    pub fn calculate_input_amount(
        &self,
        output_amount: Decimal,
        output_is_token_a: bool,
    ) -> (Decimal, Decimal) {
        if output_amount <= Decimal::ZERO {
            return (Decimal::ZERO, Decimal::ZERO);
        }

        let k = self.constant_product();
        let input_before_fee = if output_is_token_a {
            if self.reserve_a <= output_amount || self.reserve_b.is_zero() {
                return (Decimal::ZERO, Decimal::ZERO);
            }
            let new_reserve_a = self.reserve_a - output_amount;
            k / new_reserve_a - self.reserve_b
        } else {
            if self.reserve_b <= output_amount || self.reserve_a.is_zero() {
                return (Decimal::ZERO, Decimal::ZERO);
            }
            let new_reserve_b = self.reserve_b - output_amount;
            k / new_reserve_b - self.reserve_a
        };

        // Gross up for the fee: input_after_fee = input * (1 - fee)
        let input_amount = input_before_fee / (Decimal::ONE - self.fee_percentage);
        let fee_amount = input_amount * self.fee_percentage;

        (input_amount, fee_amount)
    }

    /// Price impact heuristic: input / (reserve + input) on the input side
    pub fn price_impact(&self, input_amount: Decimal, input_is_token_a: bool) -> Decimal {
        let reserve = if input_is_token_a {
            self.reserve_a
        } else {
            self.reserve_b
        };
        if reserve.is_zero() {
            return Decimal::ZERO;
        }
        input_amount / (reserve + input_amount)
    }

    /// Execute a swap against the reserves.
    ///
    /// The input reserve grows by the full input amount (fee included,
    /// which is how LP value accrues); the output reserve shrinks by the
    /// computed output. Fails when the pool is not active or the curve
    /// yields no output.
    pub fn swap(
        &mut self,
        input_amount: Decimal,
        input_is_token_a: bool,
    ) -> LiquidityResult<(Decimal, Decimal)> {
        if !self.is_active() {
            return Err(LiquidityError::PoolInactive {
                pool_id: self.pool_id.clone(),
                status: self.status,
            });
        }

        if input_amount <= Decimal::ZERO {
            return Err(LiquidityError::InvalidAmount(
                "Input amount must be positive".into(),
            ));
        }

        let (output_amount, fee_amount) =
            self.calculate_output_amount(input_amount, input_is_token_a);

        if output_amount <= Decimal::ZERO {
            return Err(LiquidityError::InsufficientLiquidity(self.pool_id.clone()));
        }

        if input_is_token_a {
            self.reserve_a += input_amount;
            self.reserve_b -= output_amount;
            self.total_volume_a += input_amount;
        } else {
            self.reserve_b += input_amount;
            self.reserve_a -= output_amount;
            self.total_volume_b += input_amount;
        }

        self.total_fees_collected += fee_amount;

        Ok((output_amount, fee_amount))
    }

    /// Pause trading and liquidity operations
    pub fn pause(&mut self) {
        if self.status == PoolStatus::Active {
            self.status = PoolStatus::Paused;
        }
    }

    /// Resume a paused pool
    pub fn resume(&mut self) {
        if self.status == PoolStatus::Paused {
            self.status = PoolStatus::Active;
        }
    }

    /// Close the pool permanently. Pools are never deleted.
    pub fn close(&mut self) {
        self.status = PoolStatus::Closed;
    }
}
