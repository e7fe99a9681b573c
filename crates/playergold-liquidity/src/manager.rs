// playergold-liquidity/src/manager.rs

use crate::{pool::LiquidityPool, LiquidityError, LiquidityResult};
use playergold_core::{current_timestamp, Timestamp};
use rust_decimal::{Decimal, MathematicalOps};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A liquidity provider's position in a pool. Positions are append-only:
/// a provider adding liquidity twice holds two positions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiquidityPosition {
    pub provider_address: String,
    pub pool_id: String,
    /// LP tokens owned by this position
    pub lp_tokens: Decimal,
    pub token_a_deposited: Decimal,
    pub token_b_deposited: Decimal,
    pub timestamp: Timestamp,
    pub accumulated_fees: Decimal,
}

/// Quote for a swap without executing it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapQuote {
    pub input_token: String,
    pub input_amount: Decimal,
    pub output_token: String,
    pub output_amount: Decimal,
    pub fee_amount: Decimal,
    /// Effective price (output / input)
    pub price: Decimal,
    /// Price impact heuristic as a percentage
    pub price_impact_percentage: Decimal,
}

/// Result of an executed swap
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapOutcome {
    pub input_token: String,
    pub input_amount: Decimal,
    pub output_token: String,
    pub output_amount: Decimal,
    pub fee_amount: Decimal,
}

/// Snapshot of a pool with derived values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolInfo {
    pub pool: LiquidityPool,
    pub price_a_to_b: Option<Decimal>,
    pub price_b_to_a: Option<Decimal>,
    pub constant_product: Decimal,
    pub provider_count: usize,
}

/// Registry of liquidity pools keyed by sorted token-pair id.
///
/// Owns all pools and provider positions; cross-references are by
/// string id only. Single mutator at a time; callers sharing a manager
/// across threads must wrap it in their own lock.
pub struct LiquidityPoolManager {
    pools: HashMap<String, LiquidityPool>,
    /// provider_address -> positions (all pools, oldest first)
    positions: HashMap<String, Vec<LiquidityPosition>>,
    /// pool_id -> provider addresses, each listed at most once
    pool_positions: HashMap<String, Vec<String>>,
}

impl LiquidityPoolManager {
    pub fn new() -> Self {
        Self {
            pools: HashMap::new(),
            positions: HashMap::new(),
            pool_positions: HashMap::new(),
        }
    }

    /// Derive the canonical pool id for an unordered token pair
    pub fn pool_id_for(token_a: &str, token_b: &str) -> String {
        if token_a <= token_b {
            format!("{}-{}", token_a, token_b)
        } else {
            format!("{}-{}", token_b, token_a)
        }
    }

    /// Create a new pool. Fails if a pool for the unordered pair
    /// already exists, regardless of symbol order.
    pub fn create_pool(
        &mut self,
        token_a_symbol: &str,
        token_b_symbol: &str,
        fee_percentage: Decimal,
    ) -> LiquidityResult<String> {
        if fee_percentage < Decimal::ZERO || fee_percentage >= Decimal::ONE {
            return Err(LiquidityError::InvalidFee(fee_percentage));
        }

        let pool_id = Self::pool_id_for(token_a_symbol, token_b_symbol);
        if self.pools.contains_key(&pool_id) {
            return Err(LiquidityError::PoolAlreadyExists(pool_id));
        }

        let (first, second) = if token_a_symbol <= token_b_symbol {
            (token_a_symbol, token_b_symbol)
        } else {
            (token_b_symbol, token_a_symbol)
        };

        let pool = LiquidityPool::new(
            pool_id.clone(),
            first.to_string(),
            second.to_string(),
            fee_percentage,
        );

        tracing::info!(pool_id = %pool_id, fee = %fee_percentage, "pool created");

        self.pools.insert(pool_id.clone(), pool);
        self.pool_positions.insert(pool_id.clone(), Vec::new());

        Ok(pool_id)
    }

    /// Add liquidity to a pool, minting LP tokens.
    ///
    /// The first provider receives `sqrt(amount_a * amount_b)` LP tokens.
    /// Later providers receive the lesser of the two proportional mint
    /// amounts; a deposit off the current price ratio silently donates
    /// the excess side to the pool.
    pub fn add_liquidity(
        &mut self,
        pool_id: &str,
        provider_address: &str,
        amount_a: Decimal,
        amount_b: Decimal,
    ) -> LiquidityResult<Decimal> {
        let pool = self
            .pools
            .get_mut(pool_id)
            .ok_or_else(|| LiquidityError::PoolNotFound(pool_id.to_string()))?;

        if !pool.is_active() {
            return Err(LiquidityError::PoolInactive {
                pool_id: pool_id.to_string(),
                status: pool.status,
            });
        }

        if amount_a <= Decimal::ZERO || amount_b <= Decimal::ZERO {
            return Err(LiquidityError::InvalidAmount(
                "Amounts must be positive".into(),
            ));
        }

        let lp_tokens = if pool.total_lp_tokens.is_zero() {
            // Geometric-mean bootstrap mint
            (amount_a * amount_b)
                .sqrt()
                .ok_or_else(|| LiquidityError::InvalidAmount("Amounts must be positive".into()))?
        } else {
            let lp_from_a = amount_a * pool.total_lp_tokens / pool.reserve_a;
            let lp_from_b = amount_b * pool.total_lp_tokens / pool.reserve_b;
            lp_from_a.min(lp_from_b)
        };

        pool.reserve_a += amount_a;
        pool.reserve_b += amount_b;
        pool.total_lp_tokens += lp_tokens;

        let position = LiquidityPosition {
            provider_address: provider_address.to_string(),
            pool_id: pool_id.to_string(),
            lp_tokens,
            token_a_deposited: amount_a,
            token_b_deposited: amount_b,
            timestamp: current_timestamp(),
            accumulated_fees: Decimal::ZERO,
        };

        self.positions
            .entry(provider_address.to_string())
            .or_default()
            .push(position);

        let providers = self.pool_positions.entry(pool_id.to_string()).or_default();
        if !providers.iter().any(|p| p == provider_address) {
            providers.push(provider_address.to_string());
        }

        tracing::debug!(
            pool_id = %pool_id,
            provider = %provider_address,
            lp_tokens = %lp_tokens,
            "liquidity added"
        );

        Ok(lp_tokens)
    }

    /// Remove liquidity by burning LP tokens.
    ///
    /// Returns the amounts of both tokens, proportional to the burned
    /// share of the total LP supply, computed before reserves shrink.
    /// The burn consumes the provider's positions oldest-first.
    pub fn remove_liquidity(
        &mut self,
        pool_id: &str,
        provider_address: &str,
        lp_tokens: Decimal,
    ) -> LiquidityResult<(Decimal, Decimal)> {
        if !self.pools.contains_key(pool_id) {
            return Err(LiquidityError::PoolNotFound(pool_id.to_string()));
        }

        if lp_tokens <= Decimal::ZERO {
            return Err(LiquidityError::InvalidAmount(
                "LP tokens must be positive".into(),
            ));
        }

        let provider_positions = self
            .positions
            .get_mut(provider_address)
            .ok_or_else(|| LiquidityError::NoPositions(provider_address.to_string()))?;

        let total_provider_lp: Decimal = provider_positions
            .iter()
            .filter(|p| p.pool_id == pool_id)
            .map(|p| p.lp_tokens)
            .sum();

        if total_provider_lp < lp_tokens {
            return Err(LiquidityError::InsufficientLpTokens {
                required: lp_tokens,
                available: total_provider_lp,
            });
        }

        let pool = self
            .pools
            .get_mut(pool_id)
            .ok_or_else(|| LiquidityError::PoolNotFound(pool_id.to_string()))?;

        if pool.total_lp_tokens.is_zero() {
            return Err(LiquidityError::InsufficientLiquidity(pool_id.to_string()));
        }

        // Per-position holdings can drift from the pool total by one ulp
        // of Decimal rounding; a full exit must not over-draw the reserves
        let pool_share = lp_tokens.min(pool.total_lp_tokens);

        let amount_a = pool_share * pool.reserve_a / pool.total_lp_tokens;
        let amount_b = pool_share * pool.reserve_b / pool.total_lp_tokens;

        pool.reserve_a -= amount_a;
        pool.reserve_b -= amount_b;
        pool.total_lp_tokens -= pool_share;

        // Burn oldest-first, partially consuming the last position touched
        let mut remaining = lp_tokens;
        provider_positions.retain_mut(|pos| {
            if pos.pool_id != pool_id || remaining.is_zero() {
                return true;
            }
            if pos.lp_tokens <= remaining {
                remaining -= pos.lp_tokens;
                false
            } else {
                pos.lp_tokens -= remaining;
                remaining = Decimal::ZERO;
                true
            }
        });

        tracing::debug!(
            pool_id = %pool_id,
            provider = %provider_address,
            lp_tokens = %lp_tokens,
            "liquidity removed"
        );

        Ok((amount_a, amount_b))
    }

    /// Execute a token swap against the named pool
    pub fn swap(
        &mut self,
        pool_id: &str,
        trader_address: &str,
        input_token: &str,
        input_amount: Decimal,
    ) -> LiquidityResult<SwapOutcome> {
        let pool = self
            .pools
            .get_mut(pool_id)
            .ok_or_else(|| LiquidityError::PoolNotFound(pool_id.to_string()))?;

        let input_is_token_a = Self::resolve_input_side(pool, pool_id, input_token)?;
        let output_token = if input_is_token_a {
            pool.token_b_symbol.clone()
        } else {
            pool.token_a_symbol.clone()
        };

        let (output_amount, fee_amount) = pool.swap(input_amount, input_is_token_a)?;

        tracing::debug!(
            pool_id = %pool_id,
            trader = %trader_address,
            input_token = %input_token,
            input_amount = %input_amount,
            output_amount = %output_amount,
            "swap executed"
        );

        Ok(SwapOutcome {
            input_token: input_token.to_string(),
            input_amount,
            output_token,
            output_amount,
            fee_amount,
        })
    }

    /// Quote a swap without executing it
    pub fn calculate_swap_quote(
        &self,
        pool_id: &str,
        input_token: &str,
        input_amount: Decimal,
    ) -> LiquidityResult<SwapQuote> {
        let pool = self
            .pools
            .get(pool_id)
            .ok_or_else(|| LiquidityError::PoolNotFound(pool_id.to_string()))?;

        let input_is_token_a = Self::resolve_input_side(pool, pool_id, input_token)?;
        let output_token = if input_is_token_a {
            pool.token_b_symbol.clone()
        } else {
            pool.token_a_symbol.clone()
        };

        let (output_amount, fee_amount) =
            pool.calculate_output_amount(input_amount, input_is_token_a);

        if output_amount <= Decimal::ZERO {
            return Err(LiquidityError::InsufficientLiquidity(pool_id.to_string()));
        }

        let price = output_amount / input_amount;
        let price_impact_percentage =
            pool.price_impact(input_amount, input_is_token_a) * Decimal::ONE_HUNDRED;

        Ok(SwapQuote {
            input_token: input_token.to_string(),
            input_amount,
            output_token,
            output_amount,
            fee_amount,
            price,
            price_impact_percentage,
        })
    }

    fn resolve_input_side(
        pool: &LiquidityPool,
        pool_id: &str,
        input_token: &str,
    ) -> LiquidityResult<bool> {
        if input_token == pool.token_a_symbol {
            Ok(true)
        } else if input_token == pool.token_b_symbol {
            Ok(false)
        } else {
            Err(LiquidityError::UnknownToken {
                pool_id: pool_id.to_string(),
                token: input_token.to_string(),
            })
        }
    }

    pub fn get_pool(&self, pool_id: &str) -> Option<&LiquidityPool> {
        self.pools.get(pool_id)
    }

    pub fn get_pool_mut(&mut self, pool_id: &str) -> Option<&mut LiquidityPool> {
        self.pools.get_mut(pool_id)
    }

    /// Detailed pool snapshot with derived prices
    pub fn get_pool_info(&self, pool_id: &str) -> Option<PoolInfo> {
        let pool = self.pools.get(pool_id)?;
        Some(PoolInfo {
            pool: pool.clone(),
            price_a_to_b: pool.price_a_to_b(),
            price_b_to_a: pool.price_b_to_a(),
            constant_product: pool.constant_product(),
            provider_count: self
                .pool_positions
                .get(pool_id)
                .map(|p| p.len())
                .unwrap_or(0),
        })
    }

    /// Snapshots of all pools
    pub fn get_all_pools(&self) -> Vec<PoolInfo> {
        let mut ids: Vec<&String> = self.pools.keys().collect();
        ids.sort();
        ids.iter()
            .filter_map(|id| self.get_pool_info(id))
            .collect()
    }

    /// All positions held by a provider
    pub fn get_provider_positions(&self, provider_address: &str) -> &[LiquidityPosition] {
        self.positions
            .get(provider_address)
            .map(|p| p.as_slice())
            .unwrap_or(&[])
    }

    /// Total LP tokens a provider holds in one pool across all positions
    pub fn provider_lp_balance(&self, pool_id: &str, provider_address: &str) -> Decimal {
        self.positions
            .get(provider_address)
            .map(|positions| {
                positions
                    .iter()
                    .filter(|p| p.pool_id == pool_id)
                    .map(|p| p.lp_tokens)
                    .sum()
            })
            .unwrap_or(Decimal::ZERO)
    }
}

impl Default for LiquidityPoolManager {
    fn default() -> Self {
        Self::new()
    }
}
