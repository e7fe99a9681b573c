// playergold-tokenomics/src/burning.rs

use crate::{TokenomicsError, TokenomicsResult};
use playergold_core::{BlockNumber, Timestamp, Transaction, TransactionType, BURN_ADDRESS};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Share of collected fees that is burned
const BURN_SHARE: Decimal = dec!(0.60);
/// Share of collected fees paid to network maintenance
const MAINTENANCE_SHARE: Decimal = dec!(0.30);

/// Default initial supply: 1 billion PRGLD
const DEFAULT_INITIAL_SUPPLY: Decimal = dec!(1000000000);

/// Why a burn happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BurnReason {
    /// Automatic burn of the fee share
    FeeBurn,
    /// Holder-initiated burn
    VoluntaryBurn,
}

impl fmt::Display for BurnReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BurnReason::FeeBurn => "fee_burn",
            BurnReason::VoluntaryBurn => "voluntary_burn",
        };
        write!(f, "{}", s)
    }
}

/// One burn event in the permanent history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BurnRecord {
    pub transaction_hash: String,
    pub amount_burned: Decimal,
    pub block_index: BlockNumber,
    pub timestamp: Timestamp,
    pub reason: BurnReason,
}

/// How one batch of collected fees was split
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeeDistribution {
    pub total_fees: Decimal,
    pub burn_amount: Decimal,
    pub maintenance_amount: Decimal,
    pub liquidity_amount: Decimal,
}

impl FeeDistribution {
    /// Split fees 60% burn / 30% maintenance / 10% liquidity. The
    /// liquidity share is the remainder so the three parts always sum
    /// to the exact total.
    pub fn split(total_fees: Decimal) -> Self {
        let burn_amount = total_fees * BURN_SHARE;
        let maintenance_amount = total_fees * MAINTENANCE_SHARE;
        let liquidity_amount = total_fees - burn_amount - maintenance_amount;
        Self {
            total_fees,
            burn_amount,
            maintenance_amount,
            liquidity_amount,
        }
    }
}

/// Supply snapshot after burns
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplyInfo {
    pub initial_supply: Decimal,
    pub total_burned: Decimal,
    pub circulating_supply: Decimal,
    /// Burned fraction of the initial supply, as a percentage
    pub burned_percentage: Decimal,
}

/// Tracks the deflationary burn of PRGLD.
///
/// Splits collected fees, emits the settlement transactions, and keeps
/// the permanent burn history. Burned tokens are sent to the
/// unspendable burn address and never re-enter circulation.
pub struct TokenBurnManager {
    initial_supply: Decimal,
    total_burned: Decimal,
    burn_history: Vec<BurnRecord>,
    /// Address receiving the maintenance share of fees
    maintenance_address: String,
    /// Address receiving the liquidity share of fees
    liquidity_address: String,
}

impl TokenBurnManager {
    pub fn new(initial_supply: Decimal) -> Self {
        Self {
            initial_supply,
            total_burned: Decimal::ZERO,
            burn_history: Vec::new(),
            maintenance_address: "network_maintenance".to_string(),
            liquidity_address: "liquidity_fund".to_string(),
        }
    }

    /// Split a batch of collected fees and produce the settlement
    /// transactions: one burn plus two fee-free transfers from the fee
    /// collector. The burn is recorded in history.
    pub fn process_fee_distribution(
        &mut self,
        total_fees: Decimal,
        block_index: BlockNumber,
        now: Timestamp,
    ) -> TokenomicsResult<(FeeDistribution, Vec<Transaction>)> {
        if total_fees < Decimal::ZERO {
            return Err(TokenomicsError::InvalidAmount(format!(
                "Total fees cannot be negative: {}",
                total_fees
            )));
        }

        let distribution = FeeDistribution::split(total_fees);
        let mut transactions = Vec::new();

        if distribution.burn_amount > Decimal::ZERO {
            let burn_tx = Transaction::with_timestamp(
                "fee_collector".to_string(),
                0,
                TransactionType::Burn {
                    amount: distribution.burn_amount,
                },
                Decimal::ZERO,
                now,
            );
            self.record_burn(
                burn_tx.hash().to_hex(),
                distribution.burn_amount,
                block_index,
                now,
                BurnReason::FeeBurn,
            );
            transactions.push(burn_tx);
        }

        if distribution.maintenance_amount > Decimal::ZERO {
            transactions.push(Transaction::with_timestamp(
                "fee_collector".to_string(),
                1,
                TransactionType::Transfer {
                    to: self.maintenance_address.clone(),
                    amount: distribution.maintenance_amount,
                },
                Decimal::ZERO,
                now,
            ));
        }

        if distribution.liquidity_amount > Decimal::ZERO {
            transactions.push(Transaction::with_timestamp(
                "fee_collector".to_string(),
                2,
                TransactionType::Transfer {
                    to: self.liquidity_address.clone(),
                    amount: distribution.liquidity_amount,
                },
                Decimal::ZERO,
                now,
            ));
        }

        tracing::debug!(
            total_fees = %total_fees,
            burned = %distribution.burn_amount,
            block = block_index,
            "fee distribution processed"
        );

        Ok((distribution, transactions))
    }

    /// Burn tokens at a holder's request. Returns the fee-free burn
    /// transaction for inclusion in a block.
    pub fn process_voluntary_burn(
        &mut self,
        from_address: &str,
        amount: Decimal,
        block_index: BlockNumber,
        now: Timestamp,
    ) -> TokenomicsResult<Transaction> {
        if amount <= Decimal::ZERO {
            return Err(TokenomicsError::InvalidAmount(format!(
                "Burn amount must be positive: {}",
                amount
            )));
        }

        let tx = Transaction::with_timestamp(
            from_address.to_string(),
            0,
            TransactionType::Burn { amount },
            Decimal::ZERO,
            now,
        );
        self.record_burn(
            tx.hash().to_hex(),
            amount,
            block_index,
            now,
            BurnReason::VoluntaryBurn,
        );

        tracing::info!(from = %from_address, amount = %amount, "voluntary burn");

        Ok(tx)
    }

    fn record_burn(
        &mut self,
        transaction_hash: String,
        amount: Decimal,
        block_index: BlockNumber,
        timestamp: Timestamp,
        reason: BurnReason,
    ) {
        self.total_burned += amount;
        self.burn_history.push(BurnRecord {
            transaction_hash,
            amount_burned: amount,
            block_index,
            timestamp,
            reason,
        });
    }

    pub fn total_burned(&self) -> Decimal {
        self.total_burned
    }

    pub fn burn_address(&self) -> &str {
        BURN_ADDRESS
    }

    /// Most recent burns, newest first, optionally filtered by reason
    pub fn burn_history(&self, limit: usize, reason: Option<BurnReason>) -> Vec<&BurnRecord> {
        self.burn_history
            .iter()
            .rev()
            .filter(|r| reason.map_or(true, |want| r.reason == want))
            .take(limit)
            .collect()
    }

    /// Total burned per reason
    pub fn total_burned_by_reason(&self) -> HashMap<BurnReason, Decimal> {
        let mut totals = HashMap::new();
        for record in &self.burn_history {
            *totals.entry(record.reason).or_insert(Decimal::ZERO) += record.amount_burned;
        }
        totals
    }

    /// Tokens burned per hour over the trailing period, 0 for an empty
    /// period
    pub fn calculate_burn_rate(&self, period_hours: u64, now: Timestamp) -> Decimal {
        if period_hours == 0 {
            return Decimal::ZERO;
        }
        let cutoff = now.saturating_sub(period_hours * 3600);
        let burned_in_period: Decimal = self
            .burn_history
            .iter()
            .filter(|r| r.timestamp >= cutoff)
            .map(|r| r.amount_burned)
            .sum();
        burned_in_period / Decimal::from(period_hours)
    }

    pub fn supply_info(&self) -> SupplyInfo {
        let circulating_supply = self.initial_supply - self.total_burned;
        let burned_percentage = if self.initial_supply.is_zero() {
            Decimal::ZERO
        } else {
            self.total_burned / self.initial_supply * Decimal::ONE_HUNDRED
        };
        SupplyInfo {
            initial_supply: self.initial_supply,
            total_burned: self.total_burned,
            circulating_supply,
            burned_percentage,
        }
    }
}

impl Default for TokenBurnManager {
    fn default() -> Self {
        Self::new(DEFAULT_INITIAL_SUPPLY)
    }
}

/// Project the circulating supply after `periods` periods, each burning
/// `burn_per_period` tokens. The supply never goes below zero.
pub fn calculate_deflationary_impact(
    initial_supply: Decimal,
    burn_per_period: Decimal,
    periods: u32,
) -> Vec<Decimal> {
    let mut supply = initial_supply;
    let mut projection = Vec::with_capacity(periods as usize);
    for _ in 0..periods {
        supply = (supply - burn_per_period).max(Decimal::ZERO);
        projection.push(supply);
    }
    projection
}
