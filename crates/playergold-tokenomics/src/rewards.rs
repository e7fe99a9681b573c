// playergold-tokenomics/src/rewards.rs

use playergold_core::{BlockNumber, Timestamp, Transaction, TransactionType};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Share of each block reward paid to AI validators
const AI_VALIDATOR_SHARE: Decimal = dec!(0.90);
/// Share of each block reward paid to stakers
const STAKER_SHARE: Decimal = dec!(0.10);

/// How a staker participates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StakeType {
    /// Stake delegated to a specific AI node
    Delegated,
    /// Stake in the shared pool
    Pool,
}

/// An AI validator that participated in a block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiValidator {
    pub node_id: String,
    pub model_hash: String,
    /// Quality score in [0, 1], recorded for analytics
    pub participation_score: f64,
    pub validation_count: u64,
}

/// A staker eligible for the staker share
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StakerInfo {
    pub address: String,
    pub stake_amount: Decimal,
    pub stake_type: StakeType,
    pub delegated_node_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiValidatorReward {
    pub node_id: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StakerReward {
    pub address: String,
    pub amount: Decimal,
}

/// Full breakdown of one block's reward
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardDistribution {
    pub block_index: BlockNumber,
    pub total_reward: Decimal,
    pub ai_portion: Decimal,
    pub staker_portion: Decimal,
    pub ai_validator_rewards: Vec<AiValidatorReward>,
    pub staker_rewards: Vec<StakerReward>,
}

/// Splits block rewards 90/10 between AI validators and stakers.
///
/// Validators share their portion equally; stakers share theirs in
/// proportion to stake. A side with no participants forfeits its
/// portion (it is reported but pays out nothing).
#[derive(Debug, Clone, Default)]
pub struct RewardCalculator;

impl RewardCalculator {
    pub fn new() -> Self {
        Self
    }

    pub fn calculate_distribution(
        &self,
        block_index: BlockNumber,
        total_reward: Decimal,
        validators: &[AiValidator],
        stakers: &[StakerInfo],
    ) -> RewardDistribution {
        let ai_portion = total_reward * AI_VALIDATOR_SHARE;
        let staker_portion = total_reward * STAKER_SHARE;

        let ai_validator_rewards = Self::split_equally(ai_portion, validators);
        let staker_rewards = Self::split_proportionally(staker_portion, stakers);

        tracing::debug!(
            block = block_index,
            total = %total_reward,
            validators = validators.len(),
            stakers = stakers.len(),
            "block reward distributed"
        );

        RewardDistribution {
            block_index,
            total_reward,
            ai_portion,
            staker_portion,
            ai_validator_rewards,
            staker_rewards,
        }
    }

    fn split_equally(portion: Decimal, validators: &[AiValidator]) -> Vec<AiValidatorReward> {
        if validators.is_empty() || portion <= Decimal::ZERO {
            return Vec::new();
        }
        let per_validator = portion / Decimal::from(validators.len());
        validators
            .iter()
            .map(|v| AiValidatorReward {
                node_id: v.node_id.clone(),
                amount: per_validator,
            })
            .collect()
    }

    fn split_proportionally(portion: Decimal, stakers: &[StakerInfo]) -> Vec<StakerReward> {
        if stakers.is_empty() || portion <= Decimal::ZERO {
            return Vec::new();
        }
        let total_stake: Decimal = stakers.iter().map(|s| s.stake_amount).sum();
        if total_stake <= Decimal::ZERO {
            return Vec::new();
        }
        stakers
            .iter()
            .map(|s| StakerReward {
                address: s.address.clone(),
                amount: portion * s.stake_amount / total_stake,
            })
            .collect()
    }

    /// Build the fee-free reward transactions for a distribution, paid
    /// from the network address with consecutive nonces. Validator
    /// payouts go to the node's stake address.
    pub fn create_reward_transactions(
        &self,
        distribution: &RewardDistribution,
        network_address: &str,
        timestamp: Timestamp,
    ) -> Vec<Transaction> {
        let mut transactions = Vec::new();
        let mut nonce = 0u64;

        for reward in &distribution.ai_validator_rewards {
            transactions.push(Transaction::with_timestamp(
                network_address.to_string(),
                nonce,
                TransactionType::Reward {
                    to: format!("stake:{}", reward.node_id),
                    amount: reward.amount,
                },
                Decimal::ZERO,
                timestamp,
            ));
            nonce += 1;
        }

        for reward in &distribution.staker_rewards {
            transactions.push(Transaction::with_timestamp(
                network_address.to_string(),
                nonce,
                TransactionType::Reward {
                    to: reward.address.clone(),
                    amount: reward.amount,
                },
                Decimal::ZERO,
                timestamp,
            ));
            nonce += 1;
        }

        transactions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use playergold_core::TransactionKind;

    fn validator(node_id: &str) -> AiValidator {
        AiValidator {
            node_id: node_id.to_string(),
            model_hash: format!("hash-{}", node_id),
            participation_score: 0.95,
            validation_count: 10,
        }
    }

    fn staker(address: &str, amount: Decimal) -> StakerInfo {
        StakerInfo {
            address: address.to_string(),
            stake_amount: amount,
            stake_type: StakeType::Delegated,
            delegated_node_id: Some("node-1".to_string()),
        }
    }

    #[test]
    fn test_ninety_ten_split() {
        let calc = RewardCalculator::new();
        let dist = calc.calculate_distribution(
            1,
            dec!(100),
            &[validator("node-1")],
            &[staker("0xalice", dec!(1000))],
        );

        assert_eq!(dist.ai_portion, dec!(90));
        assert_eq!(dist.staker_portion, dec!(10));
        assert_eq!(dist.ai_portion + dist.staker_portion, dist.total_reward);
    }

    #[test]
    fn test_validators_split_equally() {
        let calc = RewardCalculator::new();
        let dist = calc.calculate_distribution(
            1,
            dec!(100),
            &[validator("node-1"), validator("node-2"), validator("node-3")],
            &[],
        );

        assert_eq!(dist.ai_validator_rewards.len(), 3);
        for reward in &dist.ai_validator_rewards {
            assert_eq!(reward.amount, dec!(30));
        }
    }

    #[test]
    fn test_stakers_split_proportionally() {
        let calc = RewardCalculator::new();
        let stakers = [
            staker("0xalice", dec!(1000)),
            staker("0xbob", dec!(500)),
            staker("0xcarol", dec!(2000)),
        ];
        let dist = calc.calculate_distribution(1, dec!(1000), &[], &stakers);

        // Staker portion is 100, split 1000:500:2000
        let amounts: Vec<Decimal> = dist.staker_rewards.iter().map(|r| r.amount).collect();
        let epsilon = dec!(0.0000001);
        assert!((amounts[0] - dec!(100) * dec!(1000) / dec!(3500)).abs() < epsilon);
        assert!((amounts[1] - dec!(100) * dec!(500) / dec!(3500)).abs() < epsilon);
        assert!((amounts[2] - dec!(100) * dec!(2000) / dec!(3500)).abs() < epsilon);

        let sum: Decimal = amounts.iter().copied().sum();
        assert!((sum - dec!(100)).abs() < epsilon);
    }

    #[test]
    fn test_empty_sides_forfeit() {
        let calc = RewardCalculator::new();
        let dist = calc.calculate_distribution(1, dec!(100), &[], &[]);
        assert!(dist.ai_validator_rewards.is_empty());
        assert!(dist.staker_rewards.is_empty());
        // Portions are still reported
        assert_eq!(dist.ai_portion, dec!(90));
        assert_eq!(dist.staker_portion, dec!(10));

        let zero_stake = [staker("0xalice", Decimal::ZERO)];
        let dist = calc.calculate_distribution(1, dec!(100), &[], &zero_stake);
        assert!(dist.staker_rewards.is_empty());
    }

    #[test]
    fn test_reward_transactions() {
        let calc = RewardCalculator::new();
        let dist = calc.calculate_distribution(
            5,
            dec!(100),
            &[validator("node-1")],
            &[staker("0xalice", dec!(1000)), staker("0xbob", dec!(1000))],
        );

        let txs = calc.create_reward_transactions(&dist, "network", 1_700_000_000);
        assert_eq!(txs.len(), 3);

        for (i, tx) in txs.iter().enumerate() {
            assert_eq!(tx.from_address, "network");
            assert_eq!(tx.nonce, i as u64);
            assert_eq!(tx.fee, Decimal::ZERO);
            assert_eq!(tx.tx_type.kind(), TransactionKind::Reward);
        }

        assert_eq!(txs[0].to_address(), "stake:node-1");
        assert_eq!(txs[0].tx_type.amount(), dec!(90));
        assert_eq!(txs[1].to_address(), "0xalice");
        assert_eq!(txs[2].to_address(), "0xbob");
        assert_eq!(txs[1].tx_type.amount() + txs[2].tx_type.amount(), dec!(10));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn payouts_never_exceed_total(
                total in 1u64..1_000_000,
                stakes in proptest::collection::vec(1u64..1_000_000, 0..10),
                validator_count in 0usize..10,
            ) {
                let calc = RewardCalculator::new();
                let validators: Vec<AiValidator> = (0..validator_count)
                    .map(|i| validator(&format!("node-{}", i)))
                    .collect();
                let stakers: Vec<StakerInfo> = stakes
                    .iter()
                    .enumerate()
                    .map(|(i, s)| staker(&format!("0x{}", i), Decimal::from(*s)))
                    .collect();

                let dist = calc.calculate_distribution(
                    1,
                    Decimal::from(total),
                    &validators,
                    &stakers,
                );

                let paid: Decimal = dist
                    .ai_validator_rewards
                    .iter()
                    .map(|r| r.amount)
                    .chain(dist.staker_rewards.iter().map(|r| r.amount))
                    .sum();

                let epsilon = dec!(0.000001);
                prop_assert!(paid <= Decimal::from(total) + epsilon);
            }
        }
    }
}
