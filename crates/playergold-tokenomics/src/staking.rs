// playergold-tokenomics/src/staking.rs

use crate::{TokenomicsError, TokenomicsResult};
use playergold_core::{Timestamp, Transaction, TransactionType};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Lifecycle of a stake. `Withdrawn` stakes remain in the registry for
/// history and may be replaced by a fresh delegation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StakeStatus {
    Active,
    PendingWithdrawal,
    Withdrawn,
}

impl fmt::Display for StakeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StakeStatus::Active => "active",
            StakeStatus::PendingWithdrawal => "pending_withdrawal",
            StakeStatus::Withdrawn => "withdrawn",
        };
        write!(f, "{}", s)
    }
}

/// One staker's delegation to an AI node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stake {
    pub staker_address: String,
    pub amount: Decimal,
    pub delegated_node_id: String,
    pub timestamp: Timestamp,
    pub status: StakeStatus,
    pub accumulated_rewards: Decimal,
    pub last_reward_time: Timestamp,
    pub withdrawal_request_time: Option<Timestamp>,
}

impl Stake {
    /// Seconds this stake has existed
    pub fn stake_duration(&self, now: Timestamp) -> u64 {
        now.saturating_sub(self.timestamp)
    }
}

/// An AI validator node registered with the staking system
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiNodeInfo {
    pub node_id: String,
    pub model_name: String,
    pub model_hash: String,
    /// Validation quality score in [0, 1]
    pub reputation_score: f64,
    pub total_validations: u64,
    pub uptime_percentage: f64,
    pub total_delegated: Decimal,
    pub delegator_count: usize,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StakingConfig {
    pub min_stake_amount: Decimal,
    pub withdrawal_delay_seconds: u64,
}

impl Default for StakingConfig {
    fn default() -> Self {
        Self {
            min_stake_amount: dec!(100),
            withdrawal_delay_seconds: 86400,
        }
    }
}

/// Aggregate view of the staking system
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StakingStats {
    pub total_staked: Decimal,
    pub total_rewards_distributed: Decimal,
    pub active_stakes: usize,
    pub registered_nodes: usize,
    pub active_nodes: usize,
}

/// Delegated staking on AI validator nodes.
///
/// Each staker holds at most one live stake, delegated to a registered
/// active node. Unstaking is a two-step state machine: a withdrawal
/// request starts the delay clock, and completion after the delay
/// returns principal plus accumulated rewards.
pub struct StakingSystem {
    config: StakingConfig,
    /// staker_address -> stake (one live stake per staker)
    stakes: HashMap<String, Stake>,
    /// node_id -> staker addresses delegating to it
    node_delegations: HashMap<String, HashSet<String>>,
    ai_nodes: HashMap<String, AiNodeInfo>,
    total_staked: Decimal,
    total_rewards_distributed: Decimal,
}

impl StakingSystem {
    pub fn new(config: StakingConfig) -> Self {
        Self {
            config,
            stakes: HashMap::new(),
            node_delegations: HashMap::new(),
            ai_nodes: HashMap::new(),
            total_staked: Decimal::ZERO,
            total_rewards_distributed: Decimal::ZERO,
        }
    }

    pub fn config(&self) -> &StakingConfig {
        &self.config
    }

    // --- AI node registry ---

    /// Register a new AI validator node, active immediately
    pub fn register_ai_node(
        &mut self,
        node_id: &str,
        model_name: &str,
        model_hash: &str,
    ) -> TokenomicsResult<()> {
        if self.ai_nodes.contains_key(node_id) {
            return Err(TokenomicsError::NodeAlreadyRegistered(node_id.to_string()));
        }

        self.ai_nodes.insert(
            node_id.to_string(),
            AiNodeInfo {
                node_id: node_id.to_string(),
                model_name: model_name.to_string(),
                model_hash: model_hash.to_string(),
                reputation_score: 0.5,
                total_validations: 0,
                uptime_percentage: 100.0,
                total_delegated: Decimal::ZERO,
                delegator_count: 0,
                is_active: true,
            },
        );
        self.node_delegations
            .insert(node_id.to_string(), HashSet::new());

        tracing::info!(node_id = %node_id, model = %model_name, "AI node registered");

        Ok(())
    }

    /// Activate or deactivate a node. Inactive nodes keep their
    /// delegations but accept no new ones.
    pub fn set_node_active(&mut self, node_id: &str, is_active: bool) -> TokenomicsResult<()> {
        let node = self
            .ai_nodes
            .get_mut(node_id)
            .ok_or_else(|| TokenomicsError::NodeNotFound(node_id.to_string()))?;
        node.is_active = is_active;
        Ok(())
    }

    /// Update a node's reputation, clamped to [0, 1]
    pub fn update_node_reputation(&mut self, node_id: &str, score: f64) -> TokenomicsResult<()> {
        let node = self
            .ai_nodes
            .get_mut(node_id)
            .ok_or_else(|| TokenomicsError::NodeNotFound(node_id.to_string()))?;
        node.reputation_score = score.clamp(0.0, 1.0);
        Ok(())
    }

    /// Record a completed validation for a node
    pub fn record_validation(&mut self, node_id: &str) -> TokenomicsResult<()> {
        let node = self
            .ai_nodes
            .get_mut(node_id)
            .ok_or_else(|| TokenomicsError::NodeNotFound(node_id.to_string()))?;
        node.total_validations += 1;
        Ok(())
    }

    pub fn get_node(&self, node_id: &str) -> Option<&AiNodeInfo> {
        self.ai_nodes.get(node_id)
    }

    /// Active nodes meeting a minimum reputation, highest reputation
    /// first
    pub fn available_nodes(&self, min_reputation: f64) -> Vec<&AiNodeInfo> {
        let mut nodes: Vec<&AiNodeInfo> = self
            .ai_nodes
            .values()
            .filter(|n| n.is_active && n.reputation_score >= min_reputation)
            .collect();
        nodes.sort_by(|a, b| {
            b.reputation_score
                .total_cmp(&a.reputation_score)
                .then_with(|| a.node_id.cmp(&b.node_id))
        });
        nodes
    }

    // --- Staking ---

    /// Delegate a stake to an active node.
    ///
    /// Fails below the minimum stake, for unknown or inactive nodes,
    /// and when the staker already has a live (not withdrawn) stake.
    pub fn delegate_stake(
        &mut self,
        staker_address: &str,
        amount: Decimal,
        node_id: &str,
        now: Timestamp,
    ) -> TokenomicsResult<()> {
        if amount < self.config.min_stake_amount {
            return Err(TokenomicsError::BelowMinimumStake {
                minimum: self.config.min_stake_amount,
                amount,
            });
        }

        let node = self
            .ai_nodes
            .get(node_id)
            .ok_or_else(|| TokenomicsError::NodeNotFound(node_id.to_string()))?;
        if !node.is_active {
            return Err(TokenomicsError::NodeInactive(node_id.to_string()));
        }

        if let Some(existing) = self.stakes.get(staker_address) {
            if existing.status != StakeStatus::Withdrawn {
                return Err(TokenomicsError::ActiveStakeExists(
                    staker_address.to_string(),
                ));
            }
        }

        self.stakes.insert(
            staker_address.to_string(),
            Stake {
                staker_address: staker_address.to_string(),
                amount,
                delegated_node_id: node_id.to_string(),
                timestamp: now,
                status: StakeStatus::Active,
                accumulated_rewards: Decimal::ZERO,
                last_reward_time: now,
                withdrawal_request_time: None,
            },
        );

        self.node_delegations
            .entry(node_id.to_string())
            .or_default()
            .insert(staker_address.to_string());

        if let Some(node) = self.ai_nodes.get_mut(node_id) {
            node.total_delegated += amount;
            node.delegator_count += 1;
        }
        self.total_staked += amount;

        tracing::info!(
            staker = %staker_address,
            node_id = %node_id,
            amount = %amount,
            "stake delegated"
        );

        Ok(())
    }

    /// Start the withdrawal delay clock on an active stake
    pub fn request_unstake(
        &mut self,
        staker_address: &str,
        now: Timestamp,
    ) -> TokenomicsResult<()> {
        let stake = self
            .stakes
            .get_mut(staker_address)
            .filter(|s| s.status == StakeStatus::Active)
            .ok_or_else(|| TokenomicsError::StakeNotFound(staker_address.to_string()))?;

        stake.status = StakeStatus::PendingWithdrawal;
        stake.withdrawal_request_time = Some(now);

        tracing::info!(staker = %staker_address, "unstake requested");

        Ok(())
    }

    /// Complete a withdrawal after the delay has elapsed.
    ///
    /// Returns the total payout (principal plus accumulated rewards).
    /// The stake transitions to `Withdrawn` and stays in the registry;
    /// node totals and the system total shrink by the principal.
    pub fn complete_unstake(
        &mut self,
        staker_address: &str,
        now: Timestamp,
    ) -> TokenomicsResult<Decimal> {
        let stake = self
            .stakes
            .get_mut(staker_address)
            .ok_or_else(|| TokenomicsError::StakeNotFound(staker_address.to_string()))?;

        if stake.status != StakeStatus::PendingWithdrawal {
            return Err(TokenomicsError::WithdrawalNotRequested(
                staker_address.to_string(),
            ));
        }

        let requested_at = stake.withdrawal_request_time.ok_or_else(|| {
            TokenomicsError::WithdrawalNotRequested(staker_address.to_string())
        })?;

        let ready_at = requested_at + self.config.withdrawal_delay_seconds;
        if now < ready_at {
            return Err(TokenomicsError::WithdrawalDelayNotMet {
                remaining_seconds: ready_at - now,
            });
        }

        let principal = stake.amount;
        let payout = principal + stake.accumulated_rewards;
        let node_id = stake.delegated_node_id.clone();
        stake.status = StakeStatus::Withdrawn;

        if let Some(delegators) = self.node_delegations.get_mut(&node_id) {
            delegators.remove(staker_address);
        }
        if let Some(node) = self.ai_nodes.get_mut(&node_id) {
            node.total_delegated -= principal;
            node.delegator_count = node.delegator_count.saturating_sub(1);
        }
        self.total_staked -= principal;

        tracing::info!(
            staker = %staker_address,
            payout = %payout,
            "unstake completed"
        );

        Ok(payout)
    }

    /// Distribute the staker share of a block reward across active
    /// stakes, proportional to stake amount. Rewards accrue on the
    /// stake; they pay out at withdrawal. Returns the per-staker
    /// amounts credited.
    pub fn calculate_staking_rewards(
        &mut self,
        staker_portion: Decimal,
        now: Timestamp,
    ) -> HashMap<String, Decimal> {
        let mut credited = HashMap::new();
        if staker_portion <= Decimal::ZERO {
            return credited;
        }

        let total_active: Decimal = self
            .stakes
            .values()
            .filter(|s| s.status == StakeStatus::Active)
            .map(|s| s.amount)
            .sum();
        if total_active <= Decimal::ZERO {
            return credited;
        }

        for stake in self.stakes.values_mut() {
            if stake.status != StakeStatus::Active {
                continue;
            }
            let reward = staker_portion * stake.amount / total_active;
            stake.accumulated_rewards += reward;
            stake.last_reward_time = now;
            credited.insert(stake.staker_address.clone(), reward);
        }

        let distributed: Decimal = credited.values().copied().sum();
        self.total_rewards_distributed += distributed;

        credited
    }

    // --- Queries ---

    pub fn stake_info(&self, staker_address: &str) -> Option<&Stake> {
        self.stakes.get(staker_address)
    }

    /// Whether a pending withdrawal has cleared its delay
    pub fn can_withdraw(&self, staker_address: &str, now: Timestamp) -> bool {
        self.stakes
            .get(staker_address)
            .and_then(|s| {
                if s.status != StakeStatus::PendingWithdrawal {
                    return None;
                }
                s.withdrawal_request_time
            })
            .map(|requested_at| now >= requested_at + self.config.withdrawal_delay_seconds)
            .unwrap_or(false)
    }

    /// Stakes currently delegated to a node
    pub fn node_delegations_info(&self, node_id: &str) -> Vec<&Stake> {
        self.node_delegations
            .get(node_id)
            .map(|delegators| {
                let mut stakes: Vec<&Stake> = delegators
                    .iter()
                    .filter_map(|addr| self.stakes.get(addr))
                    .collect();
                stakes.sort_by(|a, b| a.staker_address.cmp(&b.staker_address));
                stakes
            })
            .unwrap_or_default()
    }

    pub fn staking_stats(&self) -> StakingStats {
        StakingStats {
            total_staked: self.total_staked,
            total_rewards_distributed: self.total_rewards_distributed,
            active_stakes: self
                .stakes
                .values()
                .filter(|s| s.status == StakeStatus::Active)
                .count(),
            registered_nodes: self.ai_nodes.len(),
            active_nodes: self.ai_nodes.values().filter(|n| n.is_active).count(),
        }
    }

    // --- Transaction constructors ---

    /// Unsigned stake transaction for a delegation
    pub fn create_stake_transaction(
        &self,
        staker_address: &str,
        node_id: &str,
        amount: Decimal,
        fee: Decimal,
        nonce: u64,
        now: Timestamp,
    ) -> Transaction {
        Transaction::with_timestamp(
            staker_address.to_string(),
            nonce,
            TransactionType::Stake {
                node_id: node_id.to_string(),
                amount,
            },
            fee,
            now,
        )
    }

    /// Unsigned unstake transaction for a completed withdrawal
    pub fn create_unstake_transaction(
        &self,
        staker_address: &str,
        node_id: &str,
        amount: Decimal,
        fee: Decimal,
        nonce: u64,
        now: Timestamp,
    ) -> Transaction {
        Transaction::with_timestamp(
            staker_address.to_string(),
            nonce,
            TransactionType::Unstake {
                node_id: node_id.to_string(),
                amount,
            },
            fee,
            now,
        )
    }
}

impl Default for StakingSystem {
    fn default() -> Self {
        Self::new(StakingConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use playergold_core::TransactionKind;

    const NOW: Timestamp = 1_700_000_000;
    const DAY: u64 = 86400;

    fn system_with_node() -> StakingSystem {
        let mut system = StakingSystem::default();
        system
            .register_ai_node("node-1", "playergold-llm", "abc123")
            .unwrap();
        system
    }

    #[test]
    fn test_register_node() {
        let mut system = system_with_node();
        let node = system.get_node("node-1").unwrap();
        assert!(node.is_active);
        assert_eq!(node.reputation_score, 0.5);
        assert_eq!(node.total_delegated, Decimal::ZERO);

        assert!(matches!(
            system.register_ai_node("node-1", "other", "def"),
            Err(TokenomicsError::NodeAlreadyRegistered(_))
        ));
    }

    #[test]
    fn test_available_nodes_sorted_and_filtered() {
        let mut system = system_with_node();
        system.register_ai_node("node-2", "m", "h2").unwrap();
        system.register_ai_node("node-3", "m", "h3").unwrap();
        system.update_node_reputation("node-2", 0.9).unwrap();
        system.update_node_reputation("node-3", 0.2).unwrap();
        system.set_node_active("node-1", false).unwrap();

        let nodes = system.available_nodes(0.3);
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].node_id, "node-2");

        let nodes = system.available_nodes(0.0);
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].node_id, "node-2");
        assert_eq!(nodes[1].node_id, "node-3");
    }

    #[test]
    fn test_reputation_clamped() {
        let mut system = system_with_node();
        system.update_node_reputation("node-1", 1.7).unwrap();
        assert_eq!(system.get_node("node-1").unwrap().reputation_score, 1.0);
        system.update_node_reputation("node-1", -0.5).unwrap();
        assert_eq!(system.get_node("node-1").unwrap().reputation_score, 0.0);
    }

    #[test]
    fn test_delegate_stake() {
        let mut system = system_with_node();
        system
            .delegate_stake("0xalice", dec!(500), "node-1", NOW)
            .unwrap();

        let stake = system.stake_info("0xalice").unwrap();
        assert_eq!(stake.status, StakeStatus::Active);
        assert_eq!(stake.amount, dec!(500));
        assert_eq!(stake.stake_duration(NOW + 100), 100);

        let node = system.get_node("node-1").unwrap();
        assert_eq!(node.total_delegated, dec!(500));
        assert_eq!(node.delegator_count, 1);
        assert_eq!(system.staking_stats().total_staked, dec!(500));
    }

    #[test]
    fn test_delegate_stake_rejections() {
        let mut system = system_with_node();

        assert!(matches!(
            system.delegate_stake("0xalice", dec!(50), "node-1", NOW),
            Err(TokenomicsError::BelowMinimumStake { .. })
        ));
        assert!(matches!(
            system.delegate_stake("0xalice", dec!(500), "missing", NOW),
            Err(TokenomicsError::NodeNotFound(_))
        ));

        system.set_node_active("node-1", false).unwrap();
        assert!(matches!(
            system.delegate_stake("0xalice", dec!(500), "node-1", NOW),
            Err(TokenomicsError::NodeInactive(_))
        ));
        system.set_node_active("node-1", true).unwrap();

        system
            .delegate_stake("0xalice", dec!(500), "node-1", NOW)
            .unwrap();
        assert!(matches!(
            system.delegate_stake("0xalice", dec!(500), "node-1", NOW),
            Err(TokenomicsError::ActiveStakeExists(_))
        ));
    }

    #[test]
    fn test_withdrawal_state_machine() {
        let mut system = system_with_node();
        system
            .delegate_stake("0xalice", dec!(500), "node-1", NOW)
            .unwrap();

        // Cannot complete without requesting first
        assert!(matches!(
            system.complete_unstake("0xalice", NOW),
            Err(TokenomicsError::WithdrawalNotRequested(_))
        ));

        system.request_unstake("0xalice", NOW).unwrap();
        assert_eq!(
            system.stake_info("0xalice").unwrap().status,
            StakeStatus::PendingWithdrawal
        );
        assert!(!system.can_withdraw("0xalice", NOW));

        // Too early: the error reports the remaining wait
        match system.complete_unstake("0xalice", NOW + DAY - 600) {
            Err(TokenomicsError::WithdrawalDelayNotMet { remaining_seconds }) => {
                assert_eq!(remaining_seconds, 600);
            }
            other => panic!("expected delay error, got {:?}", other),
        }

        assert!(system.can_withdraw("0xalice", NOW + DAY));
        let payout = system.complete_unstake("0xalice", NOW + DAY).unwrap();
        assert_eq!(payout, dec!(500));

        let stake = system.stake_info("0xalice").unwrap();
        assert_eq!(stake.status, StakeStatus::Withdrawn);
        assert_eq!(system.staking_stats().total_staked, Decimal::ZERO);
        assert_eq!(system.get_node("node-1").unwrap().delegator_count, 0);
    }

    #[test]
    fn test_pending_stake_cannot_request_again() {
        let mut system = system_with_node();
        system
            .delegate_stake("0xalice", dec!(500), "node-1", NOW)
            .unwrap();
        system.request_unstake("0xalice", NOW).unwrap();

        assert!(matches!(
            system.request_unstake("0xalice", NOW + 10),
            Err(TokenomicsError::StakeNotFound(_))
        ));
    }

    #[test]
    fn test_redelegation_after_withdrawal() {
        let mut system = system_with_node();
        system
            .delegate_stake("0xalice", dec!(500), "node-1", NOW)
            .unwrap();
        system.request_unstake("0xalice", NOW).unwrap();
        system.complete_unstake("0xalice", NOW + DAY).unwrap();

        // A withdrawn stake may be replaced
        system
            .delegate_stake("0xalice", dec!(800), "node-1", NOW + DAY + 10)
            .unwrap();
        let stake = system.stake_info("0xalice").unwrap();
        assert_eq!(stake.amount, dec!(800));
        assert_eq!(stake.status, StakeStatus::Active);
        assert_eq!(system.staking_stats().total_staked, dec!(800));
    }

    #[test]
    fn test_rewards_accrue_and_pay_out() {
        let mut system = system_with_node();
        system
            .delegate_stake("0xalice", dec!(300), "node-1", NOW)
            .unwrap();
        system
            .delegate_stake("0xbob", dec!(100), "node-1", NOW)
            .unwrap();

        let credited = system.calculate_staking_rewards(dec!(40), NOW + 60);
        assert_eq!(credited["0xalice"], dec!(30));
        assert_eq!(credited["0xbob"], dec!(10));
        assert_eq!(
            system.staking_stats().total_rewards_distributed,
            dec!(40)
        );
        assert_eq!(
            system.stake_info("0xalice").unwrap().last_reward_time,
            NOW + 60
        );

        // Pending stakes earn nothing
        system.request_unstake("0xbob", NOW + 120).unwrap();
        let credited = system.calculate_staking_rewards(dec!(40), NOW + 180);
        assert_eq!(credited.len(), 1);
        assert_eq!(credited["0xalice"], dec!(40));

        // Alice withdraws principal plus both rewards
        system.request_unstake("0xalice", NOW + 200).unwrap();
        let payout = system
            .complete_unstake("0xalice", NOW + 200 + DAY)
            .unwrap();
        assert_eq!(payout, dec!(300) + dec!(30) + dec!(40));
    }

    #[test]
    fn test_rewards_with_no_active_stakes() {
        let mut system = system_with_node();
        assert!(system.calculate_staking_rewards(dec!(40), NOW).is_empty());
        assert!(system
            .calculate_staking_rewards(Decimal::ZERO, NOW)
            .is_empty());
    }

    #[test]
    fn test_node_delegations_info() {
        let mut system = system_with_node();
        system
            .delegate_stake("0xbob", dec!(100), "node-1", NOW)
            .unwrap();
        system
            .delegate_stake("0xalice", dec!(300), "node-1", NOW)
            .unwrap();

        let stakes = system.node_delegations_info("node-1");
        assert_eq!(stakes.len(), 2);
        assert_eq!(stakes[0].staker_address, "0xalice");
        assert_eq!(stakes[1].staker_address, "0xbob");
        assert!(system.node_delegations_info("missing").is_empty());
    }

    #[test]
    fn test_stake_transactions() {
        let system = system_with_node();
        let tx = system.create_stake_transaction("0xalice", "node-1", dec!(500), dec!(0.05), 3, NOW);
        assert_eq!(tx.tx_type.kind(), TransactionKind::Stake);
        assert_eq!(tx.to_address(), "stake:node-1");
        assert_eq!(tx.tx_type.amount(), dec!(500));
        assert_eq!(tx.nonce, 3);

        let tx =
            system.create_unstake_transaction("0xalice", "node-1", dec!(500), dec!(0.05), 4, NOW);
        assert_eq!(tx.tx_type.kind(), TransactionKind::Unstake);
        assert_eq!(tx.to_address(), "stake:node-1");
    }
}
