// playergold-core/src/transaction.rs

use crate::{types::*, CoreError, CoreResult};
use playergold_crypto::{hash::Hashable, Hash, KeyPair, PublicKey, Signature};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Well-known sink address for burned tokens
pub const BURN_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// Payload-free transaction discriminant, used to key fee tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    Transfer,
    Burn,
    Stake,
    Unstake,
    Reward,
}

impl TransactionKind {
    /// Wire name used in the canonical signing payload
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Transfer => "transfer",
            TransactionKind::Burn => "burn",
            TransactionKind::Stake => "stake",
            TransactionKind::Unstake => "unstake",
            TransactionKind::Reward => "reward",
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Transaction payloads with typed fields per variant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TransactionType {
    /// Standard token transfer
    Transfer { to: String, amount: Decimal },
    /// Token burn (tokens sent to the burn sink)
    Burn { amount: Decimal },
    /// Stake delegated to an AI node
    Stake { node_id: String, amount: Decimal },
    /// Release a delegated stake
    Unstake { node_id: String, amount: Decimal },
    /// Block reward payout
    Reward { to: String, amount: Decimal },
}

impl TransactionType {
    pub fn kind(&self) -> TransactionKind {
        match self {
            TransactionType::Transfer { .. } => TransactionKind::Transfer,
            TransactionType::Burn { .. } => TransactionKind::Burn,
            TransactionType::Stake { .. } => TransactionKind::Stake,
            TransactionType::Unstake { .. } => TransactionKind::Unstake,
            TransactionType::Reward { .. } => TransactionKind::Reward,
        }
    }

    /// Token amount carried by the payload
    pub fn amount(&self) -> Decimal {
        match self {
            TransactionType::Transfer { amount, .. }
            | TransactionType::Burn { amount }
            | TransactionType::Stake { amount, .. }
            | TransactionType::Unstake { amount, .. }
            | TransactionType::Reward { amount, .. } => *amount,
        }
    }

    /// Destination address in the flat wire form
    pub fn to_address(&self) -> String {
        match self {
            TransactionType::Transfer { to, .. } | TransactionType::Reward { to, .. } => {
                to.clone()
            }
            TransactionType::Burn { .. } => BURN_ADDRESS.to_string(),
            TransactionType::Stake { node_id, .. }
            | TransactionType::Unstake { node_id, .. } => format!("stake:{}", node_id),
        }
    }
}

/// Canonical signing payload. Field names mirror the wire form and are
/// declared in alphabetical order so serialization matches a sorted-key
/// JSON document.
#[derive(Serialize)]
struct SigningPayload<'a> {
    amount: String,
    fee: String,
    from_address: &'a str,
    nonce: Nonce,
    timestamp: Timestamp,
    to_address: String,
    transaction_type: &'static str,
}

/// Complete transaction structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Sender's address (string form; pseudo-addresses like "network"
    /// and "fee_collector" are valid senders for protocol transactions)
    pub from_address: String,
    /// Transaction nonce
    pub nonce: Nonce,
    /// Typed payload
    pub tx_type: TransactionType,
    /// Fee paid by the sender
    pub fee: Decimal,
    /// Transaction timestamp
    pub timestamp: Timestamp,
    /// Digital signature over the canonical hash
    pub signature: Option<Signature>,
}

impl Transaction {
    /// Create a new unsigned transaction
    pub fn new(from_address: String, nonce: Nonce, tx_type: TransactionType, fee: Decimal) -> Self {
        Self {
            from_address,
            nonce,
            tx_type,
            fee,
            timestamp: current_timestamp(),
            signature: None,
        }
    }

    /// Create an unsigned transaction with an explicit timestamp
    pub fn with_timestamp(
        from_address: String,
        nonce: Nonce,
        tx_type: TransactionType,
        fee: Decimal,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            from_address,
            nonce,
            tx_type,
            fee,
            timestamp,
            signature: None,
        }
    }

    pub fn kind(&self) -> TransactionKind {
        self.tx_type.kind()
    }

    pub fn amount(&self) -> Decimal {
        self.tx_type.amount()
    }

    pub fn to_address(&self) -> String {
        self.tx_type.to_address()
    }

    /// SHA-256 over the canonical JSON of the non-signature fields
    pub fn hash(&self) -> Hash {
        let payload = SigningPayload {
            amount: self.amount().to_string(),
            fee: self.fee.to_string(),
            from_address: &self.from_address,
            nonce: self.nonce,
            timestamp: self.timestamp,
            to_address: self.to_address(),
            transaction_type: self.kind().as_str(),
        };
        let bytes = serde_json::to_vec(&payload).unwrap();
        bytes.hash()
    }

    /// Sign the transaction hash with an Ed25519 keypair
    pub fn sign(&mut self, keypair: &KeyPair) -> CoreResult<()> {
        if self.signature.is_some() {
            return Err(CoreError::AlreadySigned);
        }
        let hash = self.hash();
        let signature = keypair.sign(hash.as_bytes())?;
        self.signature = Some(signature);
        Ok(())
    }

    /// Verify the transaction signature
    pub fn verify_signature(&self, public_key: &PublicKey) -> CoreResult<bool> {
        let signature = self
            .signature
            .as_ref()
            .ok_or_else(|| CoreError::InvalidTransaction("Missing signature".into()))?;

        let hash = self.hash();
        Ok(public_key.verify(hash.as_bytes(), signature)?)
    }

    /// Validate basic transaction properties
    pub fn validate_basic(&self, now: Timestamp) -> CoreResult<()> {
        if self.amount() <= Decimal::ZERO {
            return Err(CoreError::InvalidTransaction(
                "Amount must be positive".into(),
            ));
        }

        if self.fee < Decimal::ZERO {
            return Err(CoreError::InvalidTransaction(
                "Fee cannot be negative".into(),
            ));
        }

        if self.from_address.is_empty() {
            return Err(CoreError::InvalidTransaction(
                "Sender address cannot be empty".into(),
            ));
        }

        // 5-minute tolerance for clock drift
        if self.timestamp > now + 300 {
            return Err(CoreError::InvalidTransaction(
                "Timestamp too far in the future".into(),
            ));
        }

        Ok(())
    }
}
