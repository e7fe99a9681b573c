// playergold-crypto/src/lib.rs

//! Cryptographic primitives for the PlayerGold token platform
//!
//! This crate provides:
//! - SHA-256 hashing
//! - Ed25519 key pairs and signatures
//! - Address derivation from public keys

pub mod hash;
pub mod keypair;
pub mod signature;

pub use hash::{Hash, Hashable};
pub use keypair::{Address, KeyPair, PublicKey, SecretKey};
pub use signature::Signature;

/// Result type for cryptographic operations
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors that can occur during cryptographic operations
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Invalid public key")]
    InvalidPublicKey,

    #[error("Invalid secret key")]
    InvalidSecretKey,

    #[error("Invalid hash")]
    InvalidHash,

    #[error("Deserialization error: {0}")]
    DeserializationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crypto_basics() {
        // Basic smoke test
        let keypair = KeyPair::generate().unwrap();
        let message = b"Hello, PlayerGold!";
        let signature = keypair.sign(message).unwrap();
        assert!(keypair.public_key().verify(message, &signature).unwrap());
    }
}
