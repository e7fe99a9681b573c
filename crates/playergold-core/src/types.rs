// playergold-core/src/types.rs

/// Block number/height
pub type BlockNumber = u64;

/// Transaction nonce
pub type Nonce = u64;

/// Timestamp in Unix epoch seconds
pub type Timestamp = u64;

/// Helper to get current timestamp
pub fn current_timestamp() -> Timestamp {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_timestamp_nonzero() {
        assert!(current_timestamp() > 1_600_000_000);
    }
}
