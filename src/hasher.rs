use crate::error::{TimelineError, TimelineResult};
use sha2::{Digest, Sha256};

/// Length of a 256-bit digest rendered as lowercase hex.
pub const DIGEST_HEX_LEN: usize = 64;

/// The one external capability the chain consumes: a deterministic hash over
/// the decimal string form of a timestamp, reproducible across platforms.
///
/// Implementations must fail explicitly (`HashUnavailable` / `HashFailure`)
/// rather than degrade; the chain's reproducibility guarantee is void without
/// a working digest.
pub trait TimestampHasher: Send + Sync {
    fn digest_timestamp(&self, timestamp_ms: i64) -> TimelineResult<String>;
}

/// Default SHA-256 hasher.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sha256Hasher;

impl TimestampHasher for Sha256Hasher {
    fn digest_timestamp(&self, timestamp_ms: i64) -> TimelineResult<String> {
        let mut hasher = Sha256::new();
        hasher.update(timestamp_ms.to_string().as_bytes());
        Ok(hex::encode(hasher.finalize()))
    }
}

/// Reject digests that are not exactly 64 lowercase hex characters. Custom
/// hasher implementations are the only way malformed output can enter the
/// chain, and it must surface as `HashFailure`, not as a bad duration.
pub fn validate_digest(digest: &str) -> TimelineResult<()> {
    let well_formed = digest.len() == DIGEST_HEX_LEN
        && digest
            .bytes()
            .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'));
    if !well_formed {
        return Err(TimelineError::hash_failure(format!(
            "malformed digest: expected {DIGEST_HEX_LEN} lowercase hex chars, got {digest:?}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn sha256_of_zero_timestamp_matches_known_digest() {
        let digest = Sha256Hasher.digest_timestamp(0).unwrap();
        assert_eq!(
            digest,
            "5feceb66ffc86f38d952786c6d696c79c2dbc239dd4e91b46729d73a27fb57e9"
        );
    }

    #[test]
    fn digest_covers_decimal_string_form() {
        // Negative timestamps hash their sign character too.
        let digest = Sha256Hasher.digest_timestamp(-1).unwrap();
        let mut reference = Sha256::new();
        reference.update(b"-1");
        assert_eq!(digest, hex::encode(reference.finalize()));
    }

    #[test]
    fn validation_rejects_short_and_uppercase_digests() {
        assert!(validate_digest(&"ab".repeat(32)).is_ok());
        assert!(validate_digest("abc").is_err());
        assert!(validate_digest(&"AB".repeat(32)).is_err());
        assert!(validate_digest(&"zz".repeat(32)).is_err());
    }
}
