// src/auth/token.rs
//
// Bearer secrets for sign-in links and session cookies. The raw value only
// ever lives in the email or the cookie; storage keeps the SHA-256 digest.

use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};

pub const TOKEN_BYTES: usize = 32;

/// URL-safe base64 of `TOKEN_BYTES` without padding.
const ENCODED_LEN: usize = (TOKEN_BYTES * 4 + 2) / 3;

pub type TokenHash = [u8; 32];

/// A freshly minted token together with the digest to persist.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub raw: String,
    pub hash: TokenHash,
}

pub fn issue_token() -> IssuedToken {
    issue_token_with(&mut OsRng)
}

pub fn issue_token_with<R: RngCore>(rng: &mut R) -> IssuedToken {
    let mut buf = [0u8; TOKEN_BYTES];
    rng.fill_bytes(&mut buf);
    let raw = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buf);
    let hash = hash_token(&raw);
    IssuedToken { raw, hash }
}

pub fn hash_token(token: &str) -> TokenHash {
    Sha256::digest(token.as_bytes()).into()
}

/// Digest of a token presented by a client, or `None` when it cannot be one
/// we issued. Saves a lookup for garbage cookies and query strings.
pub fn presented_hash(raw: &str) -> Option<TokenHash> {
    let raw = raw.trim();
    let well_formed = raw.len() == ENCODED_LEN
        && raw
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
    well_formed.then(|| hash_token(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn issued_tokens_are_url_safe_and_fixed_length() {
        let mut rng = StdRng::seed_from_u64(123);
        let t = issue_token_with(&mut rng);

        assert_eq!(t.raw.len(), 43);
        assert!(t
            .raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert_eq!(t.hash, hash_token(&t.raw));
    }

    #[test]
    fn consecutive_tokens_differ() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_ne!(issue_token_with(&mut rng).raw, issue_token_with(&mut rng).raw);
    }

    #[test]
    fn presented_hash_matches_issued_hash() {
        let t = issue_token();
        assert_eq!(presented_hash(&format!(" {} ", t.raw)), Some(t.hash));
    }

    #[test]
    fn malformed_tokens_are_rejected() {
        assert_eq!(presented_hash(""), None);
        assert_eq!(presented_hash("short"), None);
        let padded = format!("{}=", "a".repeat(42));
        assert_eq!(presented_hash(&padded), None);
        let wrong_alphabet = format!("{}+", "a".repeat(42));
        assert_eq!(presented_hash(&wrong_alphabet), None);
    }
}
