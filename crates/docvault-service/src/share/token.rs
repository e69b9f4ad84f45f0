//! Share token issuance and share URL composition.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;

/// Number of random bytes per token (256 bits of entropy).
const TOKEN_BYTES: usize = 32;

/// Issues unguessable share tokens and derives public share URLs.
#[derive(Debug, Clone, Default)]
pub struct TokenIssuer;

impl TokenIssuer {
    /// Creates a new token issuer.
    pub fn new() -> Self {
        Self
    }

    /// Issues a fresh token from a cryptographically secure random source,
    /// encoded URL-safe.
    ///
    /// Collisions are practically impossible at 256 bits; the store's
    /// unique-token constraint is the backstop, and the service retries
    /// with a fresh token if it ever fires.
    pub fn issue(&self) -> String {
        let mut bytes = [0u8; TOKEN_BYTES];
        rand::rng().fill_bytes(&mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }

    /// Composes the public share URL for a token. Pure string composition.
    pub fn share_url(&self, base_url: &str, token: &str) -> String {
        format!("{}/shared/{token}", base_url.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_are_unique_and_url_safe() {
        let issuer = TokenIssuer::new();
        let a = issuer.issue();
        let b = issuer.issue();

        assert_ne!(a, b);
        // 32 bytes base64-encoded without padding.
        assert_eq!(a.len(), 43);
        assert!(
            a.chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn test_share_url_composition() {
        let issuer = TokenIssuer::new();
        assert_eq!(
            issuer.share_url("https://vault.example", "abc123"),
            "https://vault.example/shared/abc123"
        );
        // Trailing slash on the base must not double up.
        assert_eq!(
            issuer.share_url("https://vault.example/", "abc123"),
            "https://vault.example/shared/abc123"
        );
    }
}
