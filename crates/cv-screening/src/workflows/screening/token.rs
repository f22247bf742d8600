use std::fmt::{self, Write as _};

use serde::{Deserialize, Serialize};

/// Opaque, read-only lookup key for an application's public status page.
///
/// 16 bytes from the operating system's secure random source, rendered as
/// 32 lowercase hex characters. Carries nothing about the application it
/// identifies.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusToken(String);

pub const STATUS_TOKEN_LEN: usize = 32;

const STATUS_TOKEN_BYTES: usize = STATUS_TOKEN_LEN / 2;

impl StatusToken {
    pub(crate) fn generate() -> Result<Self, TokenError> {
        let mut bytes = [0u8; STATUS_TOKEN_BYTES];
        getrandom::getrandom(&mut bytes).map_err(TokenError::Entropy)?;

        let mut hex = String::with_capacity(STATUS_TOKEN_LEN);
        for byte in bytes {
            // Writing into a String cannot fail.
            let _ = write!(hex, "{byte:02x}");
        }
        Ok(Self(hex))
    }

    /// Accepts only well-formed tokens (32 lowercase hex characters).
    pub fn parse(raw: &str) -> Option<Self> {
        let well_formed = raw.len() == STATUS_TOKEN_LEN
            && raw
                .bytes()
                .all(|byte| byte.is_ascii_digit() || (b'a'..=b'f').contains(&byte));
        well_formed.then(|| Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StatusToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Tokens grant read access; keep them out of logs and panic messages.
impl fmt::Debug for StatusToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StatusToken({}…)", &self.0[..4.min(self.0.len())])
    }
}

/// Existence check supplied by whoever stores issued tokens.
pub trait TokenRegistry: Send + Sync {
    fn token_exists(&self, token: &StatusToken) -> Result<bool, TokenRegistryError>;
}

#[derive(Debug, thiserror::Error)]
#[error("token registry unavailable: {0}")]
pub struct TokenRegistryError(pub String);

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token space exhausted after {attempts} attempts")]
    Exhausted { attempts: u32 },
    #[error(transparent)]
    Registry(#[from] TokenRegistryError),
    #[error("secure random source unavailable: {0}")]
    Entropy(getrandom::Error),
}

/// Generate, check, regenerate on collision, up to `max_attempts` draws.
///
/// With 128 random bits a single collision is already astronomically
/// unlikely; running out of attempts means the registry is misbehaving (for
/// example reporting every token as taken) and is surfaced as
/// [`TokenError::Exhausted`] rather than issuing a duplicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenIssuer {
    max_attempts: u32,
}

impl Default for TokenIssuer {
    fn default() -> Self {
        Self::new(16)
    }
}

impl TokenIssuer {
    /// A budget of zero is treated as one attempt.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn issue<G>(&self, registry: &G) -> Result<StatusToken, TokenError>
    where
        G: TokenRegistry + ?Sized,
    {
        for _ in 0..self.max_attempts {
            if let Some(token) = self.draw(registry)? {
                return Ok(token);
            }
        }

        Err(TokenError::Exhausted {
            attempts: self.max_attempts,
        })
    }

    /// A single draw: a fresh token, or `None` when the registry already
    /// holds it. Counts as one attempt against the budget.
    pub fn draw<G>(&self, registry: &G) -> Result<Option<StatusToken>, TokenError>
    where
        G: TokenRegistry + ?Sized,
    {
        let token = StatusToken::generate()?;
        if registry.token_exists(&token)? {
            tracing::debug!("status token collision; drawing again");
            return Ok(None);
        }
        Ok(Some(token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct SetRegistry {
        issued: Mutex<HashSet<StatusToken>>,
    }

    impl TokenRegistry for SetRegistry {
        fn token_exists(&self, token: &StatusToken) -> Result<bool, TokenRegistryError> {
            Ok(self.issued.lock().expect("registry mutex poisoned").contains(token))
        }
    }

    struct CollidingRegistry {
        collisions_left: AtomicU32,
        checks: AtomicU32,
    }

    impl TokenRegistry for CollidingRegistry {
        fn token_exists(&self, _token: &StatusToken) -> Result<bool, TokenRegistryError> {
            self.checks.fetch_add(1, Ordering::SeqCst);
            let left = self.collisions_left.load(Ordering::SeqCst);
            if left > 0 {
                self.collisions_left.store(left - 1, Ordering::SeqCst);
                return Ok(true);
            }
            Ok(false)
        }
    }

    struct OfflineRegistry;

    impl TokenRegistry for OfflineRegistry {
        fn token_exists(&self, _token: &StatusToken) -> Result<bool, TokenRegistryError> {
            Err(TokenRegistryError("database offline".to_string()))
        }
    }

    #[test]
    fn ten_thousand_sequential_tokens_are_distinct_hex() {
        let issuer = TokenIssuer::default();
        let registry = SetRegistry::default();

        for _ in 0..10_000 {
            let token = issuer.issue(&registry).expect("token issued");
            assert_eq!(token.as_str().len(), STATUS_TOKEN_LEN);
            assert!(StatusToken::parse(token.as_str()).is_some());
            let fresh = registry
                .issued
                .lock()
                .expect("registry mutex poisoned")
                .insert(token);
            assert!(fresh, "duplicate token issued");
        }

        assert_eq!(registry.issued.lock().expect("mutex").len(), 10_000);
    }

    #[test]
    fn collisions_are_retried() {
        let registry = CollidingRegistry {
            collisions_left: AtomicU32::new(3),
            checks: AtomicU32::new(0),
        };

        TokenIssuer::new(5).issue(&registry).expect("fourth draw succeeds");

        assert_eq!(registry.checks.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn exhausted_budget_is_a_distinct_error() {
        let registry = CollidingRegistry {
            collisions_left: AtomicU32::new(u32::MAX),
            checks: AtomicU32::new(0),
        };

        match TokenIssuer::new(3).issue(&registry) {
            Err(TokenError::Exhausted { attempts }) => assert_eq!(attempts, 3),
            other => panic!("expected exhaustion, got {other:?}"),
        }
        assert_eq!(registry.checks.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn registry_failures_propagate() {
        assert!(matches!(
            TokenIssuer::default().issue(&OfflineRegistry),
            Err(TokenError::Registry(_))
        ));
    }

    #[test]
    fn parse_rejects_malformed_tokens() {
        assert!(StatusToken::parse("0123456789abcdef0123456789abcdef").is_some());
        assert!(StatusToken::parse("0123456789ABCDEF0123456789ABCDEF").is_none());
        assert!(StatusToken::parse("short").is_none());
        assert!(StatusToken::parse("g123456789abcdef0123456789abcdef").is_none());
    }

    #[test]
    fn debug_output_does_not_leak_the_token() {
        let token = StatusToken::generate().expect("token generated");
        let rendered = format!("{token:?}");
        assert!(!rendered.contains(token.as_str()));
    }

    #[test]
    fn zero_budget_still_draws_once() {
        assert_eq!(TokenIssuer::new(0).max_attempts(), 1);
    }

    #[test]
    fn every_position_is_random() {
        let tokens: Vec<StatusToken> = (0..2_000)
            .map(|_| StatusToken::generate().expect("token generated"))
            .collect();

        for position in 0..STATUS_TOKEN_LEN {
            let seen: HashSet<u8> = tokens
                .iter()
                .map(|token| token.as_str().as_bytes()[position])
                .collect();
            assert!(
                seen.len() > 8,
                "position {position} only took {} values",
                seen.len()
            );
        }
    }

    #[test]
    fn a_draw_checks_the_registry_once() {
        let registry = CollidingRegistry {
            collisions_left: AtomicU32::new(1),
            checks: AtomicU32::new(0),
        };
        let issuer = TokenIssuer::default();

        assert!(issuer.draw(&registry).expect("draw runs").is_none());
        assert!(issuer.draw(&registry).expect("draw runs").is_some());
        assert_eq!(registry.checks.load(Ordering::SeqCst), 2);
    }
}
