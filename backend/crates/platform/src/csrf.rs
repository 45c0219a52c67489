//! CSRF Protection
//!
//! Double-submit cookie pattern with server-side token tracking:
//! - The server issues a random token, remembers it with an expiry and sets
//!   it in a cookie that page scripts can read (not `HttpOnly`).
//! - The page echoes the token in the `x-csrf-token` header. A cross-site
//!   form cannot read the cookie, so it cannot produce the header.
//!
//! Tokens are NOT consumed by verification. A token can be replayed until
//! it expires, which keeps multi-step forms working without re-fetching.

use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderMap;
use dashmap::DashMap;
use thiserror::Error;

use crate::clock::Clock;
use crate::cookie::{SameSite, SetCookie, extract_cookie};
use crate::crypto::{constant_time_eq, fallback_random_bytes, to_hex, try_random_bytes};
use crate::sweeper::Sweep;

/// Cookie carrying the token. The `__Host-` prefix requires `Secure`,
/// `Path=/` and no `Domain`.
pub const CSRF_COOKIE_NAME: &str = "__Host-csrf-token";
const CSRF_COOKIE_SUFFIX: &str = "csrf-token";

/// Request header echoing the token
pub const CSRF_HEADER_NAME: &str = "x-csrf-token";

/// CSRF configuration
#[derive(Debug, Clone)]
pub struct CsrfConfig {
    /// Random bytes per token (hex-encoded, so the token is twice as long)
    pub token_bytes: usize,
    /// Registry lifetime of a token
    pub token_ttl: Duration,
    /// How often expired tokens are swept
    pub cleanup_interval: Duration,
}

impl Default for CsrfConfig {
    fn default() -> Self {
        Self {
            token_bytes: 32,
            token_ttl: Duration::from_secs(60 * 60),
            cleanup_interval: Duration::from_secs(5 * 60),
        }
    }
}

impl CsrfConfig {
    /// Cookie the token is set in; readable by page scripts
    pub fn cookie(&self) -> SetCookie {
        SetCookie::host_only(CSRF_COOKIE_SUFFIX, SameSite::Strict).max_age(self.token_ttl)
    }
}

/// A freshly issued token
#[derive(Debug, Clone)]
pub struct IssuedCsrfToken {
    pub token: String,
    /// Full `Set-Cookie` header value
    pub cookie: String,
    pub expires_at_ms: i64,
}

/// Why a request's CSRF token was not accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CsrfRejection {
    /// No token in header or cookie
    #[error("missing CSRF token")]
    Missing,
    /// Unknown, expired, or header and cookie disagree
    #[error("invalid CSRF token")]
    Invalid,
}

/// In-memory CSRF token registry
pub struct CsrfProtector {
    tokens: DashMap<String, i64>,
    config: CsrfConfig,
    clock: Arc<dyn Clock>,
}

impl CsrfProtector {
    pub fn new(config: CsrfConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            tokens: DashMap::new(),
            config,
            clock,
        }
    }

    pub fn config(&self) -> &CsrfConfig {
        &self.config
    }

    /// Issue and register a new token.
    ///
    /// Falls back to a non-cryptographic generator if the OS RNG fails so
    /// the RSVP flow keeps working; the degradation is logged.
    pub fn generate_token(&self) -> IssuedCsrfToken {
        let bytes = match try_random_bytes(self.config.token_bytes) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "OS RNG unavailable, issuing CSRF token from non-cryptographic fallback (degraded mode)"
                );
                fallback_random_bytes(self.config.token_bytes)
            }
        };
        let token = to_hex(&bytes);
        let expires_at_ms = self.clock.now_ms() + self.config.token_ttl.as_millis() as i64;

        self.tokens.insert(token.clone(), expires_at_ms);

        IssuedCsrfToken {
            cookie: self.config.cookie().render(&token),
            token,
            expires_at_ms,
        }
    }

    /// Check a token against the registry.
    ///
    /// Expired tokens are removed on sight. Valid tokens stay registered.
    pub fn verify_token(&self, token: &str) -> bool {
        let Some(expires_at_ms) = self.tokens.get(token).map(|entry| *entry.value()) else {
            return false;
        };

        if self.clock.now_ms() > expires_at_ms {
            self.tokens.remove(token);
            return false;
        }

        true
    }

    /// Full request check: extract the token, require header and cookie to
    /// agree when both are sent, then verify against the registry.
    pub fn verify_request(&self, headers: &HeaderMap) -> Result<(), CsrfRejection> {
        let header_token = header_token(headers);
        let cookie_token = extract_cookie(headers, CSRF_COOKIE_NAME).filter(|t| !t.is_empty());

        if let (Some(header), Some(cookie)) = (&header_token, &cookie_token) {
            if !constant_time_eq(header.as_bytes(), cookie.as_bytes()) {
                return Err(CsrfRejection::Invalid);
            }
        }

        let token = header_token.or(cookie_token).ok_or(CsrfRejection::Missing)?;
        if self.verify_token(&token) {
            Ok(())
        } else {
            Err(CsrfRejection::Invalid)
        }
    }

    pub fn registered_tokens(&self) -> usize {
        self.tokens.len()
    }
}

impl Sweep for CsrfProtector {
    fn sweep(&self) -> usize {
        let now = self.clock.now_ms();
        let before = self.tokens.len();
        self.tokens.retain(|_, expires_at_ms| now <= *expires_at_ms);
        before.saturating_sub(self.tokens.len())
    }
}

fn header_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(CSRF_HEADER_NAME)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Token sent with the request: header first, then cookie.
pub fn get_token_from_request(headers: &HeaderMap) -> Option<String> {
    header_token(headers).or_else(|| extract_cookie(headers, CSRF_COOKIE_NAME).filter(|t| !t.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use axum::http::{HeaderValue, header};

    fn protector() -> (CsrfProtector, ManualClock) {
        let clock = ManualClock::new(1_700_000_000_000);
        (
            CsrfProtector::new(CsrfConfig::default(), Arc::new(clock.clone())),
            clock,
        )
    }

    fn with_header(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CSRF_HEADER_NAME, HeaderValue::from_str(token).unwrap());
        headers
    }

    fn with_cookie(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("{CSRF_COOKIE_NAME}={token}")).unwrap(),
        );
        headers
    }

    #[test]
    fn test_token_format() {
        let (protector, _clock) = protector();
        let issued = protector.generate_token();
        assert_eq!(issued.token.len(), 64);
        assert!(issued.token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(issued.token, protector.generate_token().token);
    }

    #[test]
    fn test_cookie_attributes() {
        let (protector, _clock) = protector();
        let issued = protector.generate_token();
        assert!(issued.cookie.starts_with(&format!("{CSRF_COOKIE_NAME}={}", issued.token)));
        assert!(issued.cookie.contains("Secure"));
        assert!(issued.cookie.contains("SameSite=Strict"));
        assert!(issued.cookie.contains("Path=/"));
        assert!(issued.cookie.contains("Max-Age=3600"));
        assert!(!issued.cookie.contains("HttpOnly"));

        let cookie = protector.config().cookie();
        assert_eq!(cookie.name, CSRF_COOKIE_NAME);
        assert!(cookie.satisfies_prefix());
    }

    #[test]
    fn test_valid_after_issue_and_reusable_until_expiry() {
        let (protector, clock) = protector();
        let issued = protector.generate_token();

        assert!(protector.verify_token(&issued.token));
        assert!(protector.verify_token(&issued.token));

        clock.advance(Duration::from_secs(59 * 60));
        assert!(protector.verify_token(&issued.token));
    }

    #[test]
    fn test_unknown_token_invalid() {
        let (protector, _clock) = protector();
        protector.generate_token();
        assert!(!protector.verify_token("deadbeef"));
        assert!(!protector.verify_token(""));
    }

    #[test]
    fn test_expired_token_removed_on_verify() {
        let (protector, clock) = protector();
        let issued = protector.generate_token();

        clock.advance(Duration::from_secs(60 * 60 + 1));
        assert!(!protector.verify_token(&issued.token));
        assert_eq!(protector.registered_tokens(), 0);
    }

    #[test]
    fn test_sweep_removes_expired_tokens() {
        let (protector, clock) = protector();
        let old = protector.generate_token();
        clock.advance(Duration::from_secs(30 * 60));
        let fresh = protector.generate_token();

        clock.advance(Duration::from_secs(31 * 60));
        assert_eq!(protector.sweep(), 1);
        assert!(!protector.verify_token(&old.token));
        assert!(protector.verify_token(&fresh.token));
    }

    #[test]
    fn test_get_token_prefers_header() {
        let mut headers = with_cookie("from-cookie");
        headers.insert(CSRF_HEADER_NAME, HeaderValue::from_static("from-header"));
        assert_eq!(get_token_from_request(&headers).as_deref(), Some("from-header"));
        assert_eq!(
            get_token_from_request(&with_cookie("from-cookie")).as_deref(),
            Some("from-cookie")
        );
        assert_eq!(get_token_from_request(&HeaderMap::new()), None);
    }

    #[test]
    fn test_verify_request() {
        let (protector, _clock) = protector();
        let issued = protector.generate_token();

        assert_eq!(protector.verify_request(&with_header(&issued.token)), Ok(()));
        assert_eq!(protector.verify_request(&with_cookie(&issued.token)), Ok(()));
        assert_eq!(
            protector.verify_request(&HeaderMap::new()),
            Err(CsrfRejection::Missing)
        );
        assert_eq!(
            protector.verify_request(&with_header("0000")),
            Err(CsrfRejection::Invalid)
        );
    }

    #[test]
    fn test_verify_request_rejects_mismatched_double_submit() {
        let (protector, _clock) = protector();
        let first = protector.generate_token();
        let second = protector.generate_token();

        let mut headers = with_cookie(&first.token);
        headers.insert(
            CSRF_HEADER_NAME,
            HeaderValue::from_str(&second.token).unwrap(),
        );
        assert_eq!(protector.verify_request(&headers), Err(CsrfRejection::Invalid));
    }
}
