//! Application Configuration
//!
//! Configuration for the RSVP application layer.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use platform::clock::Clock;
use platform::rate_limit::{
    FixedWindowRateLimiter, RateLimitConfig, RateLimiter, SlidingWindowRateLimiter,
};

pub use crate::domain::validation::ValidationConfig;
pub use platform::csrf::CsrfConfig;
pub use platform::origin::OriginPolicy;

/// Rate-limit bucket an endpoint counts against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    /// RSVP submission
    Submit,
    /// Invite reads and CSRF token issuance
    Read,
    /// Guest-name autocomplete
    Search,
    /// Admin writes
    Admin,
}

impl Bucket {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Bucket::Submit => "submit",
            Bucket::Read => "read",
            Bucket::Search => "search",
            Bucket::Admin => "admin",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-endpoint limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub submit: RateLimitConfig,
    pub read: RateLimitConfig,
    pub search: RateLimitConfig,
    pub admin: RateLimitConfig,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            submit: RateLimitConfig::new(3, 15 * 60),
            read: RateLimitConfig::new(120, 60),
            search: RateLimitConfig::new(30, 60),
            admin: RateLimitConfig::new(5, 60 * 60),
        }
    }
}

impl RateLimitPolicy {
    pub fn for_bucket(&self, bucket: Bucket) -> RateLimitConfig {
        match bucket {
            Bucket::Submit => self.submit,
            Bucket::Read => self.read,
            Bucket::Search => self.search,
            Bucket::Admin => self.admin,
        }
    }
}

/// Which rate limiter implementation to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RateLimitStrategy {
    #[default]
    Fixed,
    Sliding,
}

impl RateLimitStrategy {
    pub fn build(&self, clock: Arc<dyn Clock>) -> Arc<dyn RateLimiter> {
        match self {
            RateLimitStrategy::Fixed => Arc::new(FixedWindowRateLimiter::new(clock)),
            RateLimitStrategy::Sliding => Arc::new(SlidingWindowRateLimiter::new(clock)),
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            RateLimitStrategy::Fixed => "fixed",
            RateLimitStrategy::Sliding => "sliding",
        }
    }
}

impl FromStr for RateLimitStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fixed" => Ok(RateLimitStrategy::Fixed),
            "sliding" => Ok(RateLimitStrategy::Sliding),
            other => Err(format!("unknown rate limit strategy: {other}")),
        }
    }
}

/// RSVP application configuration
#[derive(Debug, Clone)]
pub struct RsvpConfig {
    pub rate_limits: RateLimitPolicy,
    pub rate_limit_strategy: RateLimitStrategy,
    /// How often expired rate-limit records are swept
    pub rate_limit_sweep_interval: Duration,
    pub validation: ValidationConfig,
    pub csrf: CsrfConfig,
    pub origin: OriginPolicy,
    /// Maximum autocomplete suggestions
    pub search_result_limit: usize,
    /// Longer search queries are cut to this many characters
    pub search_query_max_chars: usize,
    /// Length of generated invite codes
    pub invite_code_length: usize,
}

impl Default for RsvpConfig {
    fn default() -> Self {
        Self {
            rate_limits: RateLimitPolicy::default(),
            rate_limit_strategy: RateLimitStrategy::default(),
            rate_limit_sweep_interval: Duration::from_secs(60),
            validation: ValidationConfig::default(),
            csrf: CsrfConfig::default(),
            origin: OriginPolicy {
                enforce: true,
                allowed_origins: Vec::new(),
            },
            search_result_limit: 10,
            search_query_max_chars: 100,
            invite_code_length: 8,
        }
    }
}

impl RsvpConfig {
    /// Create config for development (origin check disabled)
    pub fn development() -> Self {
        Self {
            origin: OriginPolicy::development(),
            ..Self::default()
        }
    }

    /// Production flag and `ALLOWED_ORIGINS`-style list
    pub fn from_env_values(production: bool, allowed_origins: Option<&str>) -> Self {
        Self {
            origin: OriginPolicy::from_env_values(production, allowed_origins),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = RateLimitPolicy::default();
        assert_eq!(policy.submit.max_requests, 3);
        assert_eq!(policy.submit.window, Duration::from_secs(900));
        assert_eq!(policy.read.max_requests, 120);
        assert_eq!(policy.search.max_requests, 30);
        assert_eq!(policy.admin.max_requests, 5);
        assert_eq!(policy.admin.window, Duration::from_secs(3600));
        assert_eq!(policy.for_bucket(Bucket::Search), policy.search);
    }

    #[test]
    fn test_strategy_parsing() {
        assert_eq!("fixed".parse(), Ok(RateLimitStrategy::Fixed));
        assert_eq!(" Sliding ".parse(), Ok(RateLimitStrategy::Sliding));
        assert!("token-bucket".parse::<RateLimitStrategy>().is_err());
    }

    #[test]
    fn test_development_disables_origin_enforcement() {
        assert!(RsvpConfig::default().origin.enforce);
        assert!(!RsvpConfig::development().origin.enforce);
    }

    #[test]
    fn test_from_env_values() {
        let config = RsvpConfig::from_env_values(true, Some("https://wedding.example"));
        assert!(config.origin.enforce);
        assert_eq!(config.origin.allowed_origins, vec!["https://wedding.example"]);
    }
}
