//! Component configuration.
//!
//! Plain serde structs with validation; loading them from files or the
//! environment is the embedding application's job.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Cache layer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Whether the cache-aside layer is active at all.
    pub enabled: bool,

    /// Backend selector: "redis" or "memory".
    pub backend: String,

    /// TTL applied to every record and ordered index write. This is the
    /// bound on staleness; there is no explicit invalidation path.
    pub default_ttl_seconds: u32,

    /// Redis connection settings, required when `backend = "redis"`.
    pub redis: Option<RedisConfig>,
}

impl CacheConfig {
    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(u64::from(self.default_ttl_seconds))
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.default_ttl_seconds == 0 {
            return Err("default_ttl_seconds must be greater than 0".to_string());
        }

        if self.enabled && self.backend == "redis" && self.redis.is_none() {
            return Err("redis backend selected but [cache.redis] is missing".to_string());
        }

        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            backend: "redis".to_string(),
            default_ttl_seconds: 300,
            redis: None,
        }
    }
}

/// Redis connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    pub url: String,

    /// Connect timeout; a slow cache is worse than no cache.
    pub connection_timeout_seconds: u32,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
            connection_timeout_seconds: 5,
        }
    }
}

/// Per-identity admission budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Maximum tokens a bucket holds; also the burst size.
    pub capacity: u32,

    /// Window over which a full budget of tokens accrues. Refill is
    /// continuous, not a fixed window reset.
    pub refill_window_seconds: u64,
}

impl RateLimitConfig {
    pub fn refill_window(&self) -> Duration {
        Duration::from_secs(self.refill_window_seconds)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.capacity == 0 {
            return Err("capacity must be greater than 0".to_string());
        }

        if self.refill_window_seconds == 0 {
            return Err("refill_window_seconds must be greater than 0".to_string());
        }

        Ok(())
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        // 100 requests per rolling minute per identity
        Self {
            capacity: 100,
            refill_window_seconds: 60,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_config_validation() {
        let valid = CacheConfig::default();
        assert!(valid.redis.is_none());
        // redis backend without redis settings is rejected
        assert!(valid.validate().is_err());

        let with_redis = CacheConfig {
            redis: Some(RedisConfig::default()),
            ..CacheConfig::default()
        };
        assert!(with_redis.validate().is_ok());

        let memory = CacheConfig {
            backend: "memory".to_string(),
            ..CacheConfig::default()
        };
        assert!(memory.validate().is_ok());

        let zero_ttl = CacheConfig {
            backend: "memory".to_string(),
            default_ttl_seconds: 0,
            ..CacheConfig::default()
        };
        assert!(zero_ttl.validate().is_err());
    }

    #[test]
    fn test_rate_limit_config_validation() {
        let valid = RateLimitConfig::default();
        assert!(valid.validate().is_ok());
        assert_eq!(valid.capacity, 100);
        assert_eq!(valid.refill_window(), Duration::from_secs(60));

        let invalid = RateLimitConfig {
            capacity: 0,
            ..RateLimitConfig::default()
        };
        assert!(invalid.validate().is_err());

        let invalid = RateLimitConfig {
            refill_window_seconds: 0,
            ..RateLimitConfig::default()
        };
        assert!(invalid.validate().is_err());
    }
}
