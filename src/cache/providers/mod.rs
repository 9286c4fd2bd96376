//! Cache store implementations.

pub mod memory;

#[cfg(feature = "cache-redis")]
pub mod redis;

pub use memory::InMemoryCacheStore;

#[cfg(feature = "cache-redis")]
pub use self::redis::RedisCacheStore;
