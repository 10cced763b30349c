pub mod memory_store;
pub mod redis_store;

pub use memory_store::{CacheStoreStats, MemoryCacheStore};
pub use redis_store::RedisCacheStore;
