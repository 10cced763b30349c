use async_trait::async_trait;
use cascade_dns_application::ports::CacheStore;
use cascade_dns_domain::DomainError;
use redis::aio::ConnectionManager;
use redis::{Client, RedisError};
use std::time::Duration;
use tracing::{debug, info};

/// Key/value store backed by a Redis server shared across instances.
///
/// Entries are written with `SET .. EX` and expire on the server, so there
/// is nothing to sweep locally. The connection manager reconnects on its own
/// after the server goes away.
pub struct RedisCacheStore {
    connection: ConnectionManager,
}

impl RedisCacheStore {
    /// Opens a connection to `url` and checks it answers `PING`.
    ///
    /// Both steps together are bounded by `timeout`.
    pub async fn connect(url: &str, timeout: Duration) -> Result<Self, DomainError> {
        let client = Client::open(url).map_err(unavailable)?;

        let store = tokio::time::timeout(timeout, async {
            let connection = ConnectionManager::new(client).await.map_err(unavailable)?;
            let store = Self { connection };
            store.ping().await?;
            Ok::<_, DomainError>(store)
        })
        .await
        .map_err(|_| DomainError::CacheTimeout)??;

        info!("Connected to Redis answer cache");
        Ok(store)
    }

    pub async fn ping(&self) -> Result<(), DomainError> {
        let mut connection = self.connection.clone();
        let reply: String = redis::cmd("PING")
            .query_async(&mut connection)
            .await
            .map_err(unavailable)?;

        if reply != "PONG" {
            return Err(DomainError::CacheUnavailable(format!(
                "unexpected PING reply '{}'",
                reply
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>, DomainError> {
        let mut connection = self.connection.clone();
        let value: Option<String> = redis::cmd("GET")
            .arg(key)
            .query_async(&mut connection)
            .await
            .map_err(unavailable)?;

        if value.is_none() {
            debug!(key, "Redis cache miss");
        }
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), DomainError> {
        let mut connection = self.connection.clone();
        let _: () = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("EX")
            .arg(expiry_secs(ttl))
            .query_async(&mut connection)
            .await
            .map_err(unavailable)?;
        Ok(())
    }
}

/// Redis expiry has whole-second resolution and rejects 0.
fn expiry_secs(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

fn unavailable(e: RedisError) -> DomainError {
    DomainError::CacheUnavailable(e.to_string())
}
