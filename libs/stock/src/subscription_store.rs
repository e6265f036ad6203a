use std::time::Duration;

use anyhow::Error;
use async_trait::async_trait;
use fred::prelude::*;
use tracing::error;

/// Outcome of registering a (user, ticker) pair. A pair that is already
/// present is a normal outcome, not a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    AlreadyExists,
}

/// Outcome of deleting a (user, ticker) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    NotFound,
}

/// Per-user ticker registrations. The store owns the collection; callers
/// go through these operations only.
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    async fn upsert(&self, user_id: &str, ticker: &str) -> Result<UpsertOutcome, Error>;
    async fn remove(&self, user_id: &str, ticker: &str) -> Result<RemoveOutcome, Error>;
    async fn list_for(&self, user_id: &str) -> Result<Vec<String>, Error>;
    async fn list_all(&self) -> Result<Vec<(String, String)>, Error>;
}

#[derive(Clone)]
pub struct RedisSubscriptionStore {
    client: Client,
    key_prefix: String,
}

impl RedisSubscriptionStore {
    pub async fn new(redis_url: &str, key: impl Into<String>) -> Result<Self, Error> {
        let config = Config::from_url(redis_url)?;

        let client = Builder::from_config(config)
            .with_connection_config(|config| {
                config.connection_timeout = Duration::from_secs(5);
                config.tcp = TcpConfig {
                    nodelay: Some(true),
                    ..Default::default()
                };
            })
            .build()?;

        client.on_error(|(error, server)| async move {
            error!("{:?}: Redis connection error: {:?}", server, error);
            Ok(())
        });

        client.connect();
        client.wait_for_connect().await?;

        Ok(Self {
            client,
            key_prefix: key.into(),
        })
    }

    /// Create a new RedisSubscriptionStore from environment variables.
    /// Expects REDIS_URL and REDIS_KEY_PREFIX to be set.
    pub async fn from_env() -> Result<Self, Error> {
        use std::env;

        let redis_url = env::var("REDIS_URL")
            .map_err(|_| Error::msg("REDIS_URL environment variable not set"))?;
        let key_prefix = env::var("REDIS_KEY_PREFIX")
            .map_err(|_| Error::msg("REDIS_KEY_PREFIX environment variable not set"))?;

        Self::new(&redis_url, key_prefix).await
    }

    fn normalize(ticker: &str) -> String {
        ticker.trim().to_string()
    }

    fn users_key(&self) -> String {
        format!("{}:users", self.key_prefix)
    }

    fn subs_key(&self, user_id: &str) -> String {
        format!("{}:subs:{}", self.key_prefix, user_id)
    }
}

#[async_trait]
impl SubscriptionStore for RedisSubscriptionStore {
    /// SADD is atomic, so two near-simultaneous registrations of the same
    /// pair still end up as one member.
    async fn upsert(&self, user_id: &str, ticker: &str) -> Result<UpsertOutcome, Error> {
        let _: i64 = self.client.sadd(self.users_key(), user_id).await?;

        let added: i64 = self
            .client
            .sadd(self.subs_key(user_id), Self::normalize(ticker))
            .await?;

        Ok(if added == 1 {
            UpsertOutcome::Created
        } else {
            UpsertOutcome::AlreadyExists
        })
    }

    async fn remove(&self, user_id: &str, ticker: &str) -> Result<RemoveOutcome, Error> {
        let removed: i64 = self
            .client
            .srem(self.subs_key(user_id), Self::normalize(ticker))
            .await?;

        if removed != 1 {
            return Ok(RemoveOutcome::NotFound);
        }

        let left: i64 = self.client.scard(self.subs_key(user_id)).await?;
        if left == 0 {
            let _: i64 = self.client.srem(self.users_key(), user_id).await?;
        }

        Ok(RemoveOutcome::Removed)
    }

    async fn list_for(&self, user_id: &str) -> Result<Vec<String>, Error> {
        self.client
            .smembers(self.subs_key(user_id))
            .await
            .map_err(Error::from)
    }

    async fn list_all(&self) -> Result<Vec<(String, String)>, Error> {
        let users: Vec<String> = self.client.smembers(self.users_key()).await?;

        let mut pairs = Vec::new();
        for user_id in users {
            let tickers: Vec<String> = self.client.smembers(self.subs_key(&user_id)).await?;
            for ticker in tickers {
                pairs.push((user_id.clone(), ticker));
            }
        }

        Ok(pairs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_trims_whitespace() {
        assert_eq!(RedisSubscriptionStore::normalize(" 2330 "), "2330");
    }
}
