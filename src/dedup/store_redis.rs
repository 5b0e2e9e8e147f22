use crate::dedup::DedupStore;
use redis::AsyncCommands;
use std::time::Duration;

pub const PROCESSED_TTL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Clone)]
pub struct DedupStoreRedis {
    pub client: redis::Client,
}

impl DedupStoreRedis {
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }

    fn processed_key(event_id: &str) -> String {
        format!("processed:{}", event_id)
    }

    async fn lookup(&self, event_id: &str) -> redis::RedisResult<bool> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.exists(Self::processed_key(event_id)).await
    }

    async fn record(&self, event_id: &str) -> redis::RedisResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.set_ex(Self::processed_key(event_id), "1", PROCESSED_TTL.as_secs())
            .await
    }
}

#[async_trait::async_trait]
impl DedupStore for DedupStoreRedis {
    async fn is_duplicate(&self, event_id: &str) -> bool {
        match self.lookup(event_id).await {
            Ok(found) => found,
            Err(err) => {
                tracing::warn!("dedup lookup failed for event {}: {}", event_id, err);
                false
            }
        }
    }

    async fn mark_processed(&self, event_id: &str) {
        if let Err(err) = self.record(event_id).await {
            tracing::warn!("failed to mark event {} as processed: {}", event_id, err);
        }
    }
}
