use crate::queue::{EventQueue, ReceivedMessage};
use anyhow::Result;
use redis::streams::{StreamClaimReply, StreamPendingCountReply, StreamReadReply};
use redis::AsyncCommands;
use std::time::Duration;

#[derive(Clone)]
pub struct RedisStreamQueue {
    pub client: redis::Client,
    pub stream_key: String,
    pub group: String,
    pub consumer: String,
    pub lease: Duration,
    pub block: Duration,
}

impl RedisStreamQueue {
    fn lease_key(&self, id: &str) -> String {
        format!("lease:{}:{}:{}", self.stream_key, self.group, id)
    }

    fn entry_body(map: &std::collections::HashMap<String, redis::Value>) -> String {
        map.get("event")
            .and_then(|v| redis::from_redis_value::<String>(v).ok())
            .unwrap_or_default()
    }

    pub async fn ensure_group(&self) -> Result<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: redis::RedisResult<String> = redis::cmd("XGROUP")
            .arg("CREATE")
            .arg(&self.stream_key)
            .arg(&self.group)
            .arg("0")
            .arg("MKSTREAM")
            .query_async(&mut conn)
            .await;
        Ok(())
    }

    async fn reclaim_expired(
        &self,
        conn: &mut redis::aio::MultiplexedConnection,
    ) -> Result<Option<ReceivedMessage>> {
        let pending: StreamPendingCountReply = redis::cmd("XPENDING")
            .arg(&self.stream_key)
            .arg(&self.group)
            .arg("IDLE")
            .arg(self.lease.as_millis() as u64)
            .arg("-")
            .arg("+")
            .arg(16)
            .query_async(conn)
            .await
            .unwrap_or(StreamPendingCountReply { ids: vec![] });

        for candidate in pending.ids {
            let still_leased: bool = conn.exists(self.lease_key(&candidate.id)).await.unwrap_or(true);
            if still_leased {
                continue;
            }

            let claimed: StreamClaimReply = redis::cmd("XCLAIM")
                .arg(&self.stream_key)
                .arg(&self.group)
                .arg(&self.consumer)
                .arg(self.lease.as_millis() as u64)
                .arg(&candidate.id)
                .query_async(conn)
                .await?;

            if let Some(entry) = claimed.ids.into_iter().next() {
                let _: () = conn
                    .set_ex(self.lease_key(&entry.id), &self.consumer, self.lease.as_secs().max(1))
                    .await?;
                return Ok(Some(ReceivedMessage {
                    body: Self::entry_body(&entry.map),
                    id: entry.id,
                }));
            }
        }

        Ok(None)
    }
}

#[async_trait::async_trait]
impl EventQueue for RedisStreamQueue {
    async fn receive(&self) -> Result<Option<ReceivedMessage>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        if let Some(reclaimed) = self.reclaim_expired(&mut conn).await? {
            return Ok(Some(reclaimed));
        }

        let reply: StreamReadReply = redis::cmd("XREADGROUP")
            .arg("GROUP")
            .arg(&self.group)
            .arg(&self.consumer)
            .arg("COUNT")
            .arg(1)
            .arg("BLOCK")
            .arg(self.block.as_millis() as u64)
            .arg("STREAMS")
            .arg(&self.stream_key)
            .arg(">")
            .query_async(&mut conn)
            .await?;

        let Some(entry) = reply.keys.into_iter().flat_map(|k| k.ids).next() else {
            return Ok(None);
        };

        let _: () = conn
            .set_ex(self.lease_key(&entry.id), &self.consumer, self.lease.as_secs().max(1))
            .await?;

        Ok(Some(ReceivedMessage {
            body: Self::entry_body(&entry.map),
            id: entry.id,
        }))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: i64 = redis::cmd("XACK")
            .arg(&self.stream_key)
            .arg(&self.group)
            .arg(id)
            .query_async(&mut conn)
            .await?;
        let _: usize = conn.del(self.lease_key(id)).await?;
        Ok(())
    }

    async fn extend_lease(&self, id: &str, duration: Duration) -> Result<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let secs = (duration + self.lease).as_secs().max(1);
        let _: () = conn.set_ex(self.lease_key(id), &self.consumer, secs).await?;
        Ok(())
    }

    async fn send_to(&self, stream_key: &str, body: &str) -> Result<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: String = redis::cmd("XADD")
            .arg(stream_key)
            .arg("MAXLEN")
            .arg("~")
            .arg(1_000_000)
            .arg("*")
            .arg("event")
            .arg(body)
            .query_async(&mut conn)
            .await?;
        Ok(())
    }
}
