use anyhow::Result;
use std::time::Duration;

pub mod redis_stream;

pub const DEFAULT_LEASE: Duration = Duration::from_secs(30);
pub const DEFAULT_BLOCK: Duration = Duration::from_secs(20);

#[derive(Debug, Clone)]
pub struct ReceivedMessage {
    pub id: String,
    pub body: String,
}

#[async_trait::async_trait]
pub trait EventQueue: Send + Sync {
    async fn receive(&self) -> Result<Option<ReceivedMessage>>;

    async fn delete(&self, id: &str) -> Result<()>;

    async fn extend_lease(&self, id: &str, duration: Duration) -> Result<()>;

    async fn send_to(&self, stream_key: &str, body: &str) -> Result<()>;
}
