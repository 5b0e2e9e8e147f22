pub mod store_redis;

#[async_trait::async_trait]
pub trait DedupStore: Send + Sync {
    async fn is_duplicate(&self, event_id: &str) -> bool;

    async fn mark_processed(&self, event_id: &str);
}
