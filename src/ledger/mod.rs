use crate::domain::event::PaymentEvent;
use thiserror::Error;

pub mod store_pg;

#[derive(Debug, Error)]
pub enum ApplyError {
    #[error("payment transaction {0} not found")]
    TransactionNotFound(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

#[async_trait::async_trait]
pub trait LedgerStore: Send + Sync {
    async fn apply(&self, event: &PaymentEvent) -> Result<(), ApplyError>;
}
