use crate::domain::event::PaymentEvent;
use crate::ledger::{ApplyError, LedgerStore};
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Row, Transaction};

#[derive(Clone)]
pub struct LedgerStorePg {
    pub pool: PgPool,
}

#[derive(Debug, Clone)]
pub struct StoredTransaction {
    pub transaction_id: String,
    pub current_state: String,
    pub last_event_id: Option<String>,
    pub retry_count: i32,
    pub updated_at: DateTime<Utc>,
}

impl LedgerStorePg {
    async fn update_transaction_tx(
        tx: &mut Transaction<'_, Postgres>,
        event: &PaymentEvent,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE payment_transactions
            SET current_state = $1,
                last_event_id = $2,
                updated_at = NOW(),
                retry_count = $3
            WHERE payment_transaction_id = $4
            "#,
        )
        .bind(&event.new_state)
        .bind(&event.event_id)
        .bind(event.retry_count)
        .bind(&event.transaction_id)
        .execute(tx.as_mut())
        .await?;

        Ok(result.rows_affected())
    }

    async fn insert_audit_log_tx(
        tx: &mut Transaction<'_, Postgres>,
        event: &PaymentEvent,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO audit_logs (
                payment_transaction_id, event_id, event_type,
                previous_state, new_state, timestamp, source_service,
                correlation_id, metadata
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(&event.transaction_id)
        .bind(&event.event_id)
        .bind(&event.event_type)
        .bind(event.previous_state.clone())
        .bind(&event.new_state)
        .bind(&event.timestamp)
        .bind(event.source_service.clone())
        .bind(event.correlation_id.clone())
        .bind(event.metadata.clone())
        .execute(tx.as_mut())
        .await?;

        Ok(())
    }

    pub async fn find(&self, transaction_id: &str) -> anyhow::Result<Option<StoredTransaction>> {
        let row = sqlx::query(
            r#"
            SELECT payment_transaction_id, current_state, last_event_id, retry_count, updated_at
            FROM payment_transactions
            WHERE payment_transaction_id = $1
            "#,
        )
        .bind(transaction_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| StoredTransaction {
            transaction_id: r.get("payment_transaction_id"),
            current_state: r.get("current_state"),
            last_event_id: r.get("last_event_id"),
            retry_count: r.get("retry_count"),
            updated_at: r.get("updated_at"),
        }))
    }
}

#[async_trait::async_trait]
impl LedgerStore for LedgerStorePg {
    async fn apply(&self, event: &PaymentEvent) -> Result<(), ApplyError> {
        let mut tx = self.pool.begin().await?;

        let updated = Self::update_transaction_tx(&mut tx, event).await?;
        if updated == 0 {
            return Err(ApplyError::TransactionNotFound(event.transaction_id.clone()));
        }

        Self::insert_audit_log_tx(&mut tx, event).await?;
        tx.commit().await?;
        Ok(())
    }
}
