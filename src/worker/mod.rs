use crate::dedup::DedupStore;
use crate::domain::event::PaymentEvent;
use crate::ledger::LedgerStore;
use crate::queue::{EventQueue, ReceivedMessage};
use crate::retry;
use crate::rules;
use tokio_util::sync::CancellationToken;

enum RetryOutcome {
    Processed,
    Exhausted,
    Aborted,
}

pub struct Worker<Q, D, L> {
    pub id: usize,
    pub queue: Q,
    pub dedup: D,
    pub ledger: L,
    pub dead_letter_stream: String,
    pub shutdown: CancellationToken,
}

impl<Q, D, L> Worker<Q, D, L>
where
    Q: EventQueue,
    D: DedupStore,
    L: LedgerStore,
{
    pub async fn run(self) {
        tracing::info!("worker {} started", self.id);
        while !self.shutdown.is_cancelled() {
            self.process_next().await;
        }
        tracing::info!("worker {} stopped", self.id);
    }

    async fn process_next(&self) {
        let received = tokio::select! {
            received = self.queue.receive() => received,
            _ = self.shutdown.cancelled() => return,
        };

        let msg = match received {
            Ok(Some(msg)) => msg,
            Ok(None) => return,
            Err(err) => {
                tracing::error!("worker {} failed to receive: {}", self.id, err);
                tokio::select! {
                    _ = tokio::time::sleep(std::time::Duration::from_secs(1)) => {}
                    _ = self.shutdown.cancelled() => {}
                }
                return;
            }
        };

        let event = match serde_json::from_str::<PaymentEvent>(&msg.body) {
            Ok(event) => event,
            Err(err) => {
                tracing::error!("failed to parse message {}: {}", msg.id, err);
                self.delete(&msg.id).await;
                return;
            }
        };

        if self.dedup.is_duplicate(&event.event_id).await {
            tracing::warn!("duplicate event {}, skipping", event.event_id);
            self.delete(&msg.id).await;
            return;
        }

        match self.process_with_retry(&event, &msg.id).await {
            RetryOutcome::Processed => {
                self.dedup.mark_processed(&event.event_id).await;
                self.delete(&msg.id).await;
            }
            RetryOutcome::Exhausted => {
                self.dead_letter(&msg, &event).await;
            }
            RetryOutcome::Aborted => {
                tracing::info!(
                    "worker {} shutting down, leaving event {} for redelivery",
                    self.id,
                    event.event_id
                );
            }
        }
    }

    async fn process_with_retry(&self, event: &PaymentEvent, message_id: &str) -> RetryOutcome {
        for attempt in 0..retry::MAX_ATTEMPTS {
            match self.process_event(event).await {
                Ok(()) => return RetryOutcome::Processed,
                Err(err) => {
                    let backoff = retry::backoff_for_attempt(attempt);
                    tracing::warn!(
                        "processing failed for event {} (attempt {}), retrying in {:?}: {}",
                        event.event_id,
                        attempt + 1,
                        backoff,
                        err
                    );

                    if let Err(err) = self.queue.extend_lease(message_id, backoff).await {
                        tracing::error!("failed to extend lease on message {}: {}", message_id, err);
                    }

                    tokio::select! {
                        _ = tokio::time::sleep(backoff) => {}
                        _ = self.shutdown.cancelled() => return RetryOutcome::Aborted,
                    }
                }
            }
        }

        RetryOutcome::Exhausted
    }

    async fn process_event(&self, event: &PaymentEvent) -> anyhow::Result<()> {
        rules::evaluate(event)?;
        self.ledger.apply(event).await?;
        tracing::info!("event {} processed", event.event_id);
        Ok(())
    }

    async fn dead_letter(&self, msg: &ReceivedMessage, event: &PaymentEvent) {
        match self.queue.send_to(&self.dead_letter_stream, &msg.body).await {
            Ok(()) => {
                tracing::error!(
                    "event {} exhausted {} attempts, moved to dead letter stream",
                    event.event_id,
                    retry::MAX_ATTEMPTS
                );
                self.delete(&msg.id).await;
            }
            Err(err) => {
                tracing::error!("failed to move message {} to dead letter stream: {}", msg.id, err);
            }
        }
    }

    async fn delete(&self, id: &str) {
        if let Err(err) = self.queue.delete(id).await {
            tracing::error!("failed to delete message {}: {}", id, err);
        }
    }
}
