use paysignal_worker::config::AppConfig;
use paysignal_worker::dedup::store_redis::DedupStoreRedis;
use paysignal_worker::ledger::store_pg::LedgerStorePg;
use paysignal_worker::queue::redis_stream::RedisStreamQueue;
use paysignal_worker::queue::{DEFAULT_BLOCK, DEFAULT_LEASE};
use paysignal_worker::worker::Worker;
use sqlx::postgres::PgPoolOptions;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cfg = AppConfig::from_env();

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&cfg.database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    let shutdown = CancellationToken::new();
    let mut handles = Vec::with_capacity(cfg.worker_pool_size);

    for id in 1..=cfg.worker_pool_size {
        let queue = RedisStreamQueue {
            client: redis::Client::open(cfg.redis_url.clone())?,
            stream_key: cfg.stream_key.clone(),
            group: cfg.stream_group.clone(),
            consumer: format!("{}-{}", cfg.consumer_name_prefix, id),
            lease: DEFAULT_LEASE,
            block: DEFAULT_BLOCK,
        };
        if id == 1 {
            queue.ensure_group().await?;
        }

        let worker = Worker {
            id,
            queue,
            dedup: DedupStoreRedis::new(redis::Client::open(cfg.redis_url.clone())?),
            ledger: LedgerStorePg { pool: pool.clone() },
            dead_letter_stream: cfg.dead_letter_stream_key.clone(),
            shutdown: shutdown.clone(),
        };
        handles.push(tokio::spawn(worker.run()));
    }

    tracing::info!("worker pool started with {} workers on {}", cfg.worker_pool_size, cfg.stream_key);

    shutdown_signal().await;
    tracing::info!("shutting down workers");
    shutdown.cancel();

    for handle in handles {
        handle.await?;
    }

    tracing::info!("all workers stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!("failed to install ctrl+c handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(err) => {
                tracing::error!("failed to install sigterm handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
