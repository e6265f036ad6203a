use std::sync::Arc;

use anyhow::Result;
use bot::config::Config;
use bot::delivery::LineClient;
use bot::{Data, push, webhook};
use chrono::Utc;
use chrono_tz::Asia::Taipei;
use stock::{QuoteClient, QuoteLookup, RedisSubscriptionStore, SubscriptionStore};
use tokio::net::TcpListener;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();

    let subscriptions: Arc<dyn SubscriptionStore> = Arc::new(
        RedisSubscriptionStore::from_env()
            .await
            .expect("init subscription store failed"),
    );
    let quotes: Arc<dyn QuoteLookup> =
        Arc::new(QuoteClient::from_env().expect("init quote client failed"));
    let line = Arc::new(LineClient::from_env().expect("init delivery client failed"));

    let data = Data::new(
        Arc::clone(&subscriptions),
        Arc::clone(&quotes),
        Arc::clone(&line),
    );

    let sched = JobScheduler::new()
        .await
        .expect("failed to create job scheduler");

    let subscriptions_job = Arc::clone(&subscriptions);
    let quotes_job = Arc::clone(&quotes);
    let line_job = Arc::clone(&line);

    sched
        .add(Job::new_async_tz(
            "0 30 15 * * Mon-Fri",
            Taipei,
            move |_uuid, _l| {
                let subscriptions = Arc::clone(&subscriptions_job);
                let quotes = Arc::clone(&quotes_job);
                let line = Arc::clone(&line_job);

                Box::pin(async move {
                    let today = Utc::now().with_timezone(&Taipei).date_naive();

                    if let Err(e) = push::run_push(
                        today,
                        subscriptions.as_ref(),
                        quotes.as_ref(),
                        line.as_ref(),
                    )
                    .await
                    {
                        error!("run_push failed: {:?}", e);
                    }
                })
            },
        )?)
        .await?;

    sched.shutdown_on_ctrl_c();
    sched.start().await?;

    let app = webhook::router(data);
    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!("listening on {}", config.bind_addr);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutdown complete.");
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::{
            select,
            signal::unix::{SignalKind, signal},
        };
        let mut sigterm =
            signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        let mut sigint = signal(SignalKind::interrupt()).expect("failed to install SIGINT handler");
        select! {
            _ = sigterm.recv() => {},
            _ = sigint.recv()  => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
