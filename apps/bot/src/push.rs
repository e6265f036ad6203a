use std::collections::BTreeMap;

use anyhow::Result;
use chrono::{Datelike, NaiveDate, Weekday};
use futures_util::{StreamExt, stream};
use stock::{Quote, QuoteLookup, SubscriptionStore};
use tracing::{info, instrument, warn};
use tracing_futures::Instrument;

use crate::delivery::Delivery;

const CONCURRENCY: usize = 4;

/// Daily closing-price push. Does nothing on weekends; on weekdays every
/// registered ticker is looked up once and the result pushed to each of its
/// subscribers. A failure for one item never aborts the rest.
#[instrument(name = "run_push", skip(store, quotes, delivery), fields(date = %today))]
pub async fn run_push(
    today: NaiveDate,
    store: &dyn SubscriptionStore,
    quotes: &dyn QuoteLookup,
    delivery: &dyn Delivery,
) -> Result<()> {
    if matches!(today.weekday(), Weekday::Sat | Weekday::Sun) {
        info!("weekend, nothing to push");
        return Ok(());
    }

    let subscriptions = store.list_all().await?;
    info!(
        total_subscriptions = subscriptions.len(),
        "loaded subscriptions"
    );

    let mut subscribers: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (user_id, ticker) in subscriptions {
        subscribers.entry(ticker).or_default().push(user_id);
    }

    let mut tasks = stream::iter(subscribers)
        .map(|(ticker, users)| {
            let span = tracing::info_span!("push_ticker", ticker = %ticker);

            async move {
                let quote = quotes.lookup(&ticker).await;
                (ticker, users, quote)
            }
            .instrument(span)
        })
        .buffer_unordered(CONCURRENCY);

    let mut processed: usize = 0;
    let mut delivered: usize = 0;
    let mut failures: usize = 0;

    while let Some((ticker, users, quote)) = tasks.next().await {
        processed += 1;

        let (text, image_url) = match quote {
            Ok(Quote::Found(data)) => {
                let url = data.chart_url().to_string();
                (data.summary_line(), Some(url))
            }
            Ok(Quote::NotFound) => (format!("{ticker} 不是上市公司股票代碼"), None),
            Err(e) => {
                failures += 1;
                warn!(ticker = %ticker, error = ?e, "quote lookup failed");
                continue;
            }
        };

        for user_id in users {
            match delivery.push(&user_id, &text, image_url.as_deref()).await {
                Ok(()) => delivered += 1,
                Err(e) => {
                    failures += 1;
                    warn!(ticker = %ticker, user_id = %user_id, error = ?e, "push failed");
                }
            }
        }
    }

    info!(processed, delivered, failures, "completed daily push");
    Ok(())
}
