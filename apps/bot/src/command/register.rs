use stock::{SubscriptionStore, UpsertOutcome};
use tracing::{debug, info};

use crate::error::HandlerError;

pub(crate) async fn run(
    store: &dyn SubscriptionStore,
    user_id: &str,
    ticker: &str,
) -> Result<String, HandlerError> {
    info!("register: invoked user_id={} ticker={}", user_id, ticker);

    let outcome = store
        .upsert(user_id, ticker)
        .await
        .map_err(HandlerError::Store)?;

    debug!(
        "register: completed user_id={} ticker={} outcome={:?}",
        user_id, ticker, outcome
    );

    Ok(match outcome {
        UpsertOutcome::Created => format!("已為您註冊股票: {ticker}"),
        UpsertOutcome::AlreadyExists => format!("您已註冊過此股票代號: {ticker}"),
    })
}
