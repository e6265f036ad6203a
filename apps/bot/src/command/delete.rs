use stock::{RemoveOutcome, SubscriptionStore};
use tracing::{debug, info};

use crate::error::HandlerError;

pub(crate) async fn run(
    store: &dyn SubscriptionStore,
    user_id: &str,
    ticker: &str,
) -> Result<String, HandlerError> {
    info!("delete: invoked user_id={} ticker={}", user_id, ticker);

    let outcome = store
        .remove(user_id, ticker)
        .await
        .map_err(HandlerError::Store)?;

    debug!(
        "delete: completed user_id={} ticker={} outcome={:?}",
        user_id, ticker, outcome
    );

    Ok(match outcome {
        RemoveOutcome::Removed => format!("已刪除此股票紀錄: {ticker}"),
        RemoveOutcome::NotFound => format!("您尚未註冊此股票代號: {ticker}"),
    })
}
