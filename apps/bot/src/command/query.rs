use stock::SubscriptionStore;
use tracing::info;

use crate::error::HandlerError;

pub(crate) async fn run(
    store: &dyn SubscriptionStore,
    user_id: &str,
) -> Result<String, HandlerError> {
    info!("query: invoked user_id={}", user_id);

    let tickers = store.list_for(user_id).await.map_err(HandlerError::Store)?;

    info!("query: completed user_id={} count={}", user_id, tickers.len());

    let mut body = String::from("你所註冊過的股票代號:");
    for ticker in tickers {
        body.push('\n');
        body.push_str(&ticker);
    }

    Ok(body)
}
