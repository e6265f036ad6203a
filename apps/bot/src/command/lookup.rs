use stock::{Quote, QuoteLookup};
use tracing::{info, warn};

use crate::error::HandlerError;

pub(crate) async fn run(
    quotes: &dyn QuoteLookup,
    ticker: &str,
) -> Result<(String, Option<String>), HandlerError> {
    info!("lookup: invoked ticker={}", ticker);

    match quotes.lookup(ticker).await.map_err(HandlerError::Quote)? {
        Quote::Found(quote) => {
            info!(
                "lookup: found ticker={} close={}",
                ticker,
                quote.latest_close()
            );
            Ok((quote.summary_line(), Some(quote.chart_url().to_string())))
        }
        Quote::NotFound => {
            warn!("lookup: not a listed ticker ticker={}", ticker);
            Ok((format!("{ticker} 不是上市公司股票代碼"), None))
        }
    }
}
